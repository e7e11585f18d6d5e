//! Handler for period statistics

use chrono::Utc;
use engine::ResultEngine;

use super::{Context, Next};
use crate::{dialogue::State, periods::Period, ui};

pub(super) async fn show(ctx: &Context<'_>, period: Period) -> ResultEngine<Next> {
    let (start, end) = period.window(Utc::now(), ctx.cfg.timezone);
    let stats = ctx
        .cfg
        .engine
        .statistics_for_period(ctx.user_id, start, end)
        .await?;
    Ok(Next::new(
        ui::statistics(period, &stats, ctx.currency, ctx.cfg.timezone),
        State::Idle,
    ))
}
