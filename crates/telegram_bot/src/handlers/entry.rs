//! Handler for new ledger entries

use engine::{NewTransaction, ResultEngine};

use super::{Context, Next};
use crate::{dialogue::State, ui};

pub(super) async fn record(ctx: &Context<'_>, new: NewTransaction) -> ResultEngine<Next> {
    let engine = &ctx.cfg.engine;
    let id = engine.record_transaction(ctx.user_id, new.clone()).await?;
    let balance = engine.balance(ctx.user_id).await?;
    tracing::debug!(
        "Recorded {} #{id} for user {}",
        new.kind.as_str(),
        ctx.user_id
    );
    Ok(Next::new(
        ui::entry_saved(&new, balance, ctx.currency),
        State::Idle,
    ))
}
