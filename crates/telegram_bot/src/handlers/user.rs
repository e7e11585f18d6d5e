//! Handler for user settings

use engine::{Currency, EngineError, ResultEngine, User};

use super::{Context, Next};
use crate::{dialogue::State, ui};

pub(super) fn show_settings(user: Option<&User>) -> ResultEngine<Next> {
    let user = user.ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
    Ok(Next::new(ui::settings(user), State::Settings))
}

pub(super) async fn set_currency(ctx: &Context<'_>, currency: Currency) -> ResultEngine<Next> {
    ctx.cfg
        .engine
        .update_currency(ctx.user_id, currency)
        .await?;
    tracing::info!("User {} switched currency to {currency}", ctx.user_id);
    Ok(Next::new(ui::currency_changed(currency), State::Idle))
}
