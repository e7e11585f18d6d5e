//! Slash commands and registration

use engine::{Currency, EngineError, ResultEngine};
use teloxide::prelude::*;

use super::{Context, Next, send, storage_failure};
use crate::{ConfigParameters, commands::Command, dialogue::State, state::SessionKey, ui};

pub(super) async fn handle_command(
    bot: &Bot,
    key: SessionKey,
    cfg: &ConfigParameters,
    cmd: Command,
) -> ResponseResult<()> {
    let user = match cfg.engine.user(key.user_id).await {
        Ok(user) => user,
        Err(err) => return storage_failure(bot, key, cfg, &err).await,
    };

    let Some(user) = user else {
        // Nothing but registration is available to unknown users.
        let state = cfg.sessions.get(key).await.state;
        let reply = match state {
            State::RegistrationName if cmd != Command::Start => ui::ask_name(),
            State::RegistrationCurrency { .. } if cmd != Command::Start => ui::ask_currency(),
            _ => {
                cfg.sessions.set_state(key, State::RegistrationName).await;
                ui::welcome()
            }
        };
        return send(bot, key.chat_id, reply).await;
    };

    cfg.sessions.reset(key).await;
    let reply = match cmd {
        Command::Start => ui::welcome_back(&user),
        Command::Menu => ui::main_menu("Выберите пункт меню:"),
        Command::Cancel => ui::cancelled(),
        Command::Help => ui::help(),
    };
    send(bot, key.chat_id, reply).await
}

pub(super) async fn register(
    ctx: &Context<'_>,
    name: &str,
    currency: Currency,
) -> ResultEngine<Next> {
    ctx.cfg
        .engine
        .upsert_user(ctx.user_id, name, currency)
        .await?;
    let user = ctx
        .cfg
        .engine
        .user(ctx.user_id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
    tracing::info!("Registered user {} ({})", user.id, user.currency);
    Ok(Next::new(ui::registered(&user), State::Idle))
}
