//! Update handlers.
//!
//! Messages and button presses are turned into dialogue inputs; commands the
//! dialogue asks for run against the engine in the submodules.

use chrono::NaiveDate;
use engine::{Currency, EngineError, ErrorKind, ResultEngine, User};
use teloxide::{prelude::*, types::CallbackQuery};

use crate::{
    ConfigParameters,
    commands::parse_command,
    dialogue::{self, Action, Command, Effect, Input, State},
    periods,
    state::SessionKey,
    ui::{self, Reply},
};

mod entry;
mod goals;
mod start;
mod statistics;
mod user;

/// Everything a command needs to know about who is asking.
pub(crate) struct Context<'a> {
    pub cfg: &'a ConfigParameters,
    pub user_id: i64,
    pub currency: Currency,
    pub today: NaiveDate,
}

/// Result of a successful command.
pub(crate) struct Next {
    pub reply: Reply,
    pub state: State,
}

impl Next {
    pub(crate) fn new(reply: Reply, state: State) -> Self {
        Self { reply, state }
    }
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(user_id) = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()) else {
        bot.send_message(chat_id, "Не удалось определить пользователя.")
            .await?;
        return Ok(());
    };

    let Some(text) = msg.text() else {
        send(&bot, chat_id, ui::use_buttons()).await?;
        return Ok(());
    };

    let key = SessionKey::new(chat_id, user_id);
    if let Some(cmd) = parse_command(text) {
        return start::handle_command(&bot, key, &cfg, cmd).await;
    }

    drive(&bot, key, &cfg, Input::Text(text.to_string())).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Ok(user_id) = i64::try_from(q.from.id.0) else {
        return Ok(());
    };
    let Some(action) = q.data.as_deref().and_then(Action::parse) else {
        tracing::debug!("Unknown callback data: {:?}", q.data);
        return Ok(());
    };

    drive(&bot, SessionKey::new(chat_id, user_id), &cfg, Input::Action(action)).await
}

/// Feed one input to the dialogue and carry out what it decides.
async fn drive(
    bot: &Bot,
    key: SessionKey,
    cfg: &ConfigParameters,
    input: Input,
) -> ResponseResult<()> {
    let user = match cfg.engine.user(key.user_id).await {
        Ok(user) => user,
        Err(err) => return storage_failure(bot, key, cfg, &err).await,
    };

    let session = cfg.sessions.get(key).await;
    if user.is_none() && !session.state.is_registration() {
        cfg.sessions.set_state(key, State::RegistrationName).await;
        return send(bot, key.chat_id, ui::welcome()).await;
    }

    let ctx = Context {
        cfg,
        user_id: key.user_id,
        currency: user.as_ref().map(|u| u.currency).unwrap_or_default(),
        today: periods::today(cfg.timezone),
    };

    let previous = session.state.clone();
    let outcome = dialogue::step(session.state, input, ctx.today);
    tracing::debug!("{key}: {previous:?} -> {:?}", outcome.state);

    match outcome.effect {
        Effect::Reply(reply) => {
            cfg.sessions.set_state(key, outcome.state).await;
            send(bot, key.chat_id, reply).await
        }
        Effect::Run(command) => match execute(&ctx, user.as_ref(), command, outcome.state).await {
            Ok(next) => {
                cfg.sessions.set_state(key, next.state).await;
                send(bot, key.chat_id, next.reply).await
            }
            Err(err) => recover(bot, key, &ctx, previous, &err).await,
        },
    }
}

async fn execute(
    ctx: &Context<'_>,
    user: Option<&User>,
    command: Command,
    state: State,
) -> ResultEngine<Next> {
    match command {
        Command::Register { name, currency } => start::register(ctx, &name, currency).await,
        Command::Record(new) => entry::record(ctx, new).await,
        Command::Statistics(period) => statistics::show(ctx, period).await,
        Command::ShowSettings => user::show_settings(user),
        Command::SetCurrency(currency) => user::set_currency(ctx, currency).await,
        command => goals::execute(ctx, command, state).await,
    }
}

/// Report a failed command. Input mistakes leave the dialogue where it was.
async fn recover(
    bot: &Bot,
    key: SessionKey,
    ctx: &Context<'_>,
    previous: State,
    err: &EngineError,
) -> ResponseResult<()> {
    match err.kind() {
        ErrorKind::Validation | ErrorKind::InsufficientFunds => {
            tracing::debug!("Rejected input in {key}: {err}");
            ctx.cfg.sessions.set_state(key, previous).await;
            send(bot, key.chat_id, ui::mistake(&ui::engine_error(err, ctx.currency))).await
        }
        ErrorKind::NotFound => {
            ctx.cfg.sessions.set_state(key, State::GoalsMenu).await;
            send(bot, key.chat_id, ui::goals_menu("❌ Цель не найдена")).await
        }
        ErrorKind::Storage => storage_failure(bot, key, ctx.cfg, err).await,
    }
}

async fn storage_failure(
    bot: &Bot,
    key: SessionKey,
    cfg: &ConfigParameters,
    err: &EngineError,
) -> ResponseResult<()> {
    tracing::error!("Engine failure in {key}: {err}");
    cfg.sessions.reset(key).await;
    send(bot, key.chat_id, ui::service_unavailable()).await
}

pub(crate) async fn send(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}
