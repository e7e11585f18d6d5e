//! Telegram bot.
//!
//! The bot drives the conversation and calls the engine directly; every chat
//! user is an engine user with the same id.

use chrono_tz::Tz;
use engine::Engine;
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod dialogue;
mod handlers;
mod parsing;
mod periods;
mod state;
mod ui;

/// Time zone used for "today" and statistics periods unless configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Moscow;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("missing telegram bot token")]
    MissingToken,
    #[error("missing engine")]
    MissingEngine,
    #[error("unknown time zone: {0}")]
    InvalidTimezone(String),
}

#[derive(Clone)]
pub struct ConfigParameters {
    engine: Engine,
    sessions: state::SessionStore,
    timezone: Tz,
}

pub struct Bot {
    token: String,
    engine: Engine,
    timezone: Tz,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot (time zone {})...", self.timezone);

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot
            .set_my_commands(commands::Command::bot_commands())
            .await
        {
            tracing::warn!("Failed to publish the command list: {err}");
        }

        let parameters = ConfigParameters {
            engine: self.engine.clone(),
            sessions: state::SessionStore::default(),
            timezone: self.timezone,
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    engine: Option<Engine>,
    timezone: Option<String>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn engine(mut self, engine: Engine) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    /// IANA name such as `Europe/Moscow`.
    pub fn timezone(mut self, timezone: &str) -> BotBuilder {
        self.timezone = Some(timezone.to_string());
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BotError::MissingToken);
        }
        let engine = self.engine.ok_or(BotError::MissingEngine)?;
        let timezone = match self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| BotError::InvalidTimezone(name))?,
            None => DEFAULT_TIMEZONE,
        };
        Ok(Bot {
            token: self.token,
            engine,
            timezone,
        })
    }
}
