//! Slash commands

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub(crate) enum Command {
    #[command(description = "Начать работу с ботом.")]
    Start,
    #[command(description = "Главное меню.")]
    Menu,
    #[command(description = "Отменить текущее действие.")]
    Cancel,
    #[command(description = "Показать справку.")]
    Help,
}

/// Parses `/cmd` or `/cmd@bot_name`; anything else is not a command.
pub(crate) fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    let word = trimmed.strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);

    match name.to_lowercase().as_str() {
        "start" => Some(Command::Start),
        "menu" => Some(Command::Menu),
        "cancel" => Some(Command::Cancel),
        "help" => Some(Command::Help),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_ignore_bot_suffix_and_arguments() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command(" /cancel@thrift_keeper_bot "), Some(Command::Cancel));
        assert_eq!(parse_command("/Menu now"), Some(Command::Menu));
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("start"), None);
        assert_eq!(parse_command("/"), None);
    }
}
