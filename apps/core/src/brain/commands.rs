//! Administrative commands (`/start`, `/help`).
//!
//! Commands are recognized on the raw text, before the addressing check, so
//! they work without the assistant's name.

/// A recognized chat command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Start,
    Help,
}

impl AdminCommand {
    /// Parses `/start` or `/help`, with an optional `@botname` suffix and
    /// trailing arguments.
    pub fn parse(raw: &str) -> Option<Self> {
        let first = raw.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(command, _)| command);
        match name.to_lowercase().as_str() {
            "start" => Some(AdminCommand::Start),
            "help" => Some(AdminCommand::Help),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(AdminCommand::parse("/start"), Some(AdminCommand::Start));
        assert_eq!(AdminCommand::parse("  /help@neri_bot please"), Some(AdminCommand::Help));
        assert_eq!(AdminCommand::parse("/HELP"), Some(AdminCommand::Help));
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(AdminCommand::parse("/stop"), None);
        assert_eq!(AdminCommand::parse("help"), None);
        assert_eq!(AdminCommand::parse("нері /help"), None);
        assert_eq!(AdminCommand::parse(""), None);
    }
}
