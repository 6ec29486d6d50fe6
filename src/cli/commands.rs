// Slash command handling

/// REPL commands. Anything not starting with `/` is a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Start a new chat (resets tier, mentions and alert)
    NewChat,
    History,
    /// Show quick replies, or send quick reply N
    Suggest(Option<usize>),
    Tip,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();

        match trimmed {
            "/help" => return Some(Command::Help),
            "/quit" | "/exit" => return Some(Command::Quit),
            "/new" | "/clear" | "/reset" => return Some(Command::NewChat),
            "/history" => return Some(Command::History),
            "/suggest" => return Some(Command::Suggest(None)),
            "/tip" => return Some(Command::Tip),
            _ => {}
        }

        // /suggest N sends the Nth quick reply (1-based)
        if let Some(rest) = trimmed.strip_prefix("/suggest ") {
            if let Ok(n) = rest.trim().parse::<usize>() {
                if n > 0 {
                    return Some(Command::Suggest(Some(n - 1)));
                }
            }
        }

        None
    }
}

pub fn help_text() -> &'static str {
    "Available commands:\n  \
    /help        - Show this help message\n  \
    /new         - Start a new chat\n  \
    /history     - Show the conversation so far\n  \
    /suggest [N] - List quick replies, or send reply N\n  \
    /tip         - Show the current wellness tip\n  \
    /exit        - Exit"
}
