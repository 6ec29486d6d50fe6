// CLI module
// Public interface for the terminal chat client

mod commands;
mod input;
mod repl;
mod tips;

pub use commands::{help_text, Command};
pub use input::InputHandler;
pub use repl::{render_alert, render_indicator, ChatRepl};
pub use tips::{TipRotator, HEALTH_TIPS, TIP_PERIOD};
