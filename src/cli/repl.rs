// Interactive chat REPL
//
// A terminal stand-in for the chat window: dispatches turns to the engine
// and renders the tier indicator and crisis alert it reports.

use anyhow::Result;
use crossterm::style::Stylize;
use std::io::{self, BufRead, IsTerminal, Write};

use super::commands::{help_text, Command};
use super::input::InputHandler;
use super::tips::{TipRotator, TIP_PERIOD};
use crate::crisis::{AlertView, Helpline, RiskTier, QUICK_REPLIES};
use crate::engine::ChatEngine;
use crate::errors::TurnError;
use crate::session::{ConversationSession, Sender, TurnCommit};

/// One-line stress meter
pub fn render_indicator(view: &AlertView) -> String {
    let label = format!(
        "{} {} ({})",
        view.indicator.emoji, view.indicator.label, view.indicator.description
    );
    let styled = match view.current_tier() {
        RiskTier::Low => label.green(),
        RiskTier::Mid => label.yellow(),
        RiskTier::High => label.dark_yellow().bold(),
        RiskTier::Critical => label.red().bold(),
    };
    format!("Stress level: {}", styled)
}

/// Alert block shown for as long as the alert is active
pub fn render_alert(helpline: &Helpline) -> String {
    format!(
        "{}\n  Please call the {} immediately: {}\n  {}",
        "⚠️  Critical Stress Level Detected".red().bold(),
        helpline.name,
        helpline.phone.as_str().bold(),
        helpline.url
    )
}

pub struct ChatRepl {
    engine: ChatEngine,
    session: ConversationSession,
    input_handler: Option<InputHandler>,
    tips: TipRotator,
}

impl ChatRepl {
    pub fn new(engine: ChatEngine) -> Self {
        let input_handler = if io::stdin().is_terminal() {
            match InputHandler::new() {
                Ok(handler) => Some(handler),
                Err(e) => {
                    tracing::warn!("Failed to initialize input handler: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let session = engine.new_session();
        Self {
            engine,
            session,
            input_handler,
            tips: TipRotator::spawn(TIP_PERIOD),
        }
    }

    /// Run interactive REPL loop
    pub async fn run(mut self, initial_prompt: Option<String>) -> Result<()> {
        println!("{}", "WizCare".green().bold());
        println!("Type /help for commands, /exit to quit\n");
        self.print_messages();

        if let Some(prompt) = initial_prompt {
            self.process_message(&prompt).await;
        }

        loop {
            let line = match &mut self.input_handler {
                Some(handler) => match handler.read_line("> ")? {
                    Some(line) => line,
                    None => break,
                },
                None => {
                    print!("> ");
                    io::stdout().flush()?;
                    let mut line = String::new();
                    if io::stdin().lock().read_line(&mut line)? == 0 {
                        break;
                    }
                    line.trim().to_string()
                }
            };

            if line.is_empty() {
                continue;
            }

            if line.starts_with('/') {
                match Command::parse(&line) {
                    Some(command) => {
                        if self.handle_command(command).await {
                            break;
                        }
                    }
                    None => {
                        println!("Unknown command: {}", line);
                        println!("Type /help for available commands");
                    }
                }
                continue;
            }

            self.process_message(&line).await;
        }

        self.tips.stop();
        if let Some(handler) = &mut self.input_handler {
            if let Err(e) = handler.save_history() {
                tracing::warn!("Failed to save history: {}", e);
            }
        }
        println!("Take care of yourself. Goodbye!");
        Ok(())
    }

    async fn process_message(&mut self, text: &str) {
        match self.engine.run_turn(&mut self.session, text).await {
            Ok(TurnCommit::Committed(turn)) => {
                println!("\n{} {}\n", "WizCare:".green().bold(), turn.assistant_message.text);
                self.print_status();
            }
            Ok(TurnCommit::Discarded) => {}
            Err(TurnError::InvalidInput) => {}
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    fn print_status(&self) {
        let view = self.engine.alert_view(&self.session);
        println!("{}", render_indicator(&view));
        if view.alert_active {
            println!("{}", render_alert(&view.helpline));
        }
        println!();
    }

    fn print_messages(&self) {
        for message in self.session.messages() {
            match message.sender {
                Sender::User => println!("{} {}", "You:".cyan().bold(), message.text),
                Sender::Assistant => {
                    println!("{} {}", "WizCare:".green().bold(), message.text)
                }
            }
        }
        println!();
    }

    /// Returns true when the REPL should exit
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return true,
            Command::Help => println!("{}", help_text()),
            Command::NewChat => {
                self.session.reset();
                println!("Started a new chat\n");
                self.print_messages();
            }
            Command::History => {
                println!("Conversation ({} messages):", self.session.message_count());
                self.print_messages();
                self.print_status();
            }
            Command::Suggest(None) => {
                for (i, reply) in QUICK_REPLIES.iter().enumerate() {
                    println!("  {}. {}", i + 1, reply);
                }
            }
            Command::Suggest(Some(index)) => match QUICK_REPLIES.get(index) {
                Some(reply) => {
                    println!("{} {}", "You:".cyan().bold(), reply);
                    self.process_message(reply).await;
                }
                None => println!("There are only {} quick replies", QUICK_REPLIES.len()),
            },
            Command::Tip => println!("💡 {}", self.tips.current()),
        }
        false
    }
}
