// Line editor for the chat REPL
//
// Chat text is sensitive, so only slash commands reach the persistent
// history file. Up-arrow recall of messages is limited to this run.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};

const MAX_HISTORY: usize = 200;

pub struct InputHandler {
    editor: DefaultEditor,
    history_path: PathBuf,
    /// Commands typed this run, written out on save
    commands: Vec<String>,
}

impl InputHandler {
    /// History lives at ~/.wizcare/history.txt
    pub fn new() -> Result<Self> {
        let history_path = dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(".wizcare")
            .join("history.txt");

        Self::with_history_path(history_path)
    }

    pub fn with_history_path(history_path: PathBuf) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(MAX_HISTORY)
            .context("Invalid history size")?
            .auto_add_history(false)
            .build();
        let mut editor =
            DefaultEditor::with_config(config).context("Failed to initialize line editor")?;

        let commands = load_commands(&history_path);
        for command in &commands {
            let _ = editor.add_history_entry(command.as_str());
        }

        Ok(Self {
            editor,
            history_path,
            commands,
        })
    }

    /// `Ok(None)` on Ctrl+C / Ctrl+D
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .context("Failed to add history entry")?;
                    if is_persisted(&line) {
                        self.commands.push(line.clone());
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("Failed to read input"),
        }
    }

    /// Write the command history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut history = DefaultHistory::new();
        history
            .set_max_len(MAX_HISTORY)
            .context("Invalid history size")?;
        for command in &self.commands {
            history
                .add(command)
                .context("Failed to add history entry")?;
        }
        history
            .save(&self.history_path)
            .with_context(|| format!("Failed to save history to {}", self.history_path.display()))?;

        Ok(())
    }
}

/// Only slash commands are kept across runs
fn is_persisted(line: &str) -> bool {
    line.starts_with('/')
}

fn load_commands(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }
    let mut history = DefaultHistory::new();
    if let Err(e) = history.load(path) {
        tracing::debug!(path = %path.display(), error = %e, "Ignoring unreadable history file");
        return Vec::new();
    }
    history
        .iter()
        .filter(|line| is_persisted(line))
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_commands_persist() {
        assert!(is_persisted("/new"));
        assert!(is_persisted("/suggest 2"));
        assert!(!is_persisted("I feel awful today"));
    }

    #[test]
    fn test_missing_history_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_commands(&dir.path().join("history.txt")).is_empty());
    }

    #[test]
    fn test_save_writes_commands_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.txt");

        let mut handler = InputHandler::with_history_path(path.clone()).unwrap();
        handler.commands.push("/tip".to_string());
        handler.save_history().unwrap();

        assert_eq!(load_commands(&path), vec!["/tip".to_string()]);
    }
}
