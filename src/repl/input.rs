//! Input handler for the chat REPL using rustyline
//!
//! Provides line editing with in-session history and yes/no confirmation.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Input handler managing the readline interface
pub struct InputHandler {
    editor: DefaultEditor,
    prompt: String,
}

impl InputHandler {
    /// Create new input handler
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            prompt: prompt.into(),
        })
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input (trimmed, possibly empty)
    /// - Ok(None) for Ctrl-C or Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }
}

/// Ask a yes/no question; anything but "y"/"yes" is no
pub fn confirm(question: &str) -> Result<bool> {
    let mut editor = DefaultEditor::new()?;
    match editor.readline(&format!("{} [y/N] ", question)) {
        Ok(answer) => Ok(is_yes(&answer)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
