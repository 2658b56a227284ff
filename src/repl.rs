use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::debug;

use crate::{
    diagnostics::{MarmosetError, Result},
    runtime::Interpreter,
};

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Shown while the buffered input still has unclosed brackets.
    pub continuation: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">> ".into(),
            continuation: "... ".into(),
        }
    }
}

pub struct Repl {
    interpreter: Interpreter,
    config: ReplConfig,
    buffer: String,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_config(ReplConfig::default())
    }

    pub fn with_config(config: ReplConfig) -> Self {
        Self {
            interpreter: Interpreter::new(),
            config,
            buffer: String::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        loop {
            let prompt = if self.buffer.is_empty() {
                &self.config.prompt
            } else {
                &self.config.continuation
            };
            match editor.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if self.buffer.is_empty() && (trimmed == ":quit" || trimmed == ":exit") {
                        break;
                    }
                    if self.buffer.is_empty() && trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(line.as_str()).ok();
                    if let Some(output) = self.feed_line(&line) {
                        println!("{output}");
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(MarmosetError::from(err)),
            }
        }
        Ok(())
    }

    /// Buffers `line`; once brackets balance, evaluates the whole buffer and
    /// returns the text to show. `None` means more input is needed.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        if !is_balanced(&self.buffer) {
            debug!(bytes = self.buffer.len(), "awaiting more input");
            return None;
        }
        let source = std::mem::take(&mut self.buffer);
        let output = match self.interpreter.eval_source(&source) {
            Ok(value) => value.to_string(),
            Err(err) => err.to_string(),
        };
        Some(output)
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

/// True when no `( [ {` is left waiting for its closer. Surplus closers count
/// as balanced so that the parser gets to report them.
pub fn is_balanced(source: &str) -> bool {
    let mut depth: i64 = 0;
    for ch in source.chars() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}
