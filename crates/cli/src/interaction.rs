//! Line-editor prompts for the interaction port.
//!
//! Ctrl-C and Ctrl-D dismiss a prompt. When stdin is not a terminal,
//! rustyline falls back to reading plain lines, so answers can be piped in.

use cmdhub_core::interaction::{InteractionPort, PickRequest, TextPrompt};
use cmdhub_core::{Error, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct TerminalInteraction {
    editor: DefaultEditor,
}

impl TerminalInteraction {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(interaction_error)?;
        Ok(Self { editor })
    }

    /// One line of input; `None` when the user dismissed the prompt
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!("Failed to add prompt history entry: {}", e);
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(interaction_error(err)),
        }
    }

    fn pick_path(&mut self, request: &PickRequest, want_dir: bool) -> Result<Option<PathBuf>> {
        let noun = if want_dir { "folder" } else { "file" };
        if let Some(base) = &request.base_dir {
            eprintln!("{} (relative to {})", request.label, base.display());
        }

        loop {
            let Some(answer) = self.read_line(&format!("{} ({noun}): ", request.label))? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }

            let path = resolve_answer(answer, request.base_dir.as_deref());
            let matches = if want_dir { path.is_dir() } else { path.is_file() };
            if matches {
                return Ok(Some(path));
            }
            eprintln!("No such {noun}: {}", path.display());
        }
    }
}

impl InteractionPort for TerminalInteraction {
    fn prompt_text(&mut self, request: &TextPrompt) -> Result<Option<String>> {
        if !request.placeholder.is_empty() && request.placeholder != request.prompt {
            eprintln!("{}", request.placeholder);
        }
        let prompt = if request.default_value.is_empty() {
            format!("{}: ", request.prompt)
        } else {
            format!("{} [{}]: ", request.prompt, request.default_value)
        };

        let answer = self.read_line(&prompt)?;
        Ok(answer.map(|line| {
            if line.is_empty() && !request.default_value.is_empty() {
                request.default_value.clone()
            } else {
                line
            }
        }))
    }

    fn prompt_choice(&mut self, options: &[String], placeholder: &str) -> Result<Option<usize>> {
        eprintln!("{placeholder}");
        for (index, option) in options.iter().enumerate() {
            eprintln!("  {}) {}", index + 1, option);
        }

        loop {
            let Some(answer) = self.read_line(&format!("Select [1-{}]: ", options.len()))? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(Some(choice - 1)),
                _ => {
                    // Typing an option verbatim selects it too
                    if let Some(index) = options.iter().position(|o| o == answer) {
                        return Ok(Some(index));
                    }
                    eprintln!("Enter a number between 1 and {}", options.len());
                }
            }
        }
    }

    fn pick_file(&mut self, request: &PickRequest) -> Result<Option<PathBuf>> {
        self.pick_path(request, false)
    }

    fn pick_folder(&mut self, request: &PickRequest) -> Result<Option<PathBuf>> {
        self.pick_path(request, true)
    }
}

fn interaction_error(err: ReadlineError) -> Error {
    Error::InteractionError(err.to_string())
}

/// Absolute path for a typed answer; relative answers start at `base`
fn resolve_answer(answer: &str, base: Option<&Path>) -> PathBuf {
    let path = Path::new(answer);
    let joined = match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    std::path::absolute(&joined).unwrap_or(joined)
}
