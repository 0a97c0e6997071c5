//! Interaction port: the prompts the resolver needs from a host UI.
//!
//! Every method returns `Ok(None)` when the user dismisses the prompt. An
//! empty string from [`InteractionPort::prompt_text`] is a real answer and is
//! distinct from dismissal.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub prompt: String,
    pub placeholder: String,
    /// Text pre-filled in the input box
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub label: String,
    /// Directory the picker starts in
    pub base_dir: Option<PathBuf>,
}

pub trait InteractionPort {
    fn prompt_text(&mut self, request: &TextPrompt) -> Result<Option<String>>;

    /// Returns the index of the selected option
    fn prompt_choice(&mut self, options: &[String], placeholder: &str) -> Result<Option<usize>>;

    /// Single file selection; returns an absolute path
    fn pick_file(&mut self, request: &PickRequest) -> Result<Option<PathBuf>>;

    /// Single directory selection; returns an absolute path
    fn pick_folder(&mut self, request: &PickRequest) -> Result<Option<PathBuf>>;
}

/// A canned answer for [`ScriptedInteraction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Choice(usize),
    Path(PathBuf),
    Cancel,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }

    pub fn path(value: impl Into<PathBuf>) -> Self {
        Answer::Path(value.into())
    }
}

/// What a [`ScriptedInteraction`] was asked, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asked {
    Text(TextPrompt),
    Choice {
        options: Vec<String>,
        placeholder: String,
    },
    File(PickRequest),
    Folder(PickRequest),
}

/// Interaction port that replays canned answers and records every prompt.
///
/// Used by tests and by non-interactive hosts that supply answers up front.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: VecDeque<Answer>,
    asked: Vec<Asked>,
}

impl ScriptedInteraction {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[Asked] {
        &self.asked
    }

    fn next_answer(&mut self) -> Result<Answer> {
        self.answers
            .pop_front()
            .ok_or_else(|| Error::InteractionError("no scripted answer left".to_string()))
    }
}

impl InteractionPort for ScriptedInteraction {
    fn prompt_text(&mut self, request: &TextPrompt) -> Result<Option<String>> {
        self.asked.push(Asked::Text(request.clone()));
        match self.next_answer()? {
            Answer::Text(value) => Ok(Some(value)),
            Answer::Cancel => Ok(None),
            other => Err(Error::InteractionError(format!(
                "expected a text answer, got {other:?}"
            ))),
        }
    }

    fn prompt_choice(&mut self, options: &[String], placeholder: &str) -> Result<Option<usize>> {
        self.asked.push(Asked::Choice {
            options: options.to_vec(),
            placeholder: placeholder.to_string(),
        });
        match self.next_answer()? {
            Answer::Choice(index) => Ok(Some(index)),
            Answer::Cancel => Ok(None),
            other => Err(Error::InteractionError(format!(
                "expected a choice answer, got {other:?}"
            ))),
        }
    }

    fn pick_file(&mut self, request: &PickRequest) -> Result<Option<PathBuf>> {
        self.asked.push(Asked::File(request.clone()));
        self.next_path()
    }

    fn pick_folder(&mut self, request: &PickRequest) -> Result<Option<PathBuf>> {
        self.asked.push(Asked::Folder(request.clone()));
        self.next_path()
    }
}

impl ScriptedInteraction {
    fn next_path(&mut self) -> Result<Option<PathBuf>> {
        match self.next_answer()? {
            Answer::Path(path) => Ok(Some(path)),
            Answer::Cancel => Ok(None),
            other => Err(Error::InteractionError(format!(
                "expected a path answer, got {other:?}"
            ))),
        }
    }
}
