//! Optional text-generation helpers.
//!
//! The engine never talks to a model directly. It asks an [`Analyst`] to
//! name a finished take, or a [`Composer`] to turn a description into a
//! motif. The stock implementations build a prompt, send it to a
//! [`TextService`] and parse the free-form reply; anything the parser
//! cannot use comes back as [`AssistError::Malformed`].

mod command;
mod prompt;

use std::io;

use thiserror::Error;

use crate::timeline::Pitch;

pub use command::CommandTextService;
pub use prompt::{parse_analysis, parse_motif, PromptAnalyst, PromptComposer};

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("no text service is configured")]
    Unconfigured,
    #[error("could not run the text service")]
    Spawn(#[source] io::Error),
    #[error("text service failed: {0}")]
    Service(String),
    #[error("unusable reply from the text service: {0}")]
    Malformed(String),
}

/// The black box: prompt in, text out.
pub trait TextService {
    fn complete(&self, prompt: &str) -> Result<String, AssistError>;
}

impl<F> TextService for F
where
    F: Fn(&str) -> Result<String, AssistError>,
{
    fn complete(&self, prompt: &str) -> Result<String, AssistError> {
        self(prompt)
    }
}

/// Suggested label for a take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub suggested_name: String,
    pub mood_summary: String,
}

/// Names takes from the pitches they use.
pub trait Analyst {
    fn analyze(&self, pitches: &[Pitch]) -> Result<Analysis, AssistError>;
}

/// Turns a free-text description into relative pitch offsets.
pub trait Composer {
    fn compose(&self, description: &str) -> Result<Vec<i32>, AssistError>;
}
