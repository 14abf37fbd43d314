//! crates/essay_writer_core/src/generation.rs
//!
//! The essay generation client: builds the prompt, performs exactly one call to the
//! `TextGenerationService`, and strictly validates the reply into paragraphs.
//!
//! Every way a generation can go wrong collapses into `GenerationFailed`. The finer
//! `FailureCause` is only kept for logging.

use crate::domain::{EssayForm, EssayParagraph, GenerationRequest, ValidationError};
use crate::ports::{StructuredGeneration, TextGenerationService};
use crate::prompt::build_prompt;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Name under which the reply schema is registered with the service.
pub const ESSAY_SCHEMA_NAME: &str = "essay_paragraphs";

/// Message shown to users for any generation failure.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate essay. Please check your connection and try again.";

//=========================================================================================
// Errors
//=========================================================================================

/// Internal reason behind a failed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Transport(String),
    EmptyReply,
    Truncated,
    MalformedReply(String),
    NoParagraphs,
    BlankField { index: usize, field: &'static str },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Transport(e) => write!(f, "transport failure: {e}"),
            FailureCause::EmptyReply => write!(f, "service returned no content"),
            FailureCause::Truncated => write!(f, "reply was cut off by the output budget"),
            FailureCause::MalformedReply(e) => write!(f, "reply did not match the schema: {e}"),
            FailureCause::NoParagraphs => write!(f, "reply contained no paragraphs"),
            FailureCause::BlankField { index, field } => {
                write!(f, "paragraph {index} has a blank '{field}'")
            }
        }
    }
}

/// The single user-facing generation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", GENERATION_FAILED_MESSAGE)]
pub struct GenerationFailed {
    cause: FailureCause,
}

impl GenerationFailed {
    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }
}

impl From<FailureCause> for GenerationFailed {
    fn from(cause: FailureCause) -> Self {
        Self { cause }
    }
}

/// Everything that can stop a form from turning into an essay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EssayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generation(#[from] GenerationFailed),
}

//=========================================================================================
// Reply Schema and Validation
//=========================================================================================

/// JSON schema for the reply: an ordered array of `{heading, content}` objects.
///
/// Structured-output endpoints require an object at the root, so the array is
/// carried in a single `paragraphs` property.
pub fn essay_reply_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "paragraphs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "heading": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["heading", "content"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["paragraphs"],
        "additionalProperties": false
    })
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EssayReply {
    paragraphs: Vec<EssayParagraph>,
}

/// Validates raw reply text against the essay schema. Rejects, never coerces.
pub fn parse_essay_reply(raw: &str) -> Result<Vec<EssayParagraph>, FailureCause> {
    let reply: EssayReply =
        serde_json::from_str(raw).map_err(|e| FailureCause::MalformedReply(e.to_string()))?;

    if reply.paragraphs.is_empty() {
        return Err(FailureCause::NoParagraphs);
    }

    for (index, paragraph) in reply.paragraphs.iter().enumerate() {
        if paragraph.heading.trim().is_empty() {
            return Err(FailureCause::BlankField { index, field: "heading" });
        }
        if paragraph.content.trim().is_empty() {
            return Err(FailureCause::BlankField { index, field: "content" });
        }
    }

    Ok(reply.paragraphs)
}

//=========================================================================================
// The Generation Client
//=========================================================================================

/// Generates essays through a `TextGenerationService`. Holds no cache; identical
/// requests produce independent calls.
#[derive(Clone)]
pub struct EssayGenerator {
    service: Arc<dyn TextGenerationService>,
}

impl EssayGenerator {
    pub fn new(service: Arc<dyn TextGenerationService>) -> Self {
        Self { service }
    }

    /// Performs one generation round trip for a validated request.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<EssayParagraph>, GenerationFailed> {
        let prompt = build_prompt(request);
        info!(
            topic = request.topic(),
            min_words = prompt.word_budget.min,
            max_words = prompt.word_budget.max,
            max_output_tokens = prompt.output_token_budget,
            "Requesting essay generation."
        );

        let call = StructuredGeneration {
            prompt: prompt.text,
            schema_name: ESSAY_SCHEMA_NAME.to_string(),
            schema: essay_reply_schema(),
            max_output_tokens: prompt.output_token_budget,
        };

        let result = self
            .service
            .generate_structured(call)
            .await
            .map_err(|e| FailureCause::Transport(e.to_string()))
            .and_then(|reply| {
                if reply.truncated {
                    return Err(FailureCause::Truncated);
                }
                let content = reply.content.ok_or(FailureCause::EmptyReply)?;
                if content.trim().is_empty() {
                    return Err(FailureCause::EmptyReply);
                }
                parse_essay_reply(&content)
            });

        match result {
            Ok(paragraphs) => {
                info!(paragraphs = paragraphs.len(), "Essay generated.");
                Ok(paragraphs)
            }
            Err(cause) => {
                warn!(%cause, "Essay generation failed.");
                Err(cause.into())
            }
        }
    }

    /// Validates the form first; the service is never called for an invalid form.
    pub async fn generate_from_form(
        &self,
        form: &EssayForm,
    ) -> Result<(GenerationRequest, Vec<EssayParagraph>), EssayError> {
        let request = form.validate()?;
        let essay = self.generate(&request).await?;
        Ok((request, essay))
    }
}
