//! services/api/src/adapters/essay_llm.rs
//!
//! This module contains the adapter for the essay-writing LLM.
//! It implements the `TextGenerationService` port from the `core` crate using
//! OpenAI chat completions with a strict JSON-schema response format.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, FinishReason, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use essay_writer_core::ports::{
    PortError, PortResult, StructuredGeneration, StructuredReply, TextGenerationService,
};
use tracing::{debug, warn};

const SYSTEM_INSTRUCTIONS: &str = "You write essays and reply only with JSON that matches the provided schema.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiEssayAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEssayAdapter {
    /// Creates a new `OpenAiEssayAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// The strict structured-output format for a schema.
fn json_schema_format(call: &StructuredGeneration) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: call.schema_name.clone(),
            description: Some("An essay as an ordered list of headed paragraphs.".to_string()),
            schema: Some(call.schema.clone()),
            strict: Some(true),
        },
    }
}

/// Maps the first choice of a completion to a raw reply.
fn reply_from_choice(content: Option<String>, finish_reason: Option<FinishReason>) -> StructuredReply {
    StructuredReply {
        content,
        truncated: matches!(finish_reason, Some(FinishReason::Length)),
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiEssayAdapter {
    /// Sends the prompt once and hands back whatever the model produced.
    async fn generate_structured(&self, call: StructuredGeneration) -> PortResult<StructuredReply> {
        let response_format = json_schema_format(&call);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(call.prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .max_completion_tokens(call.max_output_tokens)
            .response_format(response_format)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let Some(choice) = response.choices.into_iter().next() else {
            warn!("Essay LLM returned no choices in its response.");
            return Ok(StructuredReply::default());
        };

        debug!(finish_reason = ?choice.finish_reason, "Essay LLM responded.");
        Ok(reply_from_choice(choice.message.content, choice.finish_reason))
    }
}
