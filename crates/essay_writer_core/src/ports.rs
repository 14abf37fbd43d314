//! crates/essay_writer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the essay writer's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the generation API and of the storage medium.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Generation Port
//=========================================================================================

/// A single schema-constrained generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGeneration {
    pub prompt: String,
    /// Identifier the remote service attaches to the schema.
    pub schema_name: String,
    /// JSON schema the reply must conform to.
    pub schema: serde_json::Value,
    /// Upper bound on the size of the reply.
    pub max_output_tokens: u32,
}

/// What came back from a structured generation call, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredReply {
    /// Raw text of the reply, if the service produced any.
    pub content: Option<String>,
    /// Set when the service stopped because the output budget ran out.
    pub truncated: bool,
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends one prompt and returns the raw reply. Implementations must not retry.
    async fn generate_structured(&self, call: StructuredGeneration) -> PortResult<StructuredReply>;
}

//=========================================================================================
// Persistence Port
//=========================================================================================

/// A synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
}
