pub mod domain;
pub mod export;
pub mod generation;
pub mod history;
pub mod ports;
pub mod prompt;
pub mod samples;

pub use domain::{
    EssayForm, EssayLength, EssayLevel, EssayParagraph, GenerationRequest, HistoryEntry,
    LengthClass, TargetLanguage, ValidationError,
};
pub use export::{download_file_name, format_essay_text};
pub use generation::{EssayError, EssayGenerator, FailureCause, GenerationFailed};
pub use history::{ClearConfirmation, HistoryState, HistoryStore, MemoryKeyValueStore};
pub use ports::{
    KeyValueStore, PortError, PortResult, StructuredGeneration, StructuredReply,
    TextGenerationService,
};
pub use prompt::{build_prompt, BuiltPrompt, WordBudget};
pub use samples::{sample_essays, SampleEssay};
