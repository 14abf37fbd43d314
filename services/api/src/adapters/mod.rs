pub mod essay_llm;
pub mod kv_store;

pub use essay_llm::OpenAiEssayAdapter;
pub use kv_store::FileKeyValueStore;
