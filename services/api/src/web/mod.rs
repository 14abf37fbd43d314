pub mod generation_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{
    clear_history_handler, delete_history_entry_handler, download_history_entry_handler,
    export_essay_handler, list_history_handler, list_samples_handler,
};
pub use ws_handler::ws_handler;
