//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser form and the API server.
//! Each client message is one user action; the server answers with zero or more
//! server messages.

use chrono::{DateTime, Utc};
use essay_writer_core::{EssayForm, EssayParagraph, HistoryEntry, SampleEssay};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits the form for generation. Rejected while a generation is running.
    Generate { form: EssayForm },

    /// Copies a history entry into the form and the essay view.
    LoadHistory { id: String },

    /// Copies a built-in sample into the form and the essay view.
    LoadSample { index: usize },

    DeleteHistory { id: String },

    /// Wipes the history. Only honored when `confirmed` is true.
    ClearHistory {
        #[serde(default)]
        confirmed: bool,
    },

    ListHistory,

    ListSamples,

    /// Asks for the currently displayed essay as a text file.
    Download,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the connection opens.
    SessionInitialized { history: Vec<HistorySummary> },

    /// The form was accepted and the generation call is under way.
    GenerationStarted,

    /// A generation succeeded and was recorded in the history.
    EssayGenerated { entry: HistoryEntry },

    /// The form and essay view now hold a copy of a stored essay.
    FormLoaded {
        form: EssayForm,
        essay: Vec<EssayParagraph>,
    },

    HistoryUpdated { history: Vec<HistorySummary> },

    Samples { samples: Vec<SampleEssay> },

    /// The client must ask the user and resend `ClearHistory` with `confirmed: true`.
    ClearConfirmationRequired,

    /// A generation is already running for this session.
    Busy,

    /// The form was not submitted; nothing changed.
    ValidationFailed { message: String },

    /// The displayed essay as a downloadable text file.
    Download { file_name: String, text: String },

    /// Reports an error the user should see.
    Error { message: String },
}

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// A compact view of one history entry for listings.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: String,
    pub topic: String,
    pub level: String,
    pub timestamp: DateTime<Utc>,
    pub paragraph_count: usize,
}

impl From<&HistoryEntry> for HistorySummary {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            topic: entry.request.topic().to_string(),
            level: entry.request.level().label().to_string(),
            timestamp: entry.timestamp,
            paragraph_count: entry.essay_content.len(),
        }
    }
}
