//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection is one session actor: it owns the form state and the busy latch,
//! handles one client message at a time, and receives generation outcomes through
//! a channel so that at most one generation is in flight per session.

use crate::{
    error::ApiError,
    web::{
        generation_task::{spawn_generation, GenerationOutcome},
        protocol::{ClientMessage, ServerMessage},
        state::{AppState, SessionState},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use essay_writer_core::{
    download_file_name, format_essay_text, sample_essays, ClearConfirmation, HistoryEntry,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    let (mut ws_sender, mut receiver) = socket.split();
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<GenerationOutcome>(1);
    let mut session = SessionState::new();

    // --- 1. Initialization Phase ---
    let init_msg = ServerMessage::SessionInitialized {
        history: app_state.history_summaries(),
    };
    if let Err(e) = send_message(&mut ws_sender, &init_msg).await {
        error!("Failed to send session initialized message: {}", e);
        return;
    }

    // --- 2. Main Message Loop ---
    loop {
        let replies = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(client_msg) => {
                            handle_client_message(client_msg, &app_state, &mut session, &outcome_tx)
                        }
                        Err(e) => {
                            warn!("Failed to deserialize client message: {}", e);
                            vec![ServerMessage::Error {
                                message: "Unrecognized message.".to_string(),
                            }]
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            },
            Some(outcome) = outcome_rx.recv() => {
                handle_generation_outcome(outcome, &app_state, &mut session)
            }
        };

        for reply in &replies {
            if let Err(e) = send_message(&mut ws_sender, reply).await {
                error!("Failed to send message to client: {}", e);
                return;
            }
        }
    }

    // --- 3. Cleanup ---
    if session.is_generating() {
        info!("Connection closed with a generation still in flight; its result will be dropped.");
    }
    info!("WebSocket connection closed.");
}

async fn send_message(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ApiError> {
    let json = serde_json::to_string(message)?;
    ws_sender.send(Message::Text(json.into())).await?;
    Ok(())
}

/// Applies one user action to the session and returns the replies for the client.
pub fn handle_client_message(
    client_msg: ClientMessage,
    app_state: &Arc<AppState>,
    session: &mut SessionState,
    outcome_tx: &mpsc::Sender<GenerationOutcome>,
) -> Vec<ServerMessage> {
    match client_msg {
        ClientMessage::Generate { form } => {
            if session.is_generating() {
                info!("Generate received while a generation is in flight; rejecting.");
                return vec![ServerMessage::Busy];
            }

            let request = match form.validate() {
                Ok(request) => request,
                Err(e) => {
                    info!("Form rejected: {}", e);
                    return vec![ServerMessage::ValidationFailed {
                        message: e.to_string(),
                    }];
                }
            };

            session.form = form;
            if !session.try_begin_generation() {
                return vec![ServerMessage::Busy];
            }
            spawn_generation(app_state.generator.clone(), request, outcome_tx.clone());
            vec![ServerMessage::GenerationStarted]
        }
        ClientMessage::LoadHistory { id } => {
            let entry = app_state.with_history(|history| history.get(&id).cloned());
            match entry {
                Some(entry) => {
                    let form = entry.request.to_form();
                    session.load(form.clone(), entry.essay_content.clone());
                    vec![ServerMessage::FormLoaded {
                        form,
                        essay: entry.essay_content,
                    }]
                }
                None => vec![ServerMessage::Error {
                    message: "That essay is no longer in your history.".to_string(),
                }],
            }
        }
        ClientMessage::LoadSample { index } => match sample_essays().get(index) {
            Some(sample) => {
                let (form, essay) = sample.to_form();
                session.load(form.clone(), essay.clone());
                vec![ServerMessage::FormLoaded { form, essay }]
            }
            None => vec![ServerMessage::Error {
                message: "No such sample essay.".to_string(),
            }],
        },
        ClientMessage::DeleteHistory { id } => {
            let removed = app_state.with_history(|history| history.remove(&id));
            info!(removed, "Delete requested for history entry {}.", id);
            vec![ServerMessage::HistoryUpdated {
                history: app_state.history_summaries(),
            }]
        }
        ClientMessage::ClearHistory { confirmed } => {
            match ClearConfirmation::from_user_response(confirmed) {
                Some(confirmation) => {
                    app_state.with_history(|history| history.clear(confirmation));
                    info!("Essay history cleared.");
                    vec![ServerMessage::HistoryUpdated {
                        history: Vec::new(),
                    }]
                }
                None => vec![ServerMessage::ClearConfirmationRequired],
            }
        }
        ClientMessage::ListHistory => vec![ServerMessage::HistoryUpdated {
            history: app_state.history_summaries(),
        }],
        ClientMessage::ListSamples => vec![ServerMessage::Samples {
            samples: sample_essays(),
        }],
        ClientMessage::Download => match &session.essay {
            Some(essay) => vec![ServerMessage::Download {
                file_name: download_file_name(&session.form.topic),
                text: format_essay_text(essay),
            }],
            None => vec![ServerMessage::Error {
                message: "There is no essay to download yet.".to_string(),
            }],
        },
    }
}

/// Releases the busy latch and records a successful essay. A failure leaves the
/// displayed essay and the history untouched.
pub fn handle_generation_outcome(
    outcome: GenerationOutcome,
    app_state: &Arc<AppState>,
    session: &mut SessionState,
) -> Vec<ServerMessage> {
    session.finish_generation();

    match outcome.result {
        Ok(essay) => {
            let entry = HistoryEntry::new(outcome.request, essay);
            session.essay = Some(entry.essay_content.clone());
            app_state.with_history(|history| history.append(entry.clone()));
            info!("Essay {} recorded in history.", entry.id);
            vec![
                ServerMessage::EssayGenerated { entry },
                ServerMessage::HistoryUpdated {
                    history: app_state.history_summaries(),
                },
            ]
        }
        Err(e) => {
            error!(cause = %e.cause(), "Essay generation failed.");
            vec![ServerMessage::Error {
                message: e.to_string(),
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support::{test_state, VALID_REPLY};
    use essay_writer_core::{generation::GENERATION_FAILED_MESSAGE, EssayForm, EssayParagraph};

    fn generate(topic: &str) -> ClientMessage {
        ClientMessage::Generate {
            form: EssayForm {
                topic: topic.to_string(),
                ..EssayForm::default()
            },
        }
    }

    async fn run_generation(
        app_state: &Arc<AppState>,
        session: &mut SessionState,
        topic: &str,
    ) -> Vec<ServerMessage> {
        let (tx, mut rx) = mpsc::channel(1);
        let replies = handle_client_message(generate(topic), app_state, session, &tx);
        assert!(matches!(replies.as_slice(), [ServerMessage::GenerationStarted]));
        let outcome = rx.recv().await.unwrap();
        handle_generation_outcome(outcome, app_state, session)
    }

    #[tokio::test]
    async fn successful_generation_is_shown_and_recorded() {
        let app_state = test_state(Some(VALID_REPLY));
        let mut session = SessionState::new();

        let replies = run_generation(&app_state, &mut session, "Volcanoes").await;

        assert!(!session.is_generating());
        assert!(matches!(
            replies.as_slice(),
            [ServerMessage::EssayGenerated { .. }, ServerMessage::HistoryUpdated { history }]
                if history.len() == 1 && history[0].topic == "Volcanoes"
        ));
        assert_eq!(session.essay.as_ref().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn second_generate_while_busy_is_rejected() {
        let app_state = test_state(Some(VALID_REPLY));
        let mut session = SessionState::new();
        let (tx, mut rx) = mpsc::channel(1);

        let first = handle_client_message(generate("Glaciers"), &app_state, &mut session, &tx);
        assert!(matches!(first.as_slice(), [ServerMessage::GenerationStarted]));

        let second = handle_client_message(generate("Deserts"), &app_state, &mut session, &tx);
        assert!(matches!(second.as_slice(), [ServerMessage::Busy]));

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.request.topic(), "Glaciers");
        handle_generation_outcome(outcome, &app_state, &mut session);
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn failed_generation_keeps_previous_state() {
        let good = test_state(Some(VALID_REPLY));
        let mut session = SessionState::new();
        run_generation(&good, &mut session, "Volcanoes").await;
        let shown_before = session.essay.clone();

        let bad = test_state(Some(r#"{"paragraphs":[{"heading":"Only"}]}"#));
        let replies = run_generation(&bad, &mut session, "Earthquakes").await;

        assert!(matches!(
            replies.as_slice(),
            [ServerMessage::Error { message }] if message == GENERATION_FAILED_MESSAGE
        ));
        assert!(!session.is_generating());
        assert_eq!(session.essay, shown_before);
        assert!(bad.history_summaries().is_empty());
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_without_starting() {
        let app_state = test_state(Some(VALID_REPLY));
        let mut session = SessionState::new();
        let (tx, mut rx) = mpsc::channel(1);

        let replies = handle_client_message(generate("   "), &app_state, &mut session, &tx);

        assert!(matches!(replies.as_slice(), [ServerMessage::ValidationFailed { .. }]));
        assert!(!session.is_generating());
        assert_eq!(session.form, EssayForm::default());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loading_history_copies_the_entry() {
        let app_state = test_state(Some(VALID_REPLY));
        let mut session = SessionState::new();
        run_generation(&app_state, &mut session, "Volcanoes").await;
        let id = app_state.history_summaries()[0].id.clone();
        let (tx, _rx) = mpsc::channel(1);

        let mut other = SessionState::new();
        let replies =
            handle_client_message(ClientMessage::LoadHistory { id: id.clone() }, &app_state, &mut other, &tx);
        assert!(matches!(replies.as_slice(), [ServerMessage::FormLoaded { .. }]));

        other.form.topic = "Edited".to_string();
        if let Some(essay) = other.essay.as_mut() {
            essay.push(EssayParagraph {
                heading: "Extra".to_string(),
                content: "Added locally.".to_string(),
            });
        }

        let stored = app_state.with_history(|history| history.get(&id).cloned()).unwrap();
        assert_eq!(stored.request.topic(), "Volcanoes");
        assert_eq!(stored.essay_content.len(), 3);
    }

    #[test]
    fn clear_requires_confirmation() {
        let app_state = test_state(None);
        let mut session = SessionState::new();
        let (tx, _rx) = mpsc::channel(1);

        let replies = handle_client_message(
            ClientMessage::ClearHistory { confirmed: false },
            &app_state,
            &mut session,
            &tx,
        );
        assert!(matches!(replies.as_slice(), [ServerMessage::ClearConfirmationRequired]));

        let replies = handle_client_message(
            ClientMessage::ClearHistory { confirmed: true },
            &app_state,
            &mut session,
            &tx,
        );
        assert!(matches!(
            replies.as_slice(),
            [ServerMessage::HistoryUpdated { history }] if history.is_empty()
        ));
    }

    #[test]
    fn samples_load_and_download() {
        let app_state = test_state(None);
        let mut session = SessionState::new();
        let (tx, _rx) = mpsc::channel(1);

        let replies = handle_client_message(ClientMessage::Download, &app_state, &mut session, &tx);
        assert!(matches!(replies.as_slice(), [ServerMessage::Error { .. }]));

        handle_client_message(ClientMessage::LoadSample { index: 1 }, &app_state, &mut session, &tx);
        assert_eq!(session.form.topic, "Why Bees Matter");

        let replies = handle_client_message(ClientMessage::Download, &app_state, &mut session, &tx);
        match replies.as_slice() {
            [ServerMessage::Download { file_name, text }] => {
                assert_eq!(file_name, "why_bees_matter_essay.txt");
                assert!(text.starts_with("Introduction\n\n"));
            }
            other => panic!("unexpected replies: {other:?}"),
        }

        let replies =
            handle_client_message(ClientMessage::LoadSample { index: 99 }, &app_state, &mut session, &tx);
        assert!(matches!(replies.as_slice(), [ServerMessage::Error { .. }]));
    }
}
