//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" that performs one essay
//! generation and posts the outcome back to the session loop that started it.

use essay_writer_core::{EssayGenerator, EssayParagraph, GenerationFailed, GenerationRequest};
use std::time::Instant;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

/// The settled result of one generation, delivered to the session loop.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub request: GenerationRequest,
    pub result: Result<Vec<EssayParagraph>, GenerationFailed>,
}

/// Runs one generation in the background. The task is never cancelled; if the
/// session is gone by the time it settles, the outcome is dropped.
pub fn spawn_generation(
    generator: EssayGenerator,
    request: GenerationRequest,
    outcome_tx: mpsc::Sender<GenerationOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start_time = Instant::now();
        let result = generator.generate(&request).await;
        info!(
            succeeded = result.is_ok(),
            "⏱️ Generation took: {:?}",
            start_time.elapsed()
        );

        if outcome_tx
            .send(GenerationOutcome { request, result })
            .await
            .is_err()
        {
            warn!("Session closed before the generation settled; dropping the outcome.");
        }
    })
}
