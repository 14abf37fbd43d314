//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{protocol::HistorySummary, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use essay_writer_core::{
    download_file_name, format_essay_text, sample_essays, ClearConfirmation, EssayParagraph,
    SampleEssay,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_history_handler,
        delete_history_entry_handler,
        clear_history_handler,
        download_history_entry_handler,
        export_essay_handler,
        list_samples_handler,
    ),
    components(
        schemas(HistorySummary, ExportRequest)
    ),
    tags(
        (name = "Essay Writer API", description = "History, samples and downloads for the essay writer.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

/// Query parameters for clearing the history.
#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClearHistoryParams {
    /// Must be `true`; the history is only wiped on explicit confirmation.
    confirm: Option<bool>,
}

/// An essay to be rendered as a text file.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ExportRequest {
    topic: String,
    #[schema(value_type = Vec<Object>)]
    essay: Vec<EssayParagraph>,
}

fn text_file(file_name: String, text: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        text,
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the essay history, newest first.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "History entries, newest first", body = [HistorySummary])
    )
)]
pub async fn list_history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<HistorySummary>> {
    Json(app_state.history_summaries())
}

/// Delete one history entry. Unknown ids are not an error.
#[utoipa::path(
    delete,
    path = "/history/{id}",
    params(("id" = String, Path, description = "The history entry id.")),
    responses(
        (status = 204, description = "The entry is no longer in the history")
    )
)]
pub async fn delete_history_entry_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let removed = app_state.with_history(|history| history.remove(&id));
    info!(removed, "Delete requested for history entry {}.", id);
    StatusCode::NO_CONTENT
}

/// Clear the whole history. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/history",
    params(ClearHistoryParams),
    responses(
        (status = 204, description = "History cleared"),
        (status = 428, description = "Confirmation missing; nothing was deleted")
    )
)]
pub async fn clear_history_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ClearHistoryParams>,
) -> Result<StatusCode, (StatusCode, String)> {
    let confirmation = ClearConfirmation::from_user_response(params.confirm.unwrap_or(false))
        .ok_or_else(|| {
            (
                StatusCode::PRECONDITION_REQUIRED,
                "Clearing the history needs confirm=true".to_string(),
            )
        })?;

    app_state.with_history(|history| history.clear(confirmation));
    info!("Essay history cleared.");
    Ok(StatusCode::NO_CONTENT)
}

/// Download a history entry as a text file.
#[utoipa::path(
    get,
    path = "/history/{id}/download",
    params(("id" = String, Path, description = "The history entry id.")),
    responses(
        (status = 200, description = "The essay as plain text", content_type = "text/plain"),
        (status = 404, description = "No entry with this id")
    )
)]
pub async fn download_history_entry_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (topic, text) = app_state
        .with_history(|history| {
            history
                .get(&id)
                .map(|entry| (entry.request.topic().to_string(), format_essay_text(&entry.essay_content)))
        })
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                "That essay is no longer in your history.".to_string(),
            )
        })?;

    Ok(text_file(download_file_name(&topic), text))
}

/// Render an arbitrary essay as a text file.
#[utoipa::path(
    post,
    path = "/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "The essay as plain text", content_type = "text/plain"),
        (status = 400, description = "The essay has no paragraphs")
    )
)]
pub async fn export_essay_handler(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if request.essay.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "There is no essay to download.".to_string(),
        ));
    }
    Ok(text_file(
        download_file_name(&request.topic),
        format_essay_text(&request.essay),
    ))
}

/// List the built-in sample essays.
#[utoipa::path(
    get,
    path = "/samples",
    responses(
        (status = 200, description = "Sample essays in display order", content_type = "application/json")
    )
)]
pub async fn list_samples_handler() -> Json<Vec<SampleEssay>> {
    Json(sample_essays())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support::test_state;
    use axum::response::Response;
    use essay_writer_core::{EssayForm, HistoryEntry};

    fn seed(app_state: &Arc<AppState>, topic: &str) -> String {
        let request = EssayForm {
            topic: topic.to_string(),
            ..EssayForm::default()
        }
        .validate()
        .unwrap();
        let entry = HistoryEntry::new(
            request,
            vec![
                EssayParagraph {
                    heading: "A".to_string(),
                    content: "B".to_string(),
                },
                EssayParagraph {
                    heading: "C".to_string(),
                    content: "D".to_string(),
                },
            ],
        );
        let id = entry.id.clone();
        app_state.with_history(|history| history.append(entry));
        id
    }

    fn header_value(response: &Response, name: header::HeaderName) -> String {
        response.headers()[name].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn clearing_without_confirmation_keeps_history() {
        let app_state = test_state(None);
        seed(&app_state, "Rivers");

        let err = clear_history_handler(
            State(app_state.clone()),
            Query(ClearHistoryParams { confirm: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(app_state.history_summaries().len(), 1);

        let status = clear_history_handler(
            State(app_state.clone()),
            Query(ClearHistoryParams {
                confirm: Some(true),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(list_history_handler(State(app_state)).await.0.is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_entry_is_not_an_error() {
        let app_state = test_state(None);
        let id = seed(&app_state, "Rivers");

        let status =
            delete_history_entry_handler(State(app_state.clone()), Path("missing".to_string())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(app_state.history_summaries()[0].id, id);

        delete_history_entry_handler(State(app_state.clone()), Path(id)).await;
        assert!(app_state.history_summaries().is_empty());
    }

    #[tokio::test]
    async fn history_entry_downloads_as_text_file() {
        let app_state = test_state(None);
        let id = seed(&app_state, "Mighty Rivers");

        let response = download_history_entry_handler(State(app_state), Path(id))
            .await
            .map(IntoResponse::into_response)
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_value(&response, header::CONTENT_DISPOSITION),
            "attachment; filename=\"mighty_rivers_essay.txt\""
        );
        assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/plain"));
    }

    #[tokio::test]
    async fn unknown_download_is_not_found() {
        let app_state = test_state(None);
        let err = download_history_entry_handler(State(app_state), Path("nope".to_string()))
            .await
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_export_is_rejected() {
        let err = export_essay_handler(Json(ExportRequest {
            topic: "Rivers".to_string(),
            essay: Vec::new(),
        }))
        .await
        .map(|_| ())
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn samples_are_listed() {
        let samples = list_samples_handler().await.0;
        assert_eq!(samples.len(), sample_essays().len());
    }
}
