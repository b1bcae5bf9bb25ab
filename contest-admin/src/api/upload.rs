//! Ingestion endpoints: POST /api/admin/upload-csv/{teams,results}
//!
//! Both routes share one generic handler body. Authorization has already
//! happened in [`super::auth::require_admin`] by the time these run.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::ingest::{persist_batch, process_batch, PersistError, StoredEntity};
use crate::models::{ResultRecord, SessionId, TeamRecord};
use crate::AppState;

/// Successful upload summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub inserted: usize,
    pub replaced: bool,
    pub session_name: String,
}

/// Uploaded file as read from the multipart body
#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    content: Vec<u8>,
}

/// The three form fields an upload carries
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    replace_existing: bool,
    session_id: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await?;
                form.file = Some(UploadedFile {
                    file_name,
                    content: content.to_vec(),
                });
            }
            Some("replaceExisting") => {
                let value = field.text().await?;
                form.replace_existing = value == "true";
            }
            Some("sessionId") => {
                let value = field.text().await?;
                form.session_id = Some(value);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn is_csv_file_name(name: &str) -> bool {
    name.len() > 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".csv"))
}

fn persist_error<E: StoredEntity>(err: PersistError) -> ApiError {
    match err {
        PersistError::UnknownSession(id) => ApiError::Persistence {
            error: "Session not found".to_string(),
            details: id.to_string(),
        },
        PersistError::Delete(e) => ApiError::Persistence {
            error: E::KIND.clear_failed_message().to_string(),
            details: e.to_string(),
        },
        PersistError::Insert(e) => ApiError::Persistence {
            error: "Database insertion failed".to_string(),
            details: e.to_string(),
        },
        PersistError::Store(e) => {
            error!(kind = %E::KIND, error = %e, "Store unavailable during upload");
            ApiError::Internal(e.to_string())
        }
    }
}

/// Validate the form, run the batch, persist it
async fn ingest<E: StoredEntity>(state: &AppState, multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let form = read_form(multipart).await?;

    let file = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let session_id = form
        .session_id
        .as_deref()
        .and_then(SessionId::parse)
        .ok_or_else(|| ApiError::BadRequest("Session selection is required".to_string()))?;

    if !is_csv_file_name(&file.file_name) {
        return Err(ApiError::BadRequest("Please upload a CSV file".to_string()));
    }

    let text = String::from_utf8(file.content)
        .map_err(|e| ApiError::CsvParse(vec![format!("File is not valid UTF-8: {}", e)]))?;

    info!(
        kind = %E::KIND,
        session_id = %session_id,
        file = %file.file_name,
        bytes = text.len(),
        replace = form.replace_existing,
        "CSV upload received"
    );

    let entities = process_batch::<E>(&text, &session_id)?;

    let summary = persist_batch(&state.db, &state.locks, &session_id, &entities, form.replace_existing)
        .await
        .map_err(persist_error::<E>)?;

    Ok(Json(UploadResponse {
        success: true,
        message: E::KIND.uploaded_message().to_string(),
        inserted: summary.inserted_count,
        replaced: summary.replaced,
        session_name: summary.session_label,
    }))
}

/// POST /api/admin/upload-csv/teams
pub async fn upload_teams(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    ingest::<TeamRecord>(&state, multipart).await
}

/// POST /api/admin/upload-csv/results
pub async fn upload_results(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    ingest::<ResultRecord>(&state, multipart).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_extension_check() {
        assert!(is_csv_file_name("teams.csv"));
        assert!(is_csv_file_name("TEAMS.CSV"));
        assert!(!is_csv_file_name(".csv"));
        assert!(!is_csv_file_name("teams.xlsx"));
        assert!(!is_csv_file_name("teams.csv.txt"));
        assert!(!is_csv_file_name(""));
        assert!(!is_csv_file_name("ü.cs"));
    }
}
