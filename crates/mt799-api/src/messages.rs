use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use mt799_db::models::SwiftMessageRow;
use mt799_types::api::{SwiftMessageResponse, UploadResponse};

use crate::{ApiError, AppState};

/// Form field the message file is expected under. Any part carrying a
/// filename is accepted as well.
const FILE_FIELD: &str = "file";

const SAVED_MESSAGE: &str = "File processed and saved successfully.";
const NOT_SAVED_MESSAGE: &str = "File processed but could not be saved to the database.";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// POST /api/SwiftMessage: multipart upload of one MT799 text file.
///
/// A store failure does not fail the request: the parsed fields are still
/// returned, with `savedToDatabase: false`.
pub async fn upload_message(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Input(e.body_text()))?;
    let bytes = read_file_part(&mut multipart, state.max_upload_bytes).await?;

    let content = String::from_utf8_lossy(&bytes);
    let parsed = mt799_parser::parse(&content)?;

    let db = state.clone();
    let msg = parsed.clone();
    let saved_id = match tokio::task::spawn_blocking(move || db.db.persist(&msg)).await {
        Ok(Ok(id)) => Some(id),
        Ok(Err(e)) => {
            error!("Failed to persist MT799 message: {}", e);
            None
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            None
        }
    };

    let response = match saved_id {
        Some(id) => {
            info!("Stored MT799 message {} as row {}", parsed.reference, id);
            UploadResponse {
                message: SAVED_MESSAGE.to_string(),
                parsed_fields: parsed,
                saved_to_database: true,
                id: Some(id),
            }
        }
        None => UploadResponse {
            message: NOT_SAVED_MESSAGE.to_string(),
            parsed_fields: parsed,
            saved_to_database: false,
            id: None,
        },
    };

    Ok(Json(response))
}

/// GET /api/SwiftMessage?limit=N: newest stored messages first.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SwiftMessageResponse>>, ApiError> {
    let limit = query.limit.min(200);
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_messages(limit))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// GET /api/SwiftMessage/{id}
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SwiftMessageResponse>, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_message(id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or_else(|| ApiError::NotFound(format!("message {}", id)))?;

    Ok(Json(to_response(row)))
}

/// Drain the first file part of the form. Other fields are skipped.
async fn read_file_part(multipart: &mut Multipart, max_bytes: usize) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes, ApiError::Input))?
    {
        if field.name() != Some(FILE_FIELD) && field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().unwrap_or("<unnamed>").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes, ApiError::Read))?;

        if bytes.is_empty() {
            return Err(ApiError::Input("uploaded file is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(ApiError::TooLarge(max_bytes));
        }

        debug!("Received upload {} ({} bytes)", file_name, bytes.len());
        return Ok(bytes);
    }

    Err(ApiError::Input("no file supplied".to_string()))
}

fn multipart_error(
    err: MultipartError,
    max_bytes: usize,
    otherwise: fn(String) -> ApiError,
) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge(max_bytes)
    } else {
        otherwise(err.body_text())
    }
}

fn to_response(row: SwiftMessageRow) -> SwiftMessageResponse {
    SwiftMessageResponse {
        id: row.id,
        reference: row.reference,
        related_reference: row.related_reference,
        narrative: row.narrative,
    }
}
