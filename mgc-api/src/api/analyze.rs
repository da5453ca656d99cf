//! Audio analysis endpoint
//!
//! POST /analyze takes a multipart form with one `file` field. The declared
//! media type must be MP3, WAV, OGG or M4A and the file must fit within the
//! configured upload cap; accepted files go to the analyzer.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use mgc_common::api::ClassificationResult;
use mgc_common::media::INVALID_FILE_TYPE_MESSAGE;
use mgc_common::AudioMediaType;
use tracing::Instrument;
use uuid::Uuid;

use crate::analyzer::AudioUpload;
use crate::error::{method_not_allowed, ApiError, ApiResult};
use crate::AppState;

const FILE_FIELD: &str = "file";
const GENERIC_FAILURE: &str = "Error processing audio file";

/// POST /analyze
pub async fn analyze_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze", request_id = %request_id);

    async move {
        let mut multipart = multipart.map_err(|e| {
            tracing::error!(error = %e, "Request is not a readable multipart form");
            ApiError::Internal(GENERIC_FAILURE.to_string())
        })?;

        let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

        tracing::info!(
            file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
            media_type = %upload.media_type,
            bytes = upload.bytes.len(),
            "Analyzing upload"
        );

        let result = state.analyzer.analyze(&upload).await.map_err(|e| {
            tracing::error!(error = %e, "Analysis failed");
            ApiError::Internal(e.client_message())
        })?;

        if let Err(e) = result.validate() {
            tracing::error!(error = %e, "Analyzer returned a malformed result");
            return Err(ApiError::Internal(
                "Failed to parse analysis results".to_string(),
            ));
        }

        Ok(Json(result))
    }
    .instrument(span)
    .await
}

/// Pull the first `file` field out of the form, checking type and size
async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> ApiResult<AudioUpload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::BadRequest("No file uploaded".to_string())),
            Err(e) => return Err(multipart_error(e, max_bytes)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let Some(media_type) = declared.as_deref().and_then(AudioMediaType::parse) else {
            tracing::warn!(declared = ?declared, "Rejected upload with disallowed media type");
            return Err(ApiError::BadRequest(INVALID_FILE_TYPE_MESSAGE.to_string()));
        };

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty());
        let bytes = read_capped(field, max_bytes).await?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("No file uploaded".to_string()));
        }

        return Ok(AudioUpload {
            file_name,
            media_type,
            bytes,
        });
    }
}

/// Read a field's body, failing as soon as it exceeds `max_bytes`
async fn read_capped(mut field: Field<'_>, max_bytes: usize) -> ApiResult<Vec<u8>> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn multipart_error(error: MultipartError, max_bytes: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(max_bytes);
    }
    tracing::error!(error = %error.body_text(), "Failed to parse multipart form");
    ApiError::Internal(GENERIC_FAILURE.to_string())
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::BadRequest(format!(
        "File too large. Maximum size is {}",
        size_label(max_bytes)
    ))
}

/// "10 MB" for whole mebibytes, otherwise the usual size formatting
fn size_label(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        mgc_common::media::format_file_size(bytes as u64)
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_audio).fallback(method_not_allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_label() {
        assert_eq!(size_label(10 * 1024 * 1024), "10 MB");
        assert_eq!(size_label(1536), "1.5 KB");
    }
}
