//! Voice-note upload (doctor only). Multipart field `audio`, audio MIME
//! allow-list, 10 MB cap. Stored files are served back at
//! `/uploads/voice-notes/<filename>`.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};

/// Upload size cap: 10 MB.
pub const MAX_VOICE_NOTE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/webm",
    "audio/mp3",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
];

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub filename: String,
}

/// `POST /api/uploads/voice-note`
pub async fn voice_note(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        if !ALLOWED_MIME_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::BadRequest(
                "Invalid file type. Only audio files are allowed.".into(),
            ));
        }

        let original_name = field.file_name().unwrap_or("voice-note").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {e}")))?;
        file = Some((original_name, content_type, bytes.to_vec()));
    }

    let (original_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("No audio file uploaded".into()))?;

    if bytes.len() > MAX_VOICE_NOTE_BYTES {
        return Err(ApiError::BadRequest("File too large. Maximum 10MB.".into()));
    }

    let extension = extension_for(&original_name, &content_type);
    let filename = format!("voice-{}{extension}", Uuid::new_v4());
    let dir = ctx.app.voice_notes_dir();

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("cannot create uploads dir: {e}")))?;
    tokio::fs::write(dir.join(&filename), &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("cannot store voice note: {e}")))?;

    tracing::info!(filename = %filename, bytes = bytes.len(), "voice note stored");

    Ok(Json(UploadResponse {
        message: "Voice note uploaded successfully".into(),
        url: format!("/uploads/voice-notes/{filename}"),
        filename,
    }))
}

/// Preserve the client's extension when present, else derive one from the
/// MIME type.
fn extension_for(original_name: &str, content_type: &str) -> String {
    if let Some((_, ext)) = original_name.rsplit_once('.') {
        if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return format!(".{ext}");
        }
    }
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
