use axum::extract::{multipart::MultipartRejection, Multipart};

use crate::error::ApiError;
use crate::services::upload_service::FILE_FIELD;
use crate::services::{PostInput, UploadedFile};

/// Read a post submission from a multipart body
///
/// At most one file is accepted, and only under the `file` field. A file
/// part with an empty name and no content (an untouched browser file input)
/// counts as no file.
pub async fn read_post_form(multipart: Result<Multipart, MultipartRejection>) -> Result<PostInput, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut input = PostInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            if name != FILE_FIELD {
                return Err(ApiError::bad_request(format!("Unexpected file field '{}'", name)));
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file data: {}", e)))?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            if input.file.is_some() {
                return Err(ApiError::bad_request("Only one file may be uploaded per request"));
            }
            input.file = Some(UploadedFile { file_name, bytes });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read field '{}': {}", name, e)))?;

        match name.as_str() {
            "id" => input.id = Some(value),
            "title" => input.title = Some(value),
            "summary" => input.summary = Some(value),
            "content" => input.content = Some(value),
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(input)
}
