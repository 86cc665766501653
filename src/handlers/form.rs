// handlers/form.rs - multipart workspace form (name, slug, description, image)

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::services::workspace_service::size_label;
use crate::services::{ImageFile, WorkspaceForm};

/// Read a submitted workspace form. The image part is checked here, before any
/// upload can happen: it must be `image/*` and no larger than `max_image_bytes`.
/// An empty file part is treated as "no image".
pub async fn read_workspace_form(mut multipart: Multipart, max_image_bytes: usize) -> Result<WorkspaceForm, ApiError> {
    let mut form = WorkspaceForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = field.text().await.map_err(multipart_error)?,
            "slug" => form.slug = field.text().await.map_err(multipart_error)?,
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                if bytes.is_empty() {
                    continue;
                }
                if !content_type.starts_with("image/") {
                    return Err(ApiError::field_error("image", "File must be an image"));
                }
                if bytes.len() > max_image_bytes {
                    return Err(ApiError::field_error(
                        "image",
                        format!("Image must be smaller than {}", size_label(max_image_bytes)),
                    ));
                }

                let mut file = ImageFile::new(bytes.to_vec(), content_type);
                file.filename = filename;
                form.image = Some(file);
            }
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        ApiError::bad_request(format!("Invalid form data: {}", err.body_text()))
    }
}
