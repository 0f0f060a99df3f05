use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::{
    error::AppError,
    models::{Action, ListingView, Note, Outcome, Submission, UploadedImage},
    state::AppState,
    views::render_index,
};

/// `GET /`: listing with an empty draft.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = ListingView {
        notes: state.list_notes().await?,
        draft: String::new(),
    };
    Ok(render_index(&view))
}

/// `POST /note`: publish the draft or attach an image to it.
pub async fn submit_note(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;

    match state.handle_submission(submission).await? {
        Outcome::Redirect => Ok(Redirect::to("/").into_response()),
        Outcome::Render(view) => Ok(render_index(&view).into_response()),
    }
}

/// `GET /img/{name}`: raw bytes of a stored asset.
pub async fn get_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let content = state.fetch_asset(&name).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], content).into_response())
}

/// `GET /api/notes`: notes as JSON, newest first.
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    Ok(Json(state.list_notes().await?))
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Collect the note form fields; unknown fields are skipped.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut description = String::new();
    let mut image: Option<UploadedImage> = None;
    let mut publish: Option<String> = None;
    let mut upload: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some(UploadedImage {
                    filename,
                    content_type,
                    data,
                });
            }
            "description" => description = field.text().await.map_err(multipart_error)?,
            "publish" => publish = Some(field.text().await.map_err(multipart_error)?),
            "upload" => upload = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(Submission {
        description,
        image,
        action: Action::from_fields(publish.as_deref(), upload.as_deref()),
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    error!("Error parsing multipart: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::MultipartError(format!("Failed to parse multipart form: {}", e))
    }
}
