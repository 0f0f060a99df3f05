use bytes::Bytes;
use tracing::info;

use crate::{
    error::AppError,
    markdown::render_markdown,
    models::{Action, ListingView, Note, Outcome, Submission, UploadedImage},
    state::AppState,
    storage::Storage,
    utils::{generate_asset_name, get_file_extension},
};

impl AppState {
    /// All notes, newest first.
    pub async fn list_notes(&self) -> Result<Vec<Note>, AppError> {
        let mut notes = self.notes.list().await?;
        notes.reverse();
        Ok(notes)
    }

    /// Apply a note form submission and decide what the browser sees next.
    pub async fn handle_submission(&self, submission: Submission) -> Result<Outcome, AppError> {
        let Submission {
            description,
            image,
            action,
        } = submission;

        match action {
            Action::Publish => {
                self.publish(&description).await?;
                Ok(Outcome::Redirect)
            }
            Action::Upload => {
                let draft = match image.filter(|image| !image.filename.is_empty()) {
                    Some(image) => self.attach_image(&description, image).await?,
                    None => description,
                };
                Ok(Outcome::Render(ListingView {
                    notes: self.list_notes().await?,
                    draft,
                }))
            }
            Action::None => Ok(Outcome::Render(ListingView {
                notes: self.list_notes().await?,
                draft: description,
            })),
        }
    }

    /// Raw bytes of a stored asset.
    pub async fn fetch_asset(&self, name: &str) -> Result<Bytes, AppError> {
        Ok(self.storage.get(name).await?)
    }

    /// Render and store `description`; blank input is skipped.
    async fn publish(&self, description: &str) -> Result<Option<Note>, AppError> {
        let text = description.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let note = self.notes.insert(&render_markdown(text)).await?;
        info!("Published note {}", note.id);
        Ok(Some(note))
    }

    /// Store the image under a fresh name and return the draft with its reference appended.
    async fn attach_image(&self, description: &str, image: UploadedImage) -> Result<String, AppError> {
        let extension = get_file_extension(&image.filename).ok_or_else(|| {
            AppError::BadRequest(format!("File {} has no extension", image.filename))
        })?;

        let size = image.data.len() as u64;
        if size > self.config.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size {} exceeds maximum limit of {} bytes",
                size, self.config.max_file_size
            )));
        }

        let name = generate_asset_name(&extension);
        let content_type = image
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        self.storage.put(&name, image.data, content_type).await?;

        info!("Uploaded {} as {} ({} bytes)", image.filename, name, size);
        Ok(format!("{} ![]({})", description, self.storage.public_path(&name)))
    }
}
