use axum::response::Html;

use crate::{models::ListingView, utils::escape_html};

/// Listing page: the note form with the draft, then every note's HTML.
pub fn render_index(view: &ListingView) -> Html<String> {
    let notes: String = view
        .notes
        .iter()
        .map(|note| {
            format!(
                r#"<article class="note" id="note-{id}">{content}</article>"#,
                id = note.id,
                content = note.content,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Notes</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
textarea {{ width: 100%; min-height: 8rem; }}
.note {{ border-top: 1px solid #ddd; padding: 0.5rem 0; }}
.note img {{ max-width: 100%; }}
</style>
</head>
<body>
<form method="post" action="/note" enctype="multipart/form-data">
<textarea name="description" placeholder="Write markdown here">{draft}</textarea>
<input type="file" name="image" accept="image/*">
<input type="submit" name="upload" value="Upload">
<input type="submit" name="publish" value="Publish">
</form>
<section class="notes">
{notes}
</section>
</body>
</html>
"#,
        draft = escape_html(&view.draft),
        notes = notes,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Note;

    #[test]
    fn draft_is_escaped_and_notes_are_embedded() {
        let view = ListingView {
            notes: vec![Note {
                id: 7,
                content: "<h1>Hi</h1>\n".to_string(),
                created_at: Utc::now(),
            }],
            draft: "</textarea><b>".to_string(),
        };

        let Html(page) = render_index(&view);
        assert!(page.contains("&lt;/textarea&gt;&lt;b&gt;</textarea>"));
        assert!(page.contains(r#"<article class="note" id="note-7"><h1>Hi</h1>"#));
    }
}
