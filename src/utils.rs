use uuid::Uuid;

/// Everything after the first `.` of a filename, lowercased.
///
/// Empty segments are dropped (`photo..jpg` -> `jpg`). `None` when nothing
/// is left or a segment holds anything but ASCII letters and digits, since
/// the extension ends up in asset names and in markdown.
pub fn get_file_extension(filename: &str) -> Option<String> {
    let (_, rest) = filename.split_once('.')?;
    let segments: Vec<&str> = rest.split('.').filter(|s| !s.is_empty()).collect();

    if segments.is_empty()
        || !segments
            .iter()
            .all(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return None;
    }
    Some(segments.join(".").to_ascii_lowercase())
}

/// Fresh asset name of the form `<uuid>.<extension>`.
pub fn generate_asset_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Escape text for use inside HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_first_dot() {
        assert_eq!(get_file_extension("cat.png").as_deref(), Some("png"));
        assert_eq!(get_file_extension("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(get_file_extension("archive.tar.gz").as_deref(), Some("tar.gz"));
    }

    #[test]
    fn missing_extension_is_none() {
        assert_eq!(get_file_extension("README"), None);
        assert_eq!(get_file_extension("trailing."), None);
        assert_eq!(get_file_extension("dots.."), None);
    }

    #[test]
    fn repeated_dots_collapse() {
        assert_eq!(get_file_extension("photo..jpg").as_deref(), Some("jpg"));
    }

    #[test]
    fn markup_in_extension_is_rejected() {
        assert_eq!(get_file_extension("a.png)[x](javascript:alert(1)"), None);
        assert_eq!(get_file_extension("a.png/../x"), None);
        assert_eq!(get_file_extension("a.p ng"), None);
    }

    #[test]
    fn asset_name_is_uuid_plus_extension() {
        let name = generate_asset_name("png");
        let (id, ext) = name.split_once('.').unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(ext, "png");
        assert_ne!(name, generate_asset_name("png"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
