// Request field validation

/// Folder used when the caller names none.
pub const DEFAULT_FOLDER: &str = "default";

/// Resolve a caller-supplied folder name.
///
/// Surrounding whitespace is trimmed; an empty name becomes [`DEFAULT_FOLDER`].
/// Returns `None` unless every character is in `[A-Za-z0-9_-]`.
pub fn sanitize_folder(raw: &str) -> Option<String> {
    let folder = raw.trim();
    if folder.is_empty() {
        return Some(DEFAULT_FOLDER.to_string());
    }
    if folder
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Some(folder.to_string())
    } else {
        None
    }
}

/// Lower-cased extension of the final path component of `filename`.
///
/// Both `/` and `\` are treated as separators since browsers on Windows may
/// send full paths.
pub fn extension_of(filename: &str) -> Option<String> {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let (_, ext) = base.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_folders_unchanged() {
        for name in ["team-a", "A_b-9", "default", "x", "UPPER", "2024_q1"] {
            assert_eq!(sanitize_folder(name).as_deref(), Some(name));
        }
    }

    #[test]
    fn test_folder_trimmed() {
        assert_eq!(sanitize_folder("  team-a\t").as_deref(), Some("team-a"));
    }

    #[test]
    fn test_empty_folder_is_default() {
        assert_eq!(sanitize_folder("").as_deref(), Some("default"));
        assert_eq!(sanitize_folder("   ").as_deref(), Some("default"));
    }

    #[test]
    fn test_invalid_folders_rejected() {
        for name in ["../etc", "a/b", "a b", "a.b", "é", "a\\b", "a%2e", ".."] {
            assert_eq!(sanitize_folder(name), None, "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("archive.tar.Gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("C:\\Users\\me\\cat.JpEg").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("dir.d/noext"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(".webp").as_deref(), Some("webp"));
    }
}
