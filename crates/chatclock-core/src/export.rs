//! Reading chat export files

use std::path::Path;

use crate::error::{ChatClockError, Result};

/// Split export text into lines, accepting `\r\n`, `\n` and lone `\r`.
pub fn split_lines(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    text.replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(str::to_string)
        .collect()
}

/// Read a whole export into lines.
///
/// Invalid UTF-8 sequences are replaced rather than failing the read; only
/// an unreadable file is an error.
pub fn read_export(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| ChatClockError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let lines = split_lines(&text);
    tracing::debug!(path = %path.display(), lines = lines.len(), "read chat export");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_lines_mixed_endings() {
        assert_eq!(split_lines("a\r\nb\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_lines_strips_bom() {
        assert_eq!(split_lines("\u{FEFF}1/2/25, 10:00 - A: hi"), vec!["1/2/25, 10:00 - A: hi"]);
    }

    #[test]
    fn test_split_lines_empty() {
        assert!(split_lines("").is_empty());
        assert!(split_lines("\u{FEFF}").is_empty());
    }

    #[test]
    fn test_read_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        fs::write(&path, "1/2/25, 10:00 - A: hi\r\n1/2/25, 10:01 - B: hey\r\n").unwrap();

        let lines = read_export(&path).unwrap();
        assert_eq!(lines, vec!["1/2/25, 10:00 - A: hi", "1/2/25, 10:01 - B: hey", ""]);
    }

    #[test]
    fn test_read_export_invalid_utf8_is_lossy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        fs::write(&path, b"1/2/25, 10:00 - A: caf\xe9\n").unwrap();

        let lines = read_export(&path).unwrap();
        assert!(lines[0].starts_with("1/2/25, 10:00 - A: caf"));
    }

    #[test]
    fn test_read_export_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        match read_export(&path) {
            Err(ChatClockError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
