//! Utility functions for token handling and file placement

use std::io;
use std::path::Path;

/// Remove every whitespace character from `s`
///
/// # Examples
///
/// ```
/// use vhd_autonotes::utils::strip_whitespace;
///
/// assert_eq!(strip_whitespace(" a, b\t,c\n"), "a,b,c");
/// ```
#[must_use]
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Move `source` to `dest`, replacing any existing file at `dest`
///
/// Tries a rename first. Temporary workspaces usually live on a different
/// filesystem than the output tree, so a cross-device rename falls back to
/// copy followed by removal of the source.
pub async fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match tokio::fs::rename(source, dest).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(?source, ?dest, "cross-device rename, copying instead");
            tokio::fs::copy(source, dest).await?;
            tokio::fs::remove_file(source).await
        }
        Err(e) => Err(e),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_whitespace_handles_unicode_spaces() {
        assert_eq!(strip_whitespace("a,\u{00a0}b,\u{2003}c"), "a,b,c");
        assert_eq!(strip_whitespace("   "), "");
        assert_eq!(strip_whitespace(""), "");
    }

    #[tokio::test]
    async fn test_move_file_moves_content() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("release-notes.txt");
        let dest = temp.path().join("1.0.240101.txt");
        tokio::fs::write(&source, "notes").await.unwrap();

        move_file(&source, &dest).await.unwrap();

        assert!(!source.exists(), "source must be gone after move");
        assert_eq!(tokio::fs::read_to_string(&dest).await.unwrap(), "notes");
    }

    #[tokio::test]
    async fn test_move_file_overwrites_existing_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("new.txt");
        let dest = temp.path().join("old.txt");
        tokio::fs::write(&source, "new").await.unwrap();
        tokio::fs::write(&dest, "old").await.unwrap();

        move_file(&source, &dest).await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&dest).await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_move_file_reports_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = move_file(&temp.path().join("absent"), &temp.path().join("dest"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
