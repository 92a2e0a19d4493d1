//! Library file records and display-name cleanup.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading classification tag such as `[B] `, `[C] ` or `[D] `.
static TAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[A-Z]\]\s+").expect("valid tag prefix pattern"));

/// Trailing ` [0100C1300BBC6000][v0-0].ext`: title id, optional version, extension.
static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+\[[0-9A-F]{16}\](?:\[v[0-9.\-]+\])?(\.[A-Za-z0-9]+)$")
        .expect("valid title suffix pattern")
});

/// A single file discovered in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFile {
    /// Exact on-disk file name.
    pub name: String,
    /// Human-friendly name with tags and title ids removed.
    pub display_name: String,
    /// Full path: library root, parent directory, name.
    pub path: PathBuf,
    /// Size in bytes as reported at scan time.
    pub size: u64,
    /// Name of the library subdirectory holding this file.
    pub parent_dir: String,
}

impl LibraryFile {
    /// Build a record, deriving the display name and path.
    pub fn new(
        root: impl Into<PathBuf>,
        parent_dir: impl Into<String>,
        name: impl Into<String>,
        size: u64,
    ) -> Self {
        let parent_dir = parent_dir.into();
        let name = name.into();
        let path = root.into().join(&parent_dir).join(&name);

        Self {
            display_name: cleanup_file_name(&name),
            name,
            path,
            size,
            parent_dir,
        }
    }
}

/// Clean up a raw package file name for display.
///
/// `[B] Game1 Base [01234567890ABCDE][v0].nsp` becomes `Game1 Base.nsp`.
/// Rules are applied until the name stops changing, so the result is a
/// fixed point and cleaning it again is a no-op.
pub fn cleanup_file_name(file_name: &str) -> String {
    let mut current = file_name.to_string();
    loop {
        let without_tag = TAG_PREFIX.replace(&current, "");
        let cleaned = TITLE_SUFFIX.replace(&without_tag, "$1").into_owned();
        if cleaned == current {
            return cleaned;
        }
        current = cleaned;
    }
}

/// Lowercased extension of a file name including the leading dot.
///
/// Returns `None` when the name has no dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rfind('.')
        .map(|idx| file_name[idx..].to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_base_and_update() {
        assert_eq!(
            cleanup_file_name("[B] Game1 Base [01234567890ABCDE][v0].nsp"),
            "Game1 Base.nsp"
        );
        assert_eq!(
            cleanup_file_name("[C] Game1 Update [01234567890ABCDE][v1].nsp"),
            "Game1 Update.nsp"
        );
    }

    #[test]
    fn test_cleanup_dotted_version() {
        assert_eq!(
            cleanup_file_name("[B] Abzû [0100C1300BBC6000][v0-0].nsp"),
            "Abzû.nsp"
        );
        assert_eq!(
            cleanup_file_name("Game [0100C1300BBC6000][v1.2.3].nsp"),
            "Game.nsp"
        );
    }

    #[test]
    fn test_cleanup_without_version() {
        assert_eq!(cleanup_file_name("Game2 [FEDCBA9876543210].nsp"), "Game2.nsp");
    }

    #[test]
    fn test_cleanup_passthrough() {
        for name in [
            "readme.txt",
            "[b] lowercase tag.nsp",
            "[B]NoSpace.nsp",
            "Game [0123456789abcdef].nsp",
            "Game [0123].nsp",
            "",
        ] {
            assert_eq!(cleanup_file_name(name), name);
        }
    }

    #[test]
    fn test_cleanup_idempotent() {
        for name in [
            "[B] Game1 Base [01234567890ABCDE][v0].nsp",
            "[A] [B] Stacked.nsp",
            "X [0123456789ABCDEF] [FEDCBA9876543210][v2].nsp",
            "plain.bin",
        ] {
            let once = cleanup_file_name(name);
            assert_eq!(cleanup_file_name(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn test_library_file_new() {
        let file = LibraryFile::new(
            "/library",
            "Game1",
            "[B] Game1 Base [01234567890ABCDE][v0].nsp",
            42,
        );
        assert_eq!(file.display_name, "Game1 Base.nsp");
        assert_eq!(
            file.path,
            PathBuf::from("/library/Game1/[B] Game1 Base [01234567890ABCDE][v0].nsp")
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.NSP").as_deref(), Some(".nsp"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(extension_of("noext"), None);
    }
}
