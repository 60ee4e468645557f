//! Loading `[wrap-git]` declarations from disk.

use std::io::Read;
use std::path::{Path, PathBuf};

use wrap_ini::Document;

use crate::error::DeclarationError;

/// Section holding the git source of a subproject.
pub const WRAP_GIT_SECTION: &str = "wrap-git";

/// One pinned-revision declaration.
///
/// Empty values are normalized to `None`, so `url =` counts as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The file the declaration was read from.
    pub source_path: PathBuf,
    /// Remote repository URL.
    pub url: Option<String>,
    /// Commit hash or tag name.
    pub revision: Option<String>,
}

impl Declaration {
    /// Build a declaration from already-known values.
    #[must_use]
    pub fn new(
        source_path: impl Into<PathBuf>,
        url: Option<&str>,
        revision: Option<&str>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            url: non_empty(url),
            revision: non_empty(revision),
        }
    }

    /// Parse a declaration from file content.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::Parse`] for malformed content and
    /// [`DeclarationError::NotWrapGit`] when there is no `[wrap-git]` section.
    pub fn parse(source_path: &Path, content: &str) -> Result<Self, DeclarationError> {
        let doc = Document::parse(content).map_err(|source| DeclarationError::Parse {
            path: source_path.to_path_buf(),
            source,
        })?;
        let section = doc
            .section(WRAP_GIT_SECTION)
            .ok_or(DeclarationError::NotWrapGit)?;
        Ok(Self::new(
            source_path,
            section.get("url"),
            section.get("revision"),
        ))
    }

    /// Read and parse a declaration file, refusing files over `max_file_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`DeclarationError`] if the file cannot be read, is too large,
    /// is not UTF-8, or does not parse.
    pub fn read(path: &Path, max_file_size: u64) -> Result<Self, DeclarationError> {
        let content = read_bounded(path, max_file_size)?;
        Self::parse(path, &content)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Read at most `max_file_size` bytes; one extra byte detects oversized files.
fn read_bounded(path: &Path, max_file_size: u64) -> Result<String, DeclarationError> {
    let io_err = |source| DeclarationError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;

    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(io_err)?;

    if buffer.len() as u64 > max_file_size {
        return Err(DeclarationError::TooLarge {
            path: path.to_path_buf(),
            limit: max_file_size,
        });
    }

    String::from_utf8(buffer).map_err(|_| DeclarationError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}
