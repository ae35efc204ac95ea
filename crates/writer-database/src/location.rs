//! Parsing of `DATABASE_URL` values into something SQLite can open.

use crate::{DatabaseError, DatabaseResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// `:memory:`; private to the connection.
    Memory,
    /// A `file:` URI, handed to SQLite unchanged.
    Uri(String),
    /// A plain filesystem path.
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parse a connection string.
    ///
    /// Accepts a bare path, `:memory:`, a `file:` URI, or a path behind a
    /// `sqlite://` or `sqlite:` scheme prefix.
    pub fn parse(url: &str) -> DatabaseResult<Self> {
        let trimmed = url.trim();
        let rest = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite3://"))
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        if rest.is_empty() {
            return Err(DatabaseError::InvalidUrl(format!(
                "'{url}' does not name a database"
            )));
        }

        if rest == ":memory:" {
            return Ok(Self::Memory);
        }

        if rest.starts_with("file:") {
            return Ok(Self::Uri(rest.to_string()));
        }

        Ok(Self::File(PathBuf::from(rest)))
    }

    /// Create the parent directory of a file database if it is missing.
    pub(crate) fn ensure_parent_dir(&self) -> DatabaseResult<()> {
        if let Self::File(path) = self {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// The string handed to SQLite's open call.
    pub(crate) fn open_target(&self) -> &Path {
        match self {
            Self::Memory => Path::new(":memory:"),
            Self::Uri(uri) => Path::new(uri),
            Self::File(path) => path,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
            || matches!(self, Self::Uri(uri) if uri.contains("mode=memory"))
    }
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::Uri(uri) => f.write_str(uri),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        assert_eq!(
            DatabaseLocation::parse("./data/rinha.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("./data/rinha.db"))
        );
    }

    #[test]
    fn test_scheme_prefixes_are_stripped() {
        assert_eq!(
            DatabaseLocation::parse("sqlite:///var/lib/app.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("/var/lib/app.db"))
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite:app.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("app.db"))
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite::memory:").unwrap(),
            DatabaseLocation::Memory
        );
    }

    #[test]
    fn test_file_uri_is_kept_verbatim() {
        let location = DatabaseLocation::parse("file:app.db?cache=shared").unwrap();
        assert_eq!(location, DatabaseLocation::Uri("file:app.db?cache=shared".into()));
        assert!(!location.is_memory());
        assert!(DatabaseLocation::parse("file:x?mode=memory").unwrap().is_memory());
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert!(matches!(
            DatabaseLocation::parse("  "),
            Err(DatabaseError::InvalidUrl(_))
        ));
        assert!(matches!(
            DatabaseLocation::parse("sqlite://"),
            Err(DatabaseError::InvalidUrl(_))
        ));
    }
}
