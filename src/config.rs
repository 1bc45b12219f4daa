//! Board dimensions read once from the game's JSON state file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Used for every field the state file does not provide.
pub const DEFAULT_DIMENSION: usize = 10;

/// The three integers the reasoner needs from the state file.
///
/// Other fields in the file are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    pub n_rows: Option<usize>,
    pub n_cols: Option<usize>,
    pub n_mines: Option<usize>,
}

impl BoardConfig {
    /// Best-effort load: any read or parse failure yields all defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Using default board dimensions: {}", err);
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Parses an in-memory state document with the same fallback as [`load`](Self::load).
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse board state, using defaults: {}", err);
                Self::default()
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.n_rows.unwrap_or(DEFAULT_DIMENSION)
    }

    pub fn cols(&self) -> usize {
        self.n_cols.unwrap_or(DEFAULT_DIMENSION)
    }

    pub fn mines(&self) -> usize {
        self.n_mines.unwrap_or(DEFAULT_DIMENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dims(config: &BoardConfig) -> (usize, usize, usize) {
        (config.rows(), config.cols(), config.mines())
    }

    #[test]
    fn test_full_state_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_rows": 16, "n_cols": 30, "n_mines": 99, "revealed": []}}"#).unwrap();

        let config = BoardConfig::load(file.path());
        assert_eq!(dims(&config), (16, 30, 99));
    }

    #[test]
    fn test_missing_fields_default_individually() {
        let config = BoardConfig::from_json_str(r#"{"n_cols": 8}"#);
        assert_eq!(dims(&config), (10, 8, 10));
    }

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(BoardConfig::try_load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(dims(&BoardConfig::load(&path)), (10, 10, 10));
    }

    #[test]
    fn test_malformed_file_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ n_rows: 5").unwrap();

        assert!(matches!(BoardConfig::try_load(file.path()), Err(ConfigError::Parse(_))));
        assert_eq!(dims(&BoardConfig::load(file.path())), (10, 10, 10));
    }

    #[test]
    fn test_wrongly_typed_field_defaults_everything() {
        let config = BoardConfig::from_json_str(r#"{"n_rows": "five", "n_cols": 4}"#);
        assert_eq!(dims(&config), (10, 10, 10));

        let config = BoardConfig::from_json_str(r#"{"n_rows": -3}"#);
        assert_eq!(dims(&config), (10, 10, 10));
    }

    #[test]
    fn test_null_field_defaults() {
        let config = BoardConfig::from_json_str(r#"{"n_rows": null, "n_mines": 3}"#);
        assert_eq!(dims(&config), (10, 10, 3));
    }
}
