//! Loads header (`.hjs`) files from disk

use std::fs;
use std::path::PathBuf;

use jsig_ast::HeaderProgram;
use jsig_parser::parse_header;
use jsig_typeck::{HeaderLoadError, HeaderLoader};
use log::debug;

/// Reads and parses header files from the filesystem.
///
/// By default the requested name is used as a path. An override path
/// replaces it, for headers that do not sit next to their source.
#[derive(Debug, Clone, Default)]
pub struct FsHeaderLoader {
    override_path: Option<PathBuf>,
}

impl FsHeaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: Some(path.into()),
        }
    }
}

impl HeaderLoader for FsHeaderLoader {
    fn load(&self, file_name: &str) -> Result<HeaderProgram, HeaderLoadError> {
        let path = self
            .override_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(file_name));
        debug!("reading header {}", path.display());

        let source = fs::read_to_string(&path)?;
        parse_header(&source).map_err(|errors| HeaderLoadError::Parse {
            messages: errors.iter().map(|e| e.to_string()).collect(),
        })
    }
}
