use crate::domain::{DpestError, DpestResult};
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn read_source(path: &Path, code: &'static str) -> DpestResult<String> {
    fs::read_to_string(path).map_err(|source| {
        DpestError::io(
            code,
            format!("failed to read '{}': {}", path.display(), source),
        )
    })
}

pub fn write_text_artifact(path: &Path, content: &str, code: &'static str) -> DpestResult<()> {
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        DpestError::io(
            code,
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}
