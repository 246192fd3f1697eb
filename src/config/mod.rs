//! JSON runtime configuration for the command-line front end.
//!
//! ```json
//! {
//!   "input_path": "photos/machine.jpg",
//!   "output": { "json_out": "out/machine.json" },
//!   "params": { "detection_threshold": 210, "consensus": { "perspective": false } }
//! }
//! ```
//!
//! Every field is optional; missing parameter groups fall back to
//! [`ExtractorParams::default`].

use crate::error::GridError;
use crate::extractor::ExtractorParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub input_path: Option<PathBuf>,
    pub output: OutputConfig,
    pub params: ExtractorParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, GridError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| GridError::Io(format!("Failed to read config {}: {e}", path.display())))?;
    parse_config(&contents)
        .map_err(|e| GridError::Config(format!("Failed to parse config {}: {e}", path.display())))
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            r#"{
                "input_path": "machine.jpg",
                "params": {
                    "detection_threshold": 210,
                    "consensus": { "perspective": false },
                    "separators": { "smear_window": 12 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.input_path, Some(PathBuf::from("machine.jpg")));
        assert!(config.output.json_out.is_none());
        let params = config.params;
        assert_eq!(params.detection_threshold, Some(210));
        assert!(!params.consensus.perspective);
        assert_eq!(params.consensus.perspective_factor, 0.95);
        assert_eq!(params.separators.smear_window, 12);
        assert_eq!(params.separators.denoise_iterations, 2);
        assert_eq!(params.rects.min_width, 20);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/slot-grid.json")).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
        assert_eq!(err.exit_code(), -4);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let path = std::env::temp_dir().join("slot_grid_malformed_config.json");
        fs::write(&path, "{ \"params\": [1, 2] }").unwrap();
        let err = load_config(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, GridError::Config(_)), "{err}");
    }
}
