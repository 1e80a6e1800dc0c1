//! Build settings
//!
//! Read from a JSON file in the project root. Every key is optional:
//!
//! ```json
//! {
//!     "src": "src",
//!     "out": "out/app.js",
//!     "node": "node",
//!     "tsc": "node_modules/typescript/bin/tsc"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default settings file name, looked up in the project root
pub const SETTINGS_FILE: &str = "tsbuild.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Source directory, relative to the project root
    pub src: String,
    /// Compiler output file, relative to the project root
    pub out: String,
    /// Node executable
    pub node: String,
    /// TypeScript compiler script run by `node`
    pub tsc: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            out: "out/app.js".to_string(),
            node: "node".to_string(),
            tsc: "node_modules/typescript/bin/tsc".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Source directory under `root`
    pub fn src_dir(&self, root: &Path) -> PathBuf {
        root_relative(root, &self.src)
    }

    /// Output file under `root`
    pub fn out_file(&self, root: &Path) -> PathBuf {
        root_relative(root, &self.out)
    }
}

/// Join `value` onto `root`, treating a leading separator as root-relative
fn root_relative(root: &Path, value: &str) -> PathBuf {
    let relative: PathBuf = Path::new(value)
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    root.join(relative)
}
