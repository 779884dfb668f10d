// Application state module
// Immutable per-server state shared by every connection

use std::path::PathBuf;

use super::types::Config;
use crate::http::finalize::FinalizeChain;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical document root, resolved once at startup
    pub root: PathBuf,
    /// Hooks run on every response before it is written
    pub finalize: FinalizeChain,
    pub access_log: bool,
}

impl AppState {
    /// Build state from configuration
    ///
    /// Fails if the document root does not exist or a configured header is invalid.
    pub fn new(config: &Config) -> Result<Self, String> {
        let root = config.server.root.canonicalize().map_err(|e| {
            format!(
                "Document root '{}' is not accessible: {e}",
                config.server.root.display()
            )
        })?;
        if !root.is_dir() {
            return Err(format!(
                "Document root '{}' is not a directory",
                root.display()
            ));
        }

        let finalize = FinalizeChain::from_config(config)?;

        Ok(Self {
            config: config.clone(),
            root,
            finalize,
            access_log: config.logging.access_log,
        })
    }
}
