//! Application state for the pdfdesk API

use anyhow::Result;
use pdfdesk_store::ArtifactStore;

pub struct AppState {
    pub store: ArtifactStore,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let uploads_root =
            std::env::var("PDFDESK_UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());

        tracing::info!("Using uploads root: {uploads_root}");
        let store = ArtifactStore::open(&uploads_root)?;

        Ok(Self { store })
    }
}
