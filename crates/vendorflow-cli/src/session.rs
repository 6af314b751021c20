//! Session file location and client construction.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;

use vendorflow_core::ApiUrl;
use vendorflow_file::FileStorage;
use vendorflow_http::{ApiClient, ClientConfig};

use crate::navigator::CliNavigator;

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
}

impl Context {
    pub fn new(api_url: Option<String>, session_file: Option<PathBuf>) -> Self {
        Self {
            api_url,
            session_file,
        }
    }

    /// The session file path, creating its directory when defaulted.
    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.session_file {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("", "", "vendorflow")
            .context("Could not determine data directory")?;
        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;

        Ok(data_dir.join("session.json"))
    }

    pub fn client(&self) -> Result<ApiClient> {
        let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
        if let Some(ref url) = self.api_url {
            config.api_url = ApiUrl::new(url).context("Invalid API URL")?;
        }

        let path = self.session_path()?;
        tracing::debug!(session = %path.display(), api_url = %config.api_url, "Using session file");

        ApiClient::builder(config)
            .storage(Arc::new(FileStorage::new(path)))
            .navigator(Arc::new(CliNavigator))
            .build()
            .context("Failed to build HTTP client")
    }
}
