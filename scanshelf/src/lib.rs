use std::sync::Arc;

use anyhow::Context;
use scanshelf_core::config::StoreConfig;
use scanshelf_core::storage::MetadataStore;

use crate::cli::Cli;

pub mod cli;
pub mod commands;
pub mod logging;

pub struct AppContext {
    pub config: StoreConfig,
    pub store: Arc<MetadataStore>,
}

impl AppContext {
    pub fn new(config: StoreConfig) -> Self {
        let store = Arc::new(MetadataStore::open(&config));
        AppContext { config, store }
    }

    /// Resolves the data directory from the command line (or environment), falling back
    /// to the platform default.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.data_dir {
            Some(dir) => StoreConfig::new(dir),
            None => StoreConfig::default_location()
                .context("No --data-dir given and no platform data directory available")?,
        };
        Ok(Self::new(config.with_preferences_name(cli.preferences.as_str())))
    }
}
