//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::database::DatabaseEngine;
use crate::error::{Error, Result};
use crate::import;
use crate::server;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { .. } => self.serve().await,
            Commands::Setup => self.setup().await,
            Commands::ImportAuthors { csv } => self.import_authors(csv).await,
        }
    }

    async fn serve(&self) -> Result<()> {
        let config = self
            .cli
            .app_config()
            .ok_or_else(|| Error::config("serve settings missing"))?;
        server::serve(config).await
    }

    async fn setup(&self) -> Result<()> {
        let config = self.cli.database_config();
        DatabaseEngine::open_with_schema(&config).await?;
        tracing::info!(database = %config.path, "schema ready");
        Ok(())
    }

    async fn import_authors(&self, csv: &Path) -> Result<()> {
        let config = self.cli.database_config();
        let engine = DatabaseEngine::open_with_schema(&config).await?;
        let count = import::import_authors_file(&engine, csv).await?;
        println!("Imported {count} authors into {}", config.path);
        Ok(())
    }
}
