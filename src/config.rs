// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_PORT: u16 = 8200;

/// Runtime paths and server settings, resolved from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub port: u16,
}

impl AppConfig {
    /// Resolve configuration from environment variables.
    ///
    /// `CVFORGE_ENV` (or `ENVIRONMENT` / `ENV`) selects the environment;
    /// production roots everything under /app, anything else under the
    /// current working directory.
    pub fn load() -> Result<Self> {
        let environment = Self::environment_name();
        info!("Loading configuration for environment: {}", environment);

        let root = if environment == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let port = match std::env::var("CVFORGE_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid CVFORGE_PORT value: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            environment,
            data_path: root.join("data"),
            output_path: root.join("output"),
            port,
        })
    }

    fn environment_name() -> String {
        std::env::var("CVFORGE_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_path.join("profiles")
    }

    pub fn draft_path(&self) -> PathBuf {
        self.data_path.join("draft.json")
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        let dirs = [&self.data_path, &self.profiles_path(), &self.output_path];

        for dir in dirs {
            crate::utils::ensure_directory(dir).await?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment_paths() {
        let config = AppConfig {
            environment: "local".to_string(),
            data_path: PathBuf::from("/tmp/cvforge/data"),
            output_path: PathBuf::from("/tmp/cvforge/output"),
            port: DEFAULT_PORT,
        };

        assert_eq!(
            config.profiles_path(),
            PathBuf::from("/tmp/cvforge/data/profiles")
        );
        assert_eq!(config.draft_path(), PathBuf::from("/tmp/cvforge/data/draft.json"));
    }
}
