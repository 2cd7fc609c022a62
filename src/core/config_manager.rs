// src/core/config_manager.rs
//! Unified configuration: built-in defaults, optional config.yaml, then environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_log;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub snippets: SnippetSettings,
    pub compiler: CompilerSettings,
    pub propagation: PropagationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
    pub cors_allowed_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(skip)]
    pub anon_key: String,
    pub rpc_function: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnippetSettings {
    pub api_url: String,
    #[serde(skip)]
    pub token: Option<String>,
    pub file_name: String,
    pub description: String,
    pub create_timeout_seconds: u64,
    pub check_timeout_seconds: u64,
    pub delete_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropagationSettings {
    pub initial_delay_ms: u64,
    pub attempts: u32,
    pub backoff_ms: u64,
}

/// Everything a config file may set for one environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server: ServerSettings,
    database: DatabaseSettings,
    snippets: SnippetSettings,
    compiler: CompilerSettings,
    propagation: PropagationSettings,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    local: Option<FileSettings>,
    production: Option<FileSettings>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origin: "*".to_string(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            rpc_function: "get_latex".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for SnippetSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            file_name: "document.tex".to_string(),
            description: "CV LaTeX compilation".to_string(),
            create_timeout_seconds: 10,
            check_timeout_seconds: 5,
            delete_timeout_seconds: 10,
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            url: "https://latexonline.cc".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2000,
            attempts: 1,
            backoff_ms: 1000,
        }
    }
}

impl ConfigManager {
    /// Load configuration from the process environment and an optional YAML file.
    ///
    /// The file is taken from `config_path`, then `CONFIG_PATH`, then
    /// `./config.yaml` when it exists. A missing default file is not an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));

        let file_content = match explicit {
            Some(path) => Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?,
            ),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Some(
                        std::fs::read_to_string(&default_path)
                            .context("Failed to read config.yaml")?,
                    )
                } else {
                    None
                }
            }
        };

        Self::load_with(|key| std::env::var(key).ok(), file_content.as_deref())
    }

    /// Build configuration from an environment lookup and optional YAML content
    pub fn load_with<F>(env: F, file_content: Option<&str>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "local".to_string());
        app_log!(info, "Loading configuration for environment: {}", environment);

        let mut settings = match file_content {
            Some(content) => {
                let file: ConfigFile =
                    serde_yaml::from_str(content).context("Failed to parse config file")?;
                let section = match environment.as_str() {
                    "production" => file.production,
                    _ => file.local,
                };
                section.unwrap_or_default()
            }
            None => FileSettings::default(),
        };

        if let Some(url) = lookup("SUPABASE_URL") {
            settings.database.url = url;
        }
        if settings.database.url.is_empty() {
            anyhow::bail!("SUPABASE_URL environment variable not set");
        }
        settings.database.url = settings.database.url.trim_end_matches('/').to_string();

        settings.database.anon_key = lookup("SUPABASE_ANON_KEY")
            .ok_or_else(|| anyhow::anyhow!("SUPABASE_ANON_KEY environment variable not set"))?;

        settings.snippets.token = lookup("GITHUB_TOKEN");
        if settings.snippets.token.is_none() {
            app_log!(
                warn,
                "GITHUB_TOKEN not set, PDF endpoints will fail with a configuration error"
            );
        }

        if let Some(port) = lookup("PORT") {
            settings.server.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?;
        }
        if let Some(api_url) = lookup("GITHUB_API_URL") {
            settings.snippets.api_url = api_url;
        }
        if let Some(compiler_url) = lookup("LATEX_COMPILER_URL") {
            settings.compiler.url = compiler_url;
        }
        if let Some(origin) = lookup("CORS_ALLOWED_ORIGIN") {
            settings.server.cors_allowed_origin = origin;
        }

        settings.snippets.api_url = settings.snippets.api_url.trim_end_matches('/').to_string();
        settings.compiler.url = settings.compiler.url.trim_end_matches('/').to_string();

        if settings.propagation.attempts == 0 {
            anyhow::bail!("propagation.attempts must be at least 1");
        }

        Ok(Self {
            environment,
            server: settings.server,
            database: settings.database,
            snippets: settings.snippets,
            compiler: settings.compiler,
            propagation: settings.propagation,
        })
    }

    /// Override the listening port (command line takes precedence)
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }
}

impl DatabaseSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl SnippetSettings {
    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_seconds)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_seconds)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_seconds)
    }
}

impl CompilerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
