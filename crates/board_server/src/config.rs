//! Server configuration loaded from `BOARD_*` environment variables.
//!
//! Sources, lowest precedence first: optional file named by `BOARD_CONFIG`,
//! then the environment (a `.env` file is honoured). Every key is optional.

pub use board_core::repo::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// SQLite file path. Read from BOARD_DATABASE_PATH; absent means in-memory.
    #[serde(default)]
    pub database_path: Option<String>,
    /// Socket address to bind. Read from BOARD_LISTEN_ADDR.
    #[serde(default)]
    pub listen_addr: Option<String>,
    /// trace|debug|info|warn|error. Read from BOARD_LOG_LEVEL.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. Read from BOARD_LOG_DIR.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Actor written to created_by/modified_by. Read from BOARD_AUDITOR.
    #[serde(default)]
    pub auditor: Option<String>,
    /// Page size when a request omits `size`. Read from BOARD_DEFAULT_PAGE_SIZE.
    #[serde(default)]
    pub default_page_size: Option<u32>,
    /// Upper bound for `size`. Read from BOARD_MAX_PAGE_SIZE.
    #[serde(default)]
    pub max_page_size: Option<u32>,
}

/// Page size policy applied to collection requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PagingConfig {
    /// Resolves a requested size: missing or zero -> default, capped at max.
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => self.default_size,
            Some(size) => size.min(self.max_size),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var("BOARD_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path));
        }
        builder = builder.add_source(config::Environment::with_prefix("BOARD").try_parsing(true));
        Self::from_config(builder.build()?)
    }

    pub fn from_config(source: config::Config) -> Result<Self, config::ConfigError> {
        source.try_deserialize()
    }

    pub fn listen_addr_or_default(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR)
    }

    pub fn log_level_or_default(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| board_core::default_log_level())
    }

    pub fn auditor_or_default(&self) -> &str {
        self.auditor
            .as_deref()
            .unwrap_or(board_core::DEFAULT_AUDITOR)
    }

    /// Paging policy; the max is clamped to the store limit and the default
    /// never exceeds the max.
    pub fn paging(&self) -> PagingConfig {
        let max_size = match self.max_page_size {
            Some(0) | None => MAX_PAGE_SIZE,
            Some(value) => value.min(MAX_PAGE_SIZE),
        };
        let default_size = match self.default_page_size {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(value) => value,
        };
        PagingConfig {
            default_size: default_size.min(max_size),
            max_size,
        }
    }
}
