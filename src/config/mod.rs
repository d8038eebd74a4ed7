// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{CmsConfig, Config};

/// Environment variable the public CMS API key is read from when neither the
/// configuration file nor `SERVER_CMS__API_KEY` carries a non-blank one.
pub const API_KEY_ENV: &str = "BUILDER_API_KEY";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "cms-pages/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.page_max_age", 60)?
            .set_default("cms.api_host", "https://cdn.builder.io")?
            .set_default("cms.model", "page")?
            .set_default("cms.script_url", "https://cdn.builder.io/js/webcomponents")?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.cms.api_key = non_blank(cfg.cms.api_key.take())
            .or_else(|| non_blank(std::env::var(API_KEY_ENV).ok()));
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
