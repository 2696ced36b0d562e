use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: String,
    pub templates_dir: String,
    pub use_proxy: bool,
    pub proxy_session: String,
    pub ssh_port: u16,
    pub ssh_timeout_secs: u64,
    pub mac_retry_threshold: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            output_dir: get_env("OUTPUT_DIR", "."),
            templates_dir: get_env("TEMPLATES_DIR", ""),
            use_proxy: parse_bool(&get_env("USE_PROXY", "false")),
            proxy_session: get_env("PROXY_SESSION", ""),
            ssh_port: get_env("SSH_PORT", "22").parse().unwrap_or(22),
            ssh_timeout_secs: get_env("SSH_TIMEOUT", "30").parse().unwrap_or(30),
            mac_retry_threshold: get_env("MAC_RETRY_THRESHOLD", "1").parse().unwrap_or(1),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
