use serde::Deserialize;

/// Top-level server configuration, loaded from `tandem.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    pub log_format: LogFormat,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            log_format: LogFormat::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Infrastructure limits (connection caps, buffer sizes).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_ws_connections: usize,
    /// Per-connection outbound queue; events beyond it are dropped.
    pub outbound_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ws_connections: 1000,
            outbound_buffer: 64,
        }
    }
}

/// File read from the working directory at startup.
pub const CONFIG_FILE: &str = "tandem.toml";

#[derive(Debug)]
pub enum ConfigError {
    Read(String),
    Parse(String),
    InvalidEnv(&'static str, String),
    InvalidListenAddr(String),
    ZeroLimit(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "failed to read {CONFIG_FILE}: {e}"),
            Self::Parse(e) => write!(f, "failed to parse {CONFIG_FILE}: {e}"),
            Self::InvalidEnv(key, val) => write!(f, "invalid value for {key}: {val:?}"),
            Self::InvalidListenAddr(addr) => {
                write!(f, "listen_addr is not a valid socket address: {addr}")
            },
            Self::ZeroLimit(name) => write!(f, "limits.{name} must be > 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidListenAddr(self.listen_addr.clone()));
        }
        if self.limits.max_ws_connections == 0 {
            return Err(ConfigError::ZeroLimit("max_ws_connections"));
        }
        if self.limits.outbound_buffer == 0 {
            return Err(ConfigError::ZeroLimit("outbound_buffer"));
        }
        Ok(())
    }

    /// Load config from `tandem.toml` if it exists, then apply env var
    /// overrides. A missing file means defaults; a malformed one is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ServerConfig::default(),
            Err(e) => return Err(ConfigError::Read(e.to_string())),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(addr) = var("TANDEM_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Some(root) = var("TANDEM_WEB_ROOT")
            && !root.is_empty()
        {
            self.web_root = root;
        }
        if let Some(val) = var("TANDEM_LOG_FORMAT") {
            self.log_format = match val.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => return Err(ConfigError::InvalidEnv("TANDEM_LOG_FORMAT", val)),
            };
        }
        if let Some(val) = var("TANDEM_MAX_WS_CONNECTIONS") {
            self.limits.max_ws_connections = val
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidEnv("TANDEM_MAX_WS_CONNECTIONS", val))?;
        }
        Ok(())
    }
}
