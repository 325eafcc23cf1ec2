use crate::utils::error::ImageError;
use crate::Result;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Tokio worker threads
    pub workers: usize,

    /// Development mode
    pub dev_mode: bool,

    pub server_config: ServerConfig,

    pub classifier_config: ClassifierConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Config {
    pub fn new(
        bind_addr: String,
        workers: Option<usize>,
        dev_mode: bool,
        seed: Option<u64>,
    ) -> Result<Self> {
        let workers = workers.unwrap_or_else(num_cpus::get);
        if workers == 0 {
            return Err(ImageError::Config("workers must be at least 1".to_string()));
        }

        let server_config = ServerConfig {
            request_timeout: if dev_mode { 300 } else { 60 },
            max_request_size: 10 * 1024 * 1024,
        };

        let config = Self {
            bind_addr,
            workers,
            dev_mode,
            server_config,
            classifier_config: ClassifierConfig { seed },
        };
        config.socket_addr()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|e| {
            ImageError::Config(format!("Invalid bind address {}: {}", self.bind_addr, e))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            workers: num_cpus::get(),
            dev_mode: false,
            server_config: ServerConfig {
                request_timeout: 60,
                max_request_size: 10 * 1024 * 1024,
            },
            classifier_config: ClassifierConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_dev_timeouts() {
        let config = Config::new("127.0.0.1:9000".to_string(), Some(2), true, Some(5)).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.server_config.request_timeout, 300);
        assert_eq!(config.classifier_config.seed, Some(5));

        let config = Config::new(DEFAULT_BIND_ADDR.to_string(), None, false, None).unwrap();
        assert_eq!(config.server_config.request_timeout, 60);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_rejects_bad_settings() {
        assert!(matches!(
            Config::new("not-an-address".to_string(), None, false, None),
            Err(ImageError::Config(_))
        ));
        assert!(matches!(
            Config::new(DEFAULT_BIND_ADDR.to_string(), Some(0), false, None),
            Err(ImageError::Config(_))
        ));
    }
}
