use dotenvy::dotenv;
use std::env;

use crate::error::ChatError;

/// Default listening port when PORT is unset.
const DEFAULT_PORT: u16 = 11_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ChatError> {
        dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ChatError::Config(format!("invalid PORT: {value}")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 11_000,
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:11000");
    }

    // Single test for every env-dependent branch: splitting these up
    // would let the parallel test runner race on the process env.
    #[test]
    fn from_env_defaults_and_invalid_port() {
        env::remove_var("HOST");
        env::remove_var("PORT");
        let config = Config::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 11_000);

        env::set_var("HOST", "127.0.0.1");
        env::set_var("PORT", "2500");
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:2500");

        env::set_var("PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));

        env::remove_var("HOST");
        env::remove_var("PORT");
    }
}
