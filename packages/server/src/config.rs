//! Server configuration.

use std::time::Duration;

use thiserror::Error;

/// Invalid combinations of [`ServerConfig`] values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("outbound capacity must be greater than zero")]
    ZeroOutboundCapacity,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error(
        "client timeout ({client_timeout:?}) must be greater than the keep-alive interval ({keep_alive_interval:?})"
    )]
    ClientTimeoutTooShort {
        client_timeout: Duration,
        keep_alive_interval: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Frames a connection may have queued before it is closed as too slow
    pub outbound_capacity: usize,
    /// Interval between server pings to Open connections
    pub keep_alive_interval: Duration,
    /// An Open connection silent for this long is closed
    pub client_timeout: Duration,
    /// Time allowed between accepting the transport and the handshake request
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            outbound_capacity: 1024,
            keep_alive_interval: Duration::from_secs(15),
            client_timeout: Duration::from_secs(30),
            handshake_timeout: Duration::from_secs(15),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_capacity == 0 {
            return Err(ConfigError::ZeroOutboundCapacity);
        }
        for (name, duration) in [
            ("keep-alive interval", self.keep_alive_interval),
            ("client timeout", self.client_timeout),
            ("handshake timeout", self.handshake_timeout),
        ] {
            if duration.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        if self.client_timeout <= self.keep_alive_interval {
            return Err(ConfigError::ClientTimeoutTooShort {
                client_timeout: self.client_timeout,
                keep_alive_interval: self.keep_alive_interval,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // テスト項目: デフォルト設定は検証を通る
        let config = ServerConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        // テスト項目: 送信キューの容量 0 は不正
        let config = ServerConfig {
            outbound_capacity: 0,
            ..ServerConfig::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::ZeroOutboundCapacity));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        // テスト項目: 0 秒のタイムアウトは不正
        let config = ServerConfig {
            handshake_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("handshake timeout"))
        );
    }

    #[test]
    fn test_client_timeout_must_exceed_keep_alive() {
        // テスト項目: クライアントのタイムアウトは keep-alive 間隔より長くなければならない
        let config = ServerConfig {
            keep_alive_interval: Duration::from_secs(30),
            client_timeout: Duration::from_secs(30),
            ..ServerConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ClientTimeoutTooShort { .. })
        ));
    }
}
