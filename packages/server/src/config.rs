//! Command-line arguments for the server binary.

use std::time::Duration;

use clap::Parser;

use crate::{
    domain::DEFAULT_ROOM_CAPACITY,
    error::ServerError,
    infrastructure::realtime::{
        RealtimeConfig,
        config::{DEFAULT_MAX_FRAME_SIZE, DEFAULT_PONG_WAIT, DEFAULT_WRITE_WAIT},
    },
};

/// Roomcast collaboration room server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Maximum members per room
    #[arg(long, default_value_t = DEFAULT_ROOM_CAPACITY)]
    pub max_users: usize,

    /// Largest inbound frame accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Seconds a peer may stay silent before it is dropped
    #[arg(long, default_value_t = DEFAULT_PONG_WAIT.as_secs())]
    pub pong_wait_secs: u64,

    /// Seconds allowed for writing one frame
    #[arg(long, default_value_t = DEFAULT_WRITE_WAIT.as_secs())]
    pub write_wait_secs: u64,
}

impl Default for ServerArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            max_users: DEFAULT_ROOM_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            pong_wait_secs: DEFAULT_PONG_WAIT.as_secs(),
            write_wait_secs: DEFAULT_WRITE_WAIT.as_secs(),
        }
    }
}

impl ServerArgs {
    /// Engine configuration derived from the flags.
    pub fn realtime_config(&self) -> Result<RealtimeConfig, ServerError> {
        if self.max_users == 0 {
            return Err(ServerError::InvalidConfig(
                "--max-users must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size == 0 {
            return Err(ServerError::InvalidConfig(
                "--max-frame-size must be at least 1".to_string(),
            ));
        }
        if self.pong_wait_secs == 0 || self.write_wait_secs == 0 {
            return Err(ServerError::InvalidConfig(
                "--pong-wait-secs and --write-wait-secs must be at least 1".to_string(),
            ));
        }

        Ok(RealtimeConfig {
            max_users: self.max_users,
            max_frame_size: self.max_frame_size,
            write_wait: Duration::from_secs(self.write_wait_secs),
            ..RealtimeConfig::default()
        }
        .with_pong_wait(Duration::from_secs(self.pong_wait_secs)))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        // テスト項目: 引数なしで起動するとデフォルト値が使われる
        // when (操作):
        let args = ServerArgs::parse_from(["roomcast-server"]);

        // then (期待する結果):
        assert_eq!(args.bind_addr(), "127.0.0.1:8080");
        assert_eq!(args.max_users, 4);
        assert_eq!(args.realtime_config().unwrap(), RealtimeConfig::default());
    }

    #[test]
    fn test_parse_overrides() {
        // テスト項目: フラグで定員と keepalive を上書きできる
        // when (操作):
        let args = ServerArgs::parse_from([
            "roomcast-server",
            "--port",
            "9000",
            "--max-users",
            "8",
            "--pong-wait-secs",
            "10",
        ]);
        let config = args.realtime_config().unwrap();

        // then (期待する結果):
        assert_eq!(args.port, 9000);
        assert_eq!(config.max_users, 8);
        assert_eq!(config.pong_wait, Duration::from_secs(10));
        assert_eq!(config.ping_period, Duration::from_secs(9));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        // テスト項目: 定員 0 は設定エラーになる
        // given (前提条件):
        let args = ServerArgs {
            max_users: 0,
            ..ServerArgs::default()
        };

        // when (操作):
        let result = args.realtime_config();

        // then (期待する結果):
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }
}
