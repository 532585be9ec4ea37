//! Engine tunables.

use std::time::Duration;

use crate::domain::DEFAULT_ROOM_CAPACITY;

/// Time allowed to write one frame to the peer
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);

/// Time allowed between liveness responses from the peer
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);

/// Largest inbound frame accepted, in bytes
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512;

/// Buffered events per room mailbox and per client mailbox
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Configuration shared by the directory, rooms and connection pumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Maximum members per room
    pub max_users: usize,
    pub max_frame_size: usize,
    pub write_wait: Duration,
    pub pong_wait: Duration,
    /// Interval between pings; must be shorter than `pong_wait`
    pub ping_period: Duration,
    pub room_mailbox_capacity: usize,
    pub client_mailbox_capacity: usize,
}

impl RealtimeConfig {
    /// Ping at 9/10 of the pong deadline so a healthy peer always answers in time.
    pub fn ping_period_for(pong_wait: Duration) -> Duration {
        pong_wait * 9 / 10
    }

    /// Replace the pong deadline and derive the matching ping period.
    pub fn with_pong_wait(mut self, pong_wait: Duration) -> Self {
        self.pong_wait = pong_wait;
        self.ping_period = Self::ping_period_for(pong_wait);
        self
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_ROOM_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            write_wait: DEFAULT_WRITE_WAIT,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: Self::ping_period_for(DEFAULT_PONG_WAIT),
            room_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            client_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルト値が設定される
        // when (操作):
        let config = RealtimeConfig::default();

        // then (期待する結果):
        assert_eq!(config.max_users, 4);
        assert_eq!(config.max_frame_size, 512);
        assert_eq!(config.ping_period, Duration::from_secs(54));
        assert!(config.ping_period < config.pong_wait);
    }

    #[test]
    fn test_with_pong_wait_derives_ping_period() {
        // テスト項目: pong 待ち時間を変更すると ping 間隔も追従する
        // when (操作):
        let config = RealtimeConfig::default().with_pong_wait(Duration::from_millis(200));

        // then (期待する結果):
        assert_eq!(config.pong_wait, Duration::from_millis(200));
        assert_eq!(config.ping_period, Duration::from_millis(180));
    }
}
