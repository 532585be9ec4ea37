//! Timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond Unix timestamp as RFC 3339 (UTC, millisecond precision).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプが RFC 3339 形式に変換される
        // when (操作):
        let rendered = millis_to_rfc3339(1_700_000_000_123);

        // then (期待する結果):
        assert_eq!(rendered, "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_now_millis_is_recent() {
        // テスト項目: 現在時刻が 2020 年以降のミリ秒値で返される
        // then (期待する結果):
        assert!(now_millis() > 1_577_836_800_000);
    }
}
