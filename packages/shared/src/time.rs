//! Time helpers. Timestamps are Unix milliseconds, rendered in JST.

use chrono::{DateTime, FixedOffset, Utc};

/// JST is UTC+9.
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Get current Unix timestamp (milliseconds).
///
/// Unix time does not depend on the zone; the name documents that the value is
/// meant to be displayed in JST.
pub fn get_jst_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as RFC 3339 in JST.
///
/// Returns `None` if the timestamp is out of chrono's representable range.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> Option<String> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)?;
    Some(utc.with_timezone(&jst).to_rfc3339())
}

/// Render a Unix millisecond timestamp as `HH:MM:SS` in JST, for console output.
pub fn timestamp_to_jst_clock(timestamp_millis: i64) -> Option<String> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)?;
    Some(utc.with_timezone(&jst).format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_jst_rfc3339_epoch() {
        // テスト項目: Unix エポックが JST (+09:00) で表現される
        // when (操作):
        let rendered = timestamp_to_jst_rfc3339(0);

        // then (期待する結果):
        assert_eq!(rendered.as_deref(), Some("1970-01-01T09:00:00+09:00"));
    }

    #[test]
    fn test_timestamp_to_jst_clock() {
        // テスト項目: 時刻のみの表示が JST で行われる
        // given (前提条件): 2024-01-01T00:00:00Z
        let timestamp = 1_704_067_200_000;

        // when (操作):
        let rendered = timestamp_to_jst_clock(timestamp);

        // then (期待する結果):
        assert_eq!(rendered.as_deref(), Some("09:00:00"));
    }

    #[test]
    fn test_get_jst_timestamp_is_recent() {
        // テスト項目: 現在時刻が妥当な範囲の値を返す
        // when (操作):
        let now = get_jst_timestamp();

        // then (期待する結果): 2024 年以降
        assert!(now > 1_704_067_200_000);
    }
}
