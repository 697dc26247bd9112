//! 时间工具模块
//!
//! 报告行统一使用 UTC 时间

use chrono::{DateTime, Utc};

/// 获取当前 UTC 时间
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// 当前 UTC 时间的 `HH:MM:SS` 字符串
pub fn now_utc_hms() -> String {
    utc_hms(now_utc())
}

/// 格式化为 `HH:MM:SS`
pub fn utc_hms(time: DateTime<Utc>) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_hms() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 7, 3, 9).unwrap();
        assert_eq!(utc_hms(time), "07:03:09");
    }

    #[test]
    fn test_now_utc_hms_shape() {
        let formatted = now_utc_hms();
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
