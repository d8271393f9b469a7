use chrono::{Datelike, Local, NaiveDate};

pub const STANDARD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 当前本地时间的标准字符串，用于 created_at / updated_at 列
pub fn now_standard_string() -> String {
    Local::now().format(STANDARD_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_start() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(month_start(date), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_standard_string_shape() {
        let s = now_standard_string();
        assert_eq!(s.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&s, STANDARD_FORMAT).is_ok());
    }
}
