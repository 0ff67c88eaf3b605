use chrono::{DateTime, Duration, Utc};

/// Next storefront refresh instant: the upcoming 00:00 UTC day boundary.
pub fn next_shop_refresh(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    midnight + Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn refresh_is_next_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let next = next_shop_refresh(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn refresh_just_after_midnight_is_following_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 1).unwrap();
        assert_eq!(
            next_shop_refresh(now),
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()
        );
    }
}
