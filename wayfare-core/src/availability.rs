use chrono::NaiveDate;

use crate::error::DomainError;

/// Longest stay accepted by any booking or search endpoint.
pub const MAX_STAY_DAYS: i64 = 30;

/// Half-open interval overlap: stays `[a_in, a_out)` and `[b_in, b_out)`
/// collide iff `a_in < b_out && a_out > b_in`. The inequalities are strict
/// so a check-out and a check-in on the same date do not conflict.
pub fn overlaps(a_in: NaiveDate, a_out: NaiveDate, b_in: NaiveDate, b_out: NaiveDate) -> bool {
    a_in < b_out && a_out > b_in
}

/// Number of nights in `[check_in, check_out)`.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Date policy shared by booking creation and availability search:
/// check-in not before `today`, check-out strictly after check-in, span at
/// most [`MAX_STAY_DAYS`].
pub fn validate_stay_dates(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> Result<(), DomainError> {
    if check_in < today {
        return Err(DomainError::invalid("Check-in date cannot be in the past"));
    }
    if check_out <= check_in {
        return Err(DomainError::invalid("Check-out date must be after check-in date"));
    }
    if nights(check_in, check_out) > MAX_STAY_DAYS {
        return Err(DomainError::invalid("Maximum booking duration is 30 days"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_overlapping_stays_collide() {
        // [10, 13) vs [12, 15)
        assert!(overlaps(d(2025, 6, 10), d(2025, 6, 13), d(2025, 6, 12), d(2025, 6, 15)));
        // containment
        assert!(overlaps(d(2025, 6, 10), d(2025, 6, 20), d(2025, 6, 12), d(2025, 6, 14)));
    }

    #[test]
    fn test_back_to_back_stays_do_not_collide() {
        // Check-out on the 13th, next check-in on the 13th.
        assert!(!overlaps(d(2025, 6, 10), d(2025, 6, 13), d(2025, 6, 13), d(2025, 6, 16)));
        assert!(!overlaps(d(2025, 6, 13), d(2025, 6, 16), d(2025, 6, 10), d(2025, 6, 13)));
    }

    #[test]
    fn test_disjoint_stays_do_not_collide() {
        assert!(!overlaps(d(2025, 6, 1), d(2025, 6, 5), d(2025, 6, 10), d(2025, 6, 12)));
    }

    #[test]
    fn test_nights_count() {
        assert_eq!(nights(d(2025, 6, 10), d(2025, 6, 13)), 3);
        assert_eq!(nights(d(2025, 6, 10), d(2025, 6, 11)), 1);
    }

    #[test]
    fn test_past_check_in_rejected() {
        let today = d(2025, 6, 10);
        let err = validate_stay_dates(d(2025, 6, 9), d(2025, 6, 12), today).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_check_in_today_accepted() {
        let today = d(2025, 6, 10);
        assert!(validate_stay_dates(today, d(2025, 6, 12), today).is_ok());
    }

    #[test]
    fn test_inverted_or_zero_length_stay_rejected() {
        let today = d(2025, 6, 10);
        assert!(validate_stay_dates(d(2025, 6, 12), d(2025, 6, 12), today).is_err());
        assert!(validate_stay_dates(d(2025, 6, 12), d(2025, 6, 11), today).is_err());
    }

    #[test]
    fn test_stay_length_limit() {
        let today = d(2025, 6, 10);
        // 30 nights is the maximum; 31 is rejected.
        assert!(validate_stay_dates(d(2025, 6, 10), d(2025, 7, 10), today).is_ok());
        assert!(validate_stay_dates(d(2025, 6, 10), d(2025, 7, 11), today).is_err());
    }
}
