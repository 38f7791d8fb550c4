use chrono::NaiveDate;
use rand::Rng;
use uuid::Uuid;

use crate::error::DomainError;
use wayfare_shared::models::{BookingStatus, UserRecord, UserRole};

/// Round to cents. Totals are products of 2-decimal inputs and whole
/// counts, so this only trims float noise, never real value.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn hotel_booking_total(price_per_night: f64, nights: i64) -> f64 {
    round_money(price_per_night * nights as f64)
}

pub fn flight_booking_total(price: f64, passenger_count: i32) -> f64 {
    round_money(price * f64::from(passenger_count))
}

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERENCE_LENGTH: usize = 10;

/// Random booking reference, e.g. `FL-7K2MQ9X4TB`. Uniqueness is enforced
/// by the store's unique constraint; on the rare collision the insert
/// fails and the caller retries with a fresh reference.
pub fn generate_booking_reference() -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..REFERENCE_LENGTH)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();
    format!("FL-{token}")
}

pub fn ensure_capacity(capacity: i32, guest_count: i32) -> Result<(), DomainError> {
    if guest_count > capacity {
        return Err(DomainError::invalid(format!(
            "Room capacity is {capacity} guests, but {guest_count} requested"
        )));
    }
    Ok(())
}

pub fn ensure_seats_available(available_seats: i32, passenger_count: i32) -> Result<(), DomainError> {
    if available_seats < passenger_count {
        return Err(DomainError::invalid(format!(
            "Only {available_seats} seats available, but {passenger_count} requested"
        )));
    }
    Ok(())
}

/// Bookings are visible to their owner and to admins; admins may also act
/// on them.
pub fn ensure_owner_or_admin(viewer: &UserRecord, owner_id: Uuid) -> Result<(), DomainError> {
    if viewer.role == UserRole::Admin || viewer.id == owner_id {
        Ok(())
    } else {
        Err(DomainError::forbidden("Not enough permissions"))
    }
}

/// Cancellation policy: a booking can be cancelled only while its check-in
/// is still in the future, and re-cancelling is an explicit conflict
/// rather than a silent no-op.
pub fn ensure_cancellable(
    status: BookingStatus,
    check_in: NaiveDate,
    today: NaiveDate,
) -> Result<(), DomainError> {
    if status == BookingStatus::Cancelled {
        return Err(DomainError::conflict("Booking is already cancelled"));
    }
    if check_in <= today {
        return Err(DomainError::invalid("Cannot cancel past or ongoing booking"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_hotel_total_is_exact() {
        // $100/night for [2025-06-10, 2025-06-13) = 3 nights.
        assert_eq!(hotel_booking_total(100.0, 3), 300.0);
        assert_eq!(hotel_booking_total(99.99, 3), 299.97);
    }

    #[test]
    fn test_flight_total_is_exact() {
        assert_eq!(flight_booking_total(120.0, 2), 240.0);
        assert_eq!(flight_booking_total(120.55, 3), 361.65);
    }

    #[test]
    fn test_round_money_trims_float_noise() {
        assert_eq!(round_money(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_reference_shape() {
        let reference = generate_booking_reference();
        assert!(reference.starts_with("FL-"));
        assert_eq!(reference.len(), 3 + REFERENCE_LENGTH);
        assert!(reference[3..]
            .bytes()
            .all(|b| REFERENCE_CHARSET.contains(&b)));
    }

    #[test]
    fn test_references_differ() {
        assert_ne!(generate_booking_reference(), generate_booking_reference());
    }

    fn user(role: UserRole) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            username: "john_doe".to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_owner_may_act_on_own_booking() {
        let viewer = user(UserRole::User);
        assert!(ensure_owner_or_admin(&viewer, viewer.id).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden_but_admin_is_not() {
        let viewer = user(UserRole::User);
        let admin = user(UserRole::Admin);
        let other = Uuid::new_v4();
        assert!(matches!(
            ensure_owner_or_admin(&viewer, other),
            Err(DomainError::Forbidden(_))
        ));
        assert!(ensure_owner_or_admin(&admin, other).is_ok());
    }

    #[test]
    fn test_future_booking_is_cancellable() {
        let today = d(2025, 6, 10);
        assert!(ensure_cancellable(BookingStatus::Confirmed, d(2025, 6, 11), today).is_ok());
    }

    #[test]
    fn test_past_or_ongoing_booking_cannot_be_cancelled() {
        let today = d(2025, 6, 10);
        // Check-in yesterday.
        assert!(matches!(
            ensure_cancellable(BookingStatus::Confirmed, d(2025, 6, 9), today),
            Err(DomainError::InvalidArgument(_))
        ));
        // Check-in today counts as ongoing.
        assert!(matches!(
            ensure_cancellable(BookingStatus::Confirmed, today, today),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_capacity_guard() {
        assert!(ensure_capacity(2, 2).is_ok());
        assert!(matches!(ensure_capacity(2, 3), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_seat_guard_tracks_decrement() {
        // 150-seat flight, 2 passengers booked: 148 remain.
        assert!(ensure_seats_available(150, 2).is_ok());
        let remaining = 150 - 2;
        assert_eq!(remaining, 148);
        // A follow-up request for 149 passengers must fail.
        assert!(matches!(
            ensure_seats_available(remaining, 149),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_repeat_cancellation_conflicts() {
        let today = d(2025, 6, 10);
        assert!(matches!(
            ensure_cancellable(BookingStatus::Cancelled, d(2025, 6, 20), today),
            Err(DomainError::Conflict(_))
        ));
    }
}
