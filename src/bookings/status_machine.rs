use crate::bookings::models::BookingStatus;

/// Allowed booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → Completed, Cancelled
    /// - Completed, Cancelled → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    /// Terminal states accept no further change
    pub fn is_terminal(status: BookingStatus) -> bool {
        matches!(status, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// `Ok(to)` if the transition is valid, the Vietnamese error message otherwise
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Không thể chuyển trạng thái lịch đặt từ {} sang {}",
                from, to
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use BookingStatus::*;

    const ALL: [BookingStatus; 4] = [Pending, Confirmed, Completed, Cancelled];

    #[test]
    fn test_pending_to_confirmed() {
        assert!(StatusMachine::is_valid_transition(Pending, Confirmed));
    }

    #[test]
    fn test_pending_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(Pending, Cancelled));
    }

    #[test]
    fn test_confirmed_to_completed() {
        assert!(StatusMachine::is_valid_transition(Confirmed, Completed));
    }

    #[test]
    fn test_confirmed_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(Confirmed, Cancelled));
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert!(!StatusMachine::is_valid_transition(Pending, Completed));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!StatusMachine::is_valid_transition(Confirmed, Pending));
        assert!(!StatusMachine::is_valid_transition(Completed, Confirmed));
    }

    #[test]
    fn test_terminal_states() {
        for to in [Pending, Confirmed, Completed] {
            assert!(!StatusMachine::is_valid_transition(Cancelled, to));
        }
        for to in [Pending, Confirmed, Cancelled] {
            assert!(!StatusMachine::is_valid_transition(Completed, to));
        }
        assert!(StatusMachine::is_terminal(Cancelled));
        assert!(StatusMachine::is_terminal(Completed));
        assert!(!StatusMachine::is_terminal(Pending));
    }

    #[test]
    fn test_transition_error_message() {
        let err = StatusMachine::transition(Cancelled, Confirmed).unwrap_err();
        assert_eq!(
            err,
            "Không thể chuyển trạng thái lịch đặt từ cancelled sang confirmed"
        );
    }

    fn arb_status() -> impl Strategy<Value = BookingStatus> {
        prop::sample::select(ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_same_status_is_idempotent(status in arb_status()) {
            prop_assert!(StatusMachine::is_valid_transition(status, status));
            prop_assert_eq!(StatusMachine::transition(status, status), Ok(status));
        }

        #[test]
        fn prop_terminal_states_only_stay(from in arb_status(), to in arb_status()) {
            if StatusMachine::is_terminal(from) && from != to {
                prop_assert!(!StatusMachine::is_valid_transition(from, to));
            }
        }

        #[test]
        fn prop_no_cycles(a in arb_status(), b in arb_status()) {
            if a != b && StatusMachine::is_valid_transition(a, b) {
                prop_assert!(!StatusMachine::is_valid_transition(b, a));
            }
        }
    }
}
