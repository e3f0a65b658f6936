use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(AccountStatus {
    Active => "active",
    Disabled => "disabled",
});

str_enum!(AppointmentStatus {
    Pending => "pending",
    Accepted => "accepted",
    InProgress => "in_progress",
    Rejected => "rejected",
    Completed => "completed",
});

str_enum!(AppointmentKind {
    Online => "online",
    InPerson => "in_person",
});

str_enum!(ActivityType {
    Register => "register",
    Booking => "booking",
    StatusChange => "status_change",
    Review => "review",
    DoctorUpdate => "doctor_update",
    Finance => "finance",
});

impl AppointmentStatus {
    /// Statuses a booking may move to from this one.
    pub fn successors(&self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Pending => &[Accepted, Rejected],
            Accepted => &[InProgress, Rejected],
            InProgress => &[Completed],
            Rejected | Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// A slot stays reserved by any appointment that was not rejected;
    /// a pending request already blocks double-booking.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Pending, "pending"),
            (AppointmentStatus::Accepted, "accepted"),
            (AppointmentStatus::InProgress, "in_progress"),
            (AppointmentStatus::Rejected, "rejected"),
            (AppointmentStatus::Completed, "completed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn user_role_round_trip() {
        for (variant, s) in [
            (UserRole::Patient, "patient"),
            (UserRole::Doctor, "doctor"),
            (UserRole::Admin, "admin"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(UserRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn activity_type_round_trip() {
        for (variant, s) in [
            (ActivityType::Register, "register"),
            (ActivityType::Booking, "booking"),
            (ActivityType::StatusChange, "status_change"),
            (ActivityType::Review, "review"),
            (ActivityType::DoctorUpdate, "doctor_update"),
            (ActivityType::Finance, "finance"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ActivityType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = AppointmentStatus::from_str("cancelled").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn transition_table_from_pending() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn transition_table_from_accepted() {
        use AppointmentStatus::*;
        assert!(Accepted.can_transition_to(InProgress));
        assert!(Accepted.can_transition_to(Rejected));
        assert!(!Accepted.can_transition_to(Completed));
    }

    #[test]
    fn transition_table_in_progress_only_completes() {
        use AppointmentStatus::*;
        assert!(InProgress.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Rejected));
        assert!(!InProgress.can_transition_to(Pending));
    }

    #[test]
    fn rejected_and_completed_are_terminal() {
        assert!(AppointmentStatus::Rejected.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(!AppointmentStatus::Pending.is_terminal());
        assert!(!AppointmentStatus::Accepted.is_terminal());
        assert!(!AppointmentStatus::InProgress.is_terminal());
    }

    #[test]
    fn only_rejected_releases_slot() {
        assert!(!AppointmentStatus::Rejected.holds_slot());
        for held in [
            AppointmentStatus::Pending,
            AppointmentStatus::Accepted,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
        ] {
            assert!(held.holds_slot());
        }
    }
}
