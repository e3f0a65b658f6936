//! DocSpot scheduling core.
//!
//! The engine behind the booking dashboards: slot generation over a doctor's
//! working hours, the appointment lifecycle state machine, user directory
//! management with cascading deletion, and the activity trail every mutation
//! leaves behind. Persistence is a SQLite-backed repository; UI, chat flow,
//! and call signaling live in external collaborators.

pub mod activity;
pub mod analytics;
pub mod booking;
pub mod config;
pub mod db;
pub mod directory;
pub mod models;
pub mod scheduling;

pub use booking::{BookingError, NewAppointment};
pub use db::DatabaseError;
pub use directory::{DirectoryError, NewDoctor, NewPatient};
pub use scheduling::TimeSlot;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses embedding the
/// core. Library callers that already have a subscriber skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("DocSpot core v{}", config::APP_VERSION);
}
