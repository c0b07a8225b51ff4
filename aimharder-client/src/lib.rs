//! AimHarder Client Library
//!
//! This library logs into the AimHarder gym-booking portal, lists the classes
//! a box has scheduled for a day and books them, turning the portal's HTML and
//! JSON error responses into typed errors.
//!
//! # Features
//!
//! - Login with email and password, checked once when the client is built
//! - Class listing for any day, optionally for a family member
//! - Booking with classified failures (no credit, refused by the portal, unknown)
//! - Secure TLS using rustls (no OpenSSL dependencies)
//! - Blocking synchronous API
//! - Well-typed errors using thiserror
//!
//! # Example
//!
//! ```no_run
//! use aimharder_client::{AimHarderClient, AimHarderError, BookingFailureKind};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AimHarderClient::new("me@example.com", "secret", 3984, "lahuellacrossfit")?;
//! let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//!
//! let classes = client.get_classes(day)?.unwrap_or_default();
//! if let Some(class_id) = classes.first().and_then(|class| class.id()) {
//!     match client.book_class(day, &class_id.to_string(), None) {
//!         Ok(()) => println!("Booked!"),
//!         Err(AimHarderError::BookingFailed(failure)) => match failure.kind {
//!             BookingFailureKind::NoCredit => println!("Out of credit"),
//!             _ => println!("Refused: {}", failure),
//!         },
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod model;
mod parser;
mod session;

pub use client::{AimHarderClient, AimHarderClientBuilder, DEFAULT_LOGIN_URL};
pub use error::AimHarderError;
pub use model::{
    BookingFailure, BookingFailureKind, BookingOutcome, BookingRequest, ClassSlot, LoginOutcome,
    MESSAGE_BOOKING_FAILED_NO_CREDIT, MESSAGE_BOOKING_FAILED_UNKNOWN,
};
pub use session::Credentials;

/// Classify a login page without touching the network
///
/// Looks for the `loginErrors` element and matches its text against the
/// known error phrases.
pub fn classify_login_response(html: &str) -> LoginOutcome {
    parser::ResponseParser::new().classify_login(html)
}

/// Classify a booking response without touching the network
pub fn classify_booking_response(status: reqwest::StatusCode, body: &str) -> BookingOutcome {
    parser::ResponseParser::new().classify_booking(status, body)
}
