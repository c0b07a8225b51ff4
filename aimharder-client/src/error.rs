//! Error types for the AimHarder client

use crate::model::BookingFailure;
use thiserror::Error;

/// Errors that can occur when using the AimHarder client
#[derive(Error, Debug)]
pub enum AimHarderError {
    /// The portal rejected the email/password pair
    #[error("Incorrect email or password")]
    IncorrectCredentials,

    /// The portal locked the account after repeated failed logins
    #[error("Too many wrong login attempts, wait before trying again")]
    TooManyWrongAttempts,

    /// The login page reported an error we do not recognise
    #[error("Login failed: {0}")]
    UnknownLoginError(String),

    /// The booking was rejected
    #[error("Booking failed: {0}")]
    BookingFailed(BookingFailure),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid HTTP status code received
    #[error("Invalid HTTP status: {status}")]
    InvalidStatus {
        /// The status code that was received
        status: reqwest::StatusCode,
    },

    /// Failed to decode a JSON payload
    #[error("Failed to decode JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}

impl AimHarderError {
    /// The booking failure, if this error is a rejected booking
    pub fn booking_failure(&self) -> Option<&BookingFailure> {
        match self {
            AimHarderError::BookingFailed(failure) => Some(failure),
            _ => None,
        }
    }
}
