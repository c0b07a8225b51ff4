//! Credentials and the authenticated session

use crate::error::AimHarderError;
use crate::model::LoginOutcome;
use crate::parser::ResponseParser;
use reqwest::blocking::Client;
use reqwest::Url;
use std::fmt;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Email and password for the portal
///
/// The password is wiped from memory on drop and never shows up in `Debug`.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Form fields the login page posts
    fn form(&self) -> [(&'static str, &str); 4] {
        [
            ("login", "Iniciar sesión"),
            ("loginiframe", "0"),
            ("mail", self.email.as_str()),
            ("pw", self.password.as_str()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A logged-in HTTP client bound to one box
///
/// The cookie jar inside `http` carries the portal session; there is no way
/// to build one without going through [`Session::login`].
#[derive(Debug)]
pub(crate) struct Session {
    http: Client,
    box_url: Url,
}

impl Session {
    /// Log in and keep the client only if the portal accepted the credentials
    pub fn login(
        http: Client,
        login_url: &Url,
        box_url: Url,
        credentials: &Credentials,
        parser: &ResponseParser,
    ) -> Result<Self, AimHarderError> {
        debug!(email = credentials.email(), url = %login_url, "logging in");

        let response = http
            .post(login_url.clone())
            .form(&credentials.form())
            .send()?;

        if !response.status().is_success() {
            return Err(AimHarderError::InvalidStatus {
                status: response.status(),
            });
        }

        let html = response.text()?;
        match parser.classify_login(&html) {
            LoginOutcome::Success => {
                info!(email = credentials.email(), "logged in");
                Ok(Self { http, box_url })
            }
            LoginOutcome::TooManyWrongAttempts => {
                warn!(email = credentials.email(), "login locked after too many attempts");
                Err(AimHarderError::TooManyWrongAttempts)
            }
            LoginOutcome::IncorrectCredentials => {
                warn!(email = credentials.email(), "login rejected");
                Err(AimHarderError::IncorrectCredentials)
            }
            LoginOutcome::Unrecognized(text) => {
                warn!(email = credentials.email(), error = %text, "unrecognized login error");
                Err(AimHarderError::UnknownLoginError(text))
            }
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Build `<box_url>/<segments...>`
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AimHarderError> {
        let mut url = self.box_url.clone();
        url.path_segments_mut()
            .map_err(|_| AimHarderError::ClientInit("Cannot modify box URL path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
