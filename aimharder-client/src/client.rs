//! AimHarder client implementation

use crate::error::AimHarderError;
use crate::model::{BookingOutcome, BookingRequest, ClassSlot, format_day};
use crate::parser::ResponseParser;
use crate::session::{Credentials, Session};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Production login page, shared by every box
pub const DEFAULT_LOGIN_URL: &str = "https://login.aimharder.com/";

/// Shape of the catalog endpoint; everything but `bookings` is ignored
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    bookings: Option<Vec<ClassSlot>>,
}

/// The main AimHarder client
///
/// A client always holds a logged-in session: the login runs while the
/// client is built and a failed login means there is no client at all.
///
/// # Example
///
/// ```no_run
/// use aimharder_client::AimHarderClient;
/// use chrono::NaiveDate;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AimHarderClient::new("me@example.com", "secret", 3984, "lahuellacrossfit")?;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// if let Some(classes) = client.get_classes(day)? {
///     for class in &classes {
///         println!("{:?} {:?} {:?}", class.id(), class.time_id(), class.class_name());
///     }
/// }
///
/// client.book_class(day, "123456", None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AimHarderClient {
    session: Session,
    parser: ResponseParser,
    box_id: u64,
    box_name: String,
}

impl AimHarderClient {
    /// Log into the production portal for the given box
    ///
    /// # Errors
    ///
    /// * `AimHarderError::IncorrectCredentials` - wrong email or password
    /// * `AimHarderError::TooManyWrongAttempts` - the account is locked for now
    /// * `AimHarderError::UnknownLoginError` - the login page showed another error
    /// * `AimHarderError::Request` / `InvalidStatus` - transport problems
    pub fn new(
        email: &str,
        password: &str,
        box_id: u64,
        box_name: &str,
    ) -> Result<Self, AimHarderError> {
        Self::builder(box_id, box_name).login(&Credentials::new(email, password))
    }

    /// Create a builder for configuring endpoints and the HTTP client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use aimharder_client::{AimHarderClient, Credentials};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = AimHarderClient::builder(1, "mybox")
    ///     .login_url("http://localhost:1234/login")?
    ///     .box_url("http://localhost:1234")?
    ///     .login(&Credentials::new("me@example.com", "secret"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(box_id: u64, box_name: impl Into<String>) -> AimHarderClientBuilder {
        AimHarderClientBuilder::new(box_id, box_name)
    }

    pub fn box_id(&self) -> u64 {
        self.box_id
    }

    pub fn box_name(&self) -> &str {
        &self.box_name
    }

    /// List the classes scheduled on `date`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(classes))` - the classes as listed, possibly empty
    /// * `Ok(None)` - the portal answered without a `bookings` list
    ///
    /// # Errors
    ///
    /// * `AimHarderError::Request` - Network error
    /// * `AimHarderError::InvalidStatus` - HTTP error
    /// * `AimHarderError::Json` - The body is not the expected JSON
    pub fn get_classes(&self, date: NaiveDate) -> Result<Option<Vec<ClassSlot>>, AimHarderError> {
        self.get_classes_for(date, None)
    }

    /// List the classes scheduled on `date` as seen by a family member
    pub fn get_classes_for(
        &self,
        date: NaiveDate,
        family_id: Option<&str>,
    ) -> Result<Option<Vec<ClassSlot>>, AimHarderError> {
        let url = self.session.endpoint(&["api", "bookings"])?;

        let mut query = vec![("box", self.box_id.to_string()), ("day", format_day(date))];
        if let Some(family_id) = family_id {
            query.push(("familyId", family_id.to_string()));
        }

        debug!(box_name = %self.box_name, %date, "fetching classes");
        let response = self.session.http().get(url).query(&query).send()?;

        if !response.status().is_success() {
            return Err(AimHarderError::InvalidStatus {
                status: response.status(),
            });
        }

        let body = response.text()?;
        let catalog: CatalogResponse = serde_json::from_str(&body)?;

        match &catalog.bookings {
            Some(classes) => debug!(count = classes.len(), %date, "classes fetched"),
            None => debug!(%date, "no bookings key in catalog response"),
        }
        Ok(catalog.bookings)
    }

    /// Book a class, optionally on behalf of a family member
    ///
    /// # Errors
    ///
    /// * `AimHarderError::BookingFailed` - The portal refused the booking;
    ///   the failure says whether credit ran out, the portal explained why,
    ///   or the reason is unknown
    /// * `AimHarderError::Request` - Network error
    pub fn book_class(
        &self,
        date: NaiveDate,
        class_id: &str,
        family_id: Option<&str>,
    ) -> Result<(), AimHarderError> {
        let mut request = BookingRequest::new(date, class_id);
        if let Some(family_id) = family_id {
            request = request.for_family_member(family_id);
        }

        match self.submit_booking(&request)? {
            BookingOutcome::Booked => Ok(()),
            BookingOutcome::Failed(failure) => Err(AimHarderError::BookingFailed(failure)),
        }
    }

    /// Send a booking request and return the classified outcome
    ///
    /// Unlike [`book_class`](Self::book_class) a refused booking is a value
    /// here, not an error.
    pub fn submit_booking(&self, request: &BookingRequest) -> Result<BookingOutcome, AimHarderError> {
        let url = self.session.endpoint(&["api", "book"])?;

        debug!(
            box_name = %self.box_name,
            date = %request.date,
            class_id = %request.class_id,
            family_id = ?request.family_id,
            "booking class"
        );
        let response = self
            .session
            .http()
            .post(url)
            .form(&request.form(self.box_id))
            .send()?;

        let status = response.status();
        let body = if status == StatusCode::OK {
            response.text()?
        } else {
            String::new()
        };

        let outcome = self.parser.classify_booking(status, &body);
        match &outcome {
            BookingOutcome::Booked => info!(
                date = %request.date,
                class_id = %request.class_id,
                "class booked"
            ),
            BookingOutcome::Failed(failure) => warn!(
                date = %request.date,
                class_id = %request.class_id,
                %status,
                kind = ?failure.kind,
                reason = %failure.message,
                "booking refused"
            ),
        }
        Ok(outcome)
    }
}

/// Builder for an AimHarder client
///
/// Endpoints default to the production portal. The terminal step is
/// [`login`](Self::login), which is the only way to obtain a client.
///
/// # Example
///
/// ```no_run
/// use aimharder_client::{AimHarderClient, Credentials};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AimHarderClient::builder(3984, "lahuellacrossfit")
///     .client_builder(
///         reqwest::blocking::Client::builder()
///             .timeout(Duration::from_secs(30))
///     )
///     .login(&Credentials::new("me@example.com", "secret"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AimHarderClientBuilder {
    box_id: u64,
    box_name: String,
    login_url: Option<reqwest::Url>,
    box_url: Option<reqwest::Url>,
    client_builder: Option<reqwest::blocking::ClientBuilder>,
}

impl AimHarderClientBuilder {
    pub fn new(box_id: u64, box_name: impl Into<String>) -> Self {
        Self {
            box_id,
            box_name: box_name.into(),
            login_url: None,
            box_url: None,
            client_builder: None,
        }
    }

    /// Override the login page URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn login_url(mut self, url: impl reqwest::IntoUrl) -> Result<Self, AimHarderError> {
        self.login_url = Some(url.into_url()?);
        Ok(self)
    }

    /// Override the box base URL (normally `https://<box_name>.aimharder.com`)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn box_url(mut self, url: impl reqwest::IntoUrl) -> Result<Self, AimHarderError> {
        self.box_url = Some(url.into_url()?);
        Ok(self)
    }

    /// Set a custom HTTP client builder
    ///
    /// The cookie store is always switched on regardless of the provided
    /// configuration, since the session lives in it.
    pub fn client_builder(mut self, builder: reqwest::blocking::ClientBuilder) -> Self {
        self.client_builder = Some(builder);
        self
    }

    /// Resolve the login URL, defaulting to the production portal
    fn resolved_login_url(&self) -> Result<reqwest::Url, AimHarderError> {
        match &self.login_url {
            Some(url) => Ok(url.clone()),
            None => reqwest::Url::parse(DEFAULT_LOGIN_URL)
                .map_err(|e| AimHarderError::ClientInit(e.to_string())),
        }
    }

    /// Resolve the box URL, defaulting to the box's own subdomain
    fn resolved_box_url(&self) -> Result<reqwest::Url, AimHarderError> {
        match &self.box_url {
            Some(url) => Ok(url.clone()),
            None => reqwest::Url::parse(&format!("https://{}.aimharder.com", self.box_name))
                .map_err(|e| {
                    AimHarderError::ClientInit(format!("Invalid box name {:?}: {}", self.box_name, e))
                }),
        }
    }

    /// Build the HTTP client and log in
    ///
    /// # Errors
    ///
    /// Returns the login error if the portal rejects the credentials, or
    /// `AimHarderError::ClientInit` if the HTTP client cannot be initialized.
    pub fn login(self, credentials: &Credentials) -> Result<AimHarderClient, AimHarderError> {
        let login_url = self.resolved_login_url()?;
        let box_url = self.resolved_box_url()?;

        let builder = self
            .client_builder
            .unwrap_or_else(|| reqwest::blocking::Client::builder().use_rustls_tls());

        let http = builder
            .cookie_store(true)
            .build()
            .map_err(|e| AimHarderError::ClientInit(e.to_string()))?;

        let parser = ResponseParser::new();
        let session = Session::login(http, &login_url, box_url, credentials, &parser)?;

        Ok(AimHarderClient {
            session,
            parser,
            box_id: self.box_id,
            box_name: self.box_name,
        })
    }
}
