//! Classification of login pages and booking responses

use crate::model::{BookingFailure, BookingOutcome, LoginOutcome};
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde_json::Value;
use std::cell::OnceCell;

/// Id of the element the login page fills with error text
pub(crate) const LOGIN_ERRORS_ID: &str = "loginErrors";
const LOGIN_ERRORS_SELECTOR: &str = "#loginErrors";

/// Login error phrases, checked in order against the error text.
/// Matching is case-sensitive.
const LOGIN_ERROR_PHRASES: &[(&str, LoginOutcome)] = &[
    ("demasiadas veces", LoginOutcome::TooManyWrongAttempts),
    ("incorrecto", LoginOutcome::IncorrectCredentials),
];

const BOOK_STATE_NO_CREDIT: i64 = -2;
const BOOK_STATE_TOO_FAR_AHEAD: i64 = -12;
const ERROR_LANG_TOO_FAR_AHEAD: &str = "ERROR_ANTELACION_CLIENTE";

/// Parser for portal responses with a cached selector
#[derive(Clone, Debug)]
pub(crate) struct ResponseParser {
    login_errors_selector: OnceCell<Selector>,
}

impl ResponseParser {
    /// Create a new parser with uninitialized caches
    pub fn new() -> Self {
        Self {
            login_errors_selector: OnceCell::new(),
        }
    }

    /// Get or build the login errors selector
    fn login_errors_selector(&self) -> &Selector {
        self.login_errors_selector.get_or_init(|| {
            Selector::parse(LOGIN_ERRORS_SELECTOR)
                .expect("login errors selector is a valid id selector")
        })
    }

    /// Extract the trimmed text of the login errors element, if any
    pub fn extract_login_error(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let element = document.select(self.login_errors_selector()).next()?;
        let text = element.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Decide whether a login page reports a failure
    pub fn classify_login(&self, html: &str) -> LoginOutcome {
        let Some(text) = self.extract_login_error(html) else {
            return LoginOutcome::Success;
        };

        LOGIN_ERROR_PHRASES
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or(LoginOutcome::Unrecognized(text))
    }

    /// Decide whether a booking response means the class was booked
    pub fn classify_booking(&self, status: StatusCode, body: &str) -> BookingOutcome {
        // 1. Any non-OK status, whatever the body says
        if status != StatusCode::OK {
            return BookingOutcome::Failed(BookingFailure::unknown());
        }

        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) else {
            return BookingOutcome::Failed(BookingFailure::unknown());
        };

        // A state we cannot read is not a success
        let book_state = match fields.get("bookState") {
            None => None,
            Some(state) => match parse_book_state(state) {
                Some(state) => Some(state),
                None => return BookingOutcome::Failed(BookingFailure::unknown()),
            },
        };
        let error_message = fields.get("errorMssg").and_then(Value::as_str);
        let error_lang = fields.get("errorMssgLang").and_then(Value::as_str);

        // 2. No credit wins over any accompanying error text
        if book_state == Some(BOOK_STATE_NO_CREDIT) {
            return BookingOutcome::Failed(BookingFailure::no_credit());
        }

        // 3. Refusals the portal explains itself
        let too_far_ahead = book_state == Some(BOOK_STATE_TOO_FAR_AHEAD)
            || error_lang == Some(ERROR_LANG_TOO_FAR_AHEAD);
        if too_far_ahead
            && let Some(message) = error_message.filter(|m| !m.trim().is_empty())
        {
            return BookingOutcome::Failed(BookingFailure::rejected(message));
        }

        // 4. Error fields without a state we understand
        if fields.contains_key("errorMssg") || fields.contains_key("errorMssgLang") {
            return BookingOutcome::Failed(BookingFailure::unknown());
        }

        // 5. Unlisted negative states are refusals too
        if book_state.is_some_and(|state| state < 0) {
            return BookingOutcome::Failed(BookingFailure::unknown());
        }

        BookingOutcome::Booked
    }
}

/// Integers, or integers sent as strings
fn parse_book_state(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookingFailureKind, MESSAGE_BOOKING_FAILED_NO_CREDIT};
    use proptest::prelude::*;

    fn login_page(text: &str) -> String {
        format!(
            r#"<html><body><form><span id="{}">{}</span></form></body></html>"#,
            LOGIN_ERRORS_ID, text
        )
    }

    fn failure_kind(outcome: BookingOutcome) -> Option<BookingFailureKind> {
        match outcome {
            BookingOutcome::Booked => None,
            BookingOutcome::Failed(failure) => Some(failure.kind),
        }
    }

    #[test]
    fn test_empty_login_errors_is_success() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_login(r#"<span id="loginErrors"></span>"#),
            LoginOutcome::Success
        );
    }

    #[test]
    fn test_missing_login_errors_is_success() {
        let parser = ResponseParser::new();
        assert_eq!(parser.classify_login(""), LoginOutcome::Success);
        assert_eq!(
            parser.classify_login("<html><body>Bienvenido</body></html>"),
            LoginOutcome::Success
        );
    }

    #[test]
    fn test_whitespace_login_errors_is_success() {
        let parser = ResponseParser::new();
        assert_eq!(parser.classify_login(&login_page("  \n\t ")), LoginOutcome::Success);
    }

    #[test]
    fn test_bare_fragments() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_login(r#"<span id="loginErrors">demasiadas veces</span>"#),
            LoginOutcome::TooManyWrongAttempts
        );
        assert_eq!(
            parser.classify_login(r#"<span id="loginErrors">incorrecto</span>"#),
            LoginOutcome::IncorrectCredentials
        );
    }

    #[test]
    fn test_phrase_outside_login_errors_is_ignored() {
        let parser = ResponseParser::new();
        let html = r#"<html><body><p>incorrecto</p><span id="loginErrors"></span></body></html>"#;
        assert_eq!(parser.classify_login(html), LoginOutcome::Success);
    }

    #[test]
    fn test_login_matching_is_case_sensitive() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_login(&login_page("INCORRECTO")),
            LoginOutcome::Unrecognized("INCORRECTO".to_string())
        );
    }

    #[test]
    fn test_too_many_attempts_checked_before_credentials() {
        let parser = ResponseParser::new();
        let text = "Usuario incorrecto. Has fallado demasiadas veces.";
        assert_eq!(
            parser.classify_login(&login_page(text)),
            LoginOutcome::TooManyWrongAttempts
        );
    }

    #[test]
    fn test_nested_markup_in_login_errors() {
        let parser = ResponseParser::new();
        let html = login_page("<b>Email o contraseña</b> <i>incorrecto</i>");
        assert_eq!(parser.classify_login(&html), LoginOutcome::IncorrectCredentials);
    }

    // Any HTML with the lockout phrase in the error element is TooManyWrongAttempts
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_too_many_attempts_detection(
            prefix in "[a-zA-Z0-9 .,!?]{0,100}",
            suffix in "[a-zA-Z0-9 .,!?]{0,100}",
            pattern_variant in prop::sample::select(vec![
                "demasiadas veces",
                "Lo has intentado demasiadas veces",
                "demasiadas veces.",
                "demasiadas veces, espera unos minutos",
            ]),
        ) {
            let html = login_page(&format!("{} {} {}", prefix, pattern_variant, suffix));
            let parser = ResponseParser::new();

            prop_assert_eq!(
                parser.classify_login(&html),
                LoginOutcome::TooManyWrongAttempts
            );
        }
    }

    // Any HTML with the credentials phrase in the error element is IncorrectCredentials
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_incorrect_credentials_detection(
            prefix in "[a-zA-Z0-9 .,!?]{0,100}",
            suffix in "[a-zA-Z0-9 .,!?]{0,100}",
            pattern_variant in prop::sample::select(vec![
                "incorrecto",
                "Email o password incorrecto",
                "incorrecto.",
                "El usuario es incorrecto!",
            ]),
        ) {
            let html = login_page(&format!("{} {} {}", prefix, pattern_variant, suffix));
            let parser = ResponseParser::new();

            prop_assert_eq!(
                parser.classify_login(&html),
                LoginOutcome::IncorrectCredentials
            );
        }
    }

    // Upper-case text can never hold a known phrase, so it is reported verbatim
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_unrecognized_login_error(
            text in "[A-Z0-9][A-Z0-9 .,!?]{0,100}",
        ) {
            let parser = ResponseParser::new();
            let outcome = parser.classify_login(&login_page(&text));

            prop_assert_eq!(outcome, LoginOutcome::Unrecognized(text.trim().to_string()));
        }
    }

    #[test]
    fn test_server_error_is_unknown_whatever_the_body() {
        let parser = ResponseParser::new();
        for body in ["", "null", "{}", r#"{"bookState": -2}"#] {
            let outcome = parser.classify_booking(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(outcome, BookingOutcome::Failed(BookingFailure::unknown()));
        }
    }

    #[test]
    fn test_empty_object_is_booked() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_booking(StatusCode::OK, "{}"),
            BookingOutcome::Booked
        );
    }

    #[test]
    fn test_positive_book_state_is_booked() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_booking(StatusCode::OK, r#"{"bookState": 1, "id": "123"}"#),
            BookingOutcome::Booked
        );
    }

    #[test]
    fn test_non_object_body_is_unknown() {
        let parser = ResponseParser::new();
        for body in ["", "null", "[]", "<html></html>"] {
            assert_eq!(
                failure_kind(parser.classify_booking(StatusCode::OK, body)),
                Some(BookingFailureKind::Unknown)
            );
        }
    }

    #[test]
    fn test_no_credit() {
        let parser = ResponseParser::new();
        let outcome = parser.classify_booking(StatusCode::OK, r#"{"bookState": -2}"#);
        assert_eq!(outcome, BookingOutcome::Failed(BookingFailure::no_credit()));
    }

    #[test]
    fn test_no_credit_wins_over_error_fields() {
        let parser = ResponseParser::new();
        let body = r#"{"bookState": -2, "errorMssg": "Sin bonos", "errorMssgLang": "ERROR_BONOS"}"#;
        match parser.classify_booking(StatusCode::OK, body) {
            BookingOutcome::Failed(failure) => {
                assert_eq!(failure.kind, BookingFailureKind::NoCredit);
                assert_eq!(failure.message, MESSAGE_BOOKING_FAILED_NO_CREDIT);
            }
            other => panic!("Expected no credit failure, got {:?}", other),
        }
    }

    #[test]
    fn test_error_fields_alone_are_unknown() {
        let parser = ResponseParser::new();
        for body in [
            r#"{"errorMssg": "foo"}"#,
            r#"{"errorMssgLang": "foo"}"#,
            r#"{"errorMssg": null}"#,
        ] {
            assert_eq!(
                parser.classify_booking(StatusCode::OK, body),
                BookingOutcome::Failed(BookingFailure::unknown())
            );
        }
    }

    #[test]
    fn test_too_far_ahead_surfaces_portal_message() {
        let parser = ResponseParser::new();
        let body = r#"{
            "bookState": -12,
            "errorMssg": "No puedes reservar clases con más de 15 días de antelación",
            "errorMssgLang": "ERROR_ANTELACION_CLIENTE"
        }"#;
        assert_eq!(
            parser.classify_booking(StatusCode::OK, body),
            BookingOutcome::Failed(BookingFailure::rejected(
                "No puedes reservar clases con más de 15 días de antelación"
            ))
        );
    }

    #[test]
    fn test_too_far_ahead_without_message_is_unknown() {
        let parser = ResponseParser::new();
        let body = r#"{"bookState": -12, "errorMssg": "", "errorMssgLang": "ERROR_ANTELACION_CLIENTE"}"#;
        assert_eq!(
            parser.classify_booking(StatusCode::OK, body),
            BookingOutcome::Failed(BookingFailure::unknown())
        );
    }

    #[test]
    fn test_book_state_as_string() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.classify_booking(StatusCode::OK, r#"{"bookState": "-2"}"#),
            BookingOutcome::Failed(BookingFailure::no_credit())
        );
        assert_eq!(
            parser.classify_booking(StatusCode::OK, r#"{"bookState": "1"}"#),
            BookingOutcome::Booked
        );
    }

    #[test]
    fn test_unreadable_book_state_is_unknown() {
        let parser = ResponseParser::new();
        for body in [
            r#"{"bookState": -2.0}"#,
            r#"{"bookState": true}"#,
            r#"{"bookState": null}"#,
            r#"{"bookState": "full"}"#,
            r#"{"bookState": {"code": 1}}"#,
        ] {
            assert_eq!(
                parser.classify_booking(StatusCode::OK, body),
                BookingOutcome::Failed(BookingFailure::unknown()),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_too_far_ahead_by_error_code_alone() {
        let parser = ResponseParser::new();
        let body = r#"{"errorMssgLang": "ERROR_ANTELACION_CLIENTE", "errorMssg": "x"}"#;
        assert_eq!(
            parser.classify_booking(StatusCode::OK, body),
            BookingOutcome::Failed(BookingFailure::rejected("x"))
        );
    }

    #[test]
    fn test_too_far_ahead_by_book_state_alone() {
        let parser = ResponseParser::new();
        let body = r#"{"bookState": -12, "errorMssg": "x"}"#;
        assert_eq!(
            parser.classify_booking(StatusCode::OK, body),
            BookingOutcome::Failed(BookingFailure::rejected("x"))
        );
    }

    // Negative states nobody documented still fail instead of passing as booked
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_unlisted_negative_state_is_unknown(state in -1000i64..0i64) {
            prop_assume!(state != BOOK_STATE_NO_CREDIT && state != BOOK_STATE_TOO_FAR_AHEAD);
            let parser = ResponseParser::new();
            let body = format!(r#"{{"bookState": {}}}"#, state);

            prop_assert_eq!(
                parser.classify_booking(StatusCode::OK, &body),
                BookingOutcome::Failed(BookingFailure::unknown())
            );
        }
    }

    // Non-OK statuses never count as a booking
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_non_ok_status_is_unknown(
            status_code in prop::sample::select(vec![201u16, 204, 302, 400, 401, 403, 404, 429, 500, 502, 503]),
        ) {
            let parser = ResponseParser::new();
            let status = StatusCode::from_u16(status_code).unwrap();

            prop_assert_eq!(
                parser.classify_booking(status, "{}"),
                BookingOutcome::Failed(BookingFailure::unknown())
            );
        }
    }
}
