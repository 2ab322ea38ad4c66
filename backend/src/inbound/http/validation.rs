//! Shared validation helpers for inbound HTTP adapters.
//!
//! Schema violations from [`crate::domain::validation`] are reported as a
//! single `invalid_request` error whose details list every failing field.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{Error, NewUser, UserId, UserSchema, Violation, validate_user_id};

const VALIDATION_FAILED: &str = "Validation failed";

/// Request segment a violation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Params,
    Body,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::Params => "params",
            Source::Body => "body",
        }
    }
}

pub(crate) fn violations_error(source: Source, violations: &[Violation]) -> Error {
    debug!(
        source = source.as_str(),
        violations = violations.len(),
        "request failed validation"
    );
    Error::invalid_request(VALIDATION_FAILED).with_details(json!({
        "source": source.as_str(),
        "violations": violations,
    }))
}

/// Validate the `id` path parameter.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    validate_user_id(raw)
        .map_err(|violation| violations_error(Source::Params, std::slice::from_ref(&violation)))
}

/// Validate a raw request body against the user schema.
pub(crate) fn parse_user_body(schema: &UserSchema, body: &Value) -> Result<NewUser, Error> {
    schema
        .validate(body)
        .map_err(|violations| violations_error(Source::Body, &violations))
}

fn json_payload_error(err: JsonPayloadError) -> Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_owned(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_owned()
        }
        other => format!("Malformed JSON body: {other}"),
    };
    Error::invalid_request(message).with_details(json!({ "source": Source::Body.as_str() }))
}

/// JSON extractor configuration reporting payload errors in the API envelope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::validation::json_config;
///
/// let app = App::new().app_data(json_config());
/// ```
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| json_payload_error(err).into())
}
