//! Request schema for user documents.
//!
//! [`UserSchema`] checks a raw JSON body against the user contract and, when it
//! passes, yields the [`NewUser`] handed to [`crate::domain::User::new`]. Every
//! violation is collected so clients can fix all fields in one round trip.
//!
//! The schema is built once at startup and shared read-only between requests.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::domain::{GithubAccount, NewUser, UserId, UserIdValidationError, default_display_name};

const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const EMAIL: &str = "email";
const DISPLAY_NAME: &str = "displayName";
const IS_ADMIN: &str = "isAdmin";
const IS_FLAGGED: &str = "isFlagged";
const FEEDS: &str = "feeds";
const GITHUB: &str = "github";
const GITHUB_USERNAME: &str = "username";
const GITHUB_AVATAR_URL: &str = "avatarUrl";

const USER_FIELDS: [&str; 8] = [
    FIRST_NAME,
    LAST_NAME,
    EMAIL,
    DISPLAY_NAME,
    IS_ADMIN,
    IS_FLAGGED,
    FEEDS,
    GITHUB,
];
const GITHUB_FIELDS: [&str; 2] = [GITHUB_USERNAME, GITHUB_AVATAR_URL];

// Dot-atom local part per RFC 5322, domain of at least two DNS labels.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(EMAIL_PATTERN)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Machine-readable reason attached to a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// A required field is absent.
    Required,
    /// The value has the wrong JSON type (including explicit `null`).
    InvalidType,
    /// A string field is empty.
    Empty,
    /// The value is not a well-formed email address.
    InvalidEmail,
    /// The value is not an absolute URI.
    InvalidUri,
    /// The value is not a hexadecimal identifier.
    InvalidId,
    /// The key is not part of the schema.
    UnknownField,
    /// A field was supplied without the field it must accompany.
    MissingPeer,
}

/// A single schema failure, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub code: ViolationCode,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, code: ViolationCode) -> Self {
        let field = field.into();
        let message = match code {
            ViolationCode::Required => format!("\"{field}\" is required"),
            ViolationCode::InvalidType => format!("\"{field}\" has an invalid type"),
            ViolationCode::Empty => format!("\"{field}\" is not allowed to be empty"),
            ViolationCode::InvalidEmail => format!("\"{field}\" must be a valid email"),
            ViolationCode::InvalidUri => format!("\"{field}\" must be a valid uri"),
            ViolationCode::InvalidId => {
                format!("\"{field}\" must only contain hexadecimal characters")
            }
            ViolationCode::UnknownField => format!("\"{field}\" is not allowed"),
            ViolationCode::MissingPeer => format!("\"{field}\" is missing a required peer"),
        };
        Self {
            field,
            code,
            message,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Validate a document identifier taken from a request path.
///
/// # Examples
/// ```
/// use backend::domain::validate_user_id;
///
/// assert!(validate_user_id("a1b2c3d4e5").is_ok());
/// assert!(validate_user_id("nope").is_err());
/// ```
pub fn validate_user_id(raw: &str) -> Result<UserId, Violation> {
    UserId::parse(raw).map_err(|err| match err {
        UserIdValidationError::Empty => Violation::new("id", ViolationCode::Empty),
        UserIdValidationError::NotHex => Violation::new("id", ViolationCode::InvalidId),
    })
}

/// Immutable schema for user request bodies.
#[derive(Debug, Clone)]
pub struct UserSchema {
    email: &'static Regex,
}

impl Default for UserSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSchema {
    /// Build the schema. Called once at startup.
    pub fn new() -> Self {
        Self {
            email: email_regex(),
        }
    }

    /// Validate `body`, returning the normalised input or every violation.
    ///
    /// Absent optional fields are defaulted here: `displayName` from the
    /// first and last names, `isAdmin` and `isFlagged` to `false`. Explicit
    /// `null` is never treated as absent.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserSchema;
    /// use serde_json::json;
    ///
    /// let schema = UserSchema::new();
    /// let user = schema
    ///     .validate(&json!({
    ///         "firstName": "Carl",
    ///         "lastName": "Sagan",
    ///         "email": "carl@email.com",
    ///         "feeds": ["https://carl.blog.com/feed"],
    ///     }))
    ///     .expect("valid body");
    /// assert_eq!(user.display_name.as_deref(), Some("Carl Sagan"));
    ///
    /// let violations = schema.validate(&json!({ "firstName": "Carl" })).unwrap_err();
    /// assert_eq!(violations.len(), 3);
    /// ```
    pub fn validate(&self, body: &Value) -> Result<NewUser, Vec<Violation>> {
        let Some(object) = body.as_object() else {
            return Err(vec![
                Violation::new("body", ViolationCode::InvalidType)
                    .with_message("request body must be a JSON object"),
            ]);
        };

        let mut violations = Vec::new();
        reject_unknown_fields(object, &USER_FIELDS, None, &mut violations);

        let first_name = string_field(object, FIRST_NAME, true, &mut violations);
        let last_name = string_field(object, LAST_NAME, true, &mut violations);
        let email = self.email_field(object, &mut violations);
        let display_name = string_field(object, DISPLAY_NAME, false, &mut violations);
        let is_admin = bool_field(object, IS_ADMIN, &mut violations);
        let is_flagged = bool_field(object, IS_FLAGGED, &mut violations);
        let feeds = feeds_field(object, &mut violations);
        let github = github_field(object, &mut violations);

        match (first_name, last_name, email, feeds) {
            (Some(first_name), Some(last_name), Some(email), Some(feeds))
                if violations.is_empty() =>
            {
                let display_name =
                    display_name.unwrap_or_else(|| default_display_name(&first_name, &last_name));
                Ok(NewUser {
                    email,
                    first_name,
                    last_name,
                    display_name: Some(display_name),
                    is_admin: Some(is_admin.unwrap_or(false)),
                    is_flagged: Some(is_flagged.unwrap_or(false)),
                    feeds,
                    github,
                })
            }
            _ => Err(violations),
        }
    }

    fn email_field(
        &self,
        object: &Map<String, Value>,
        violations: &mut Vec<Violation>,
    ) -> Option<String> {
        let email = string_field(object, EMAIL, true, violations)?;
        if self.email.is_match(&email) {
            Some(email)
        } else {
            violations.push(Violation::new(EMAIL, ViolationCode::InvalidEmail));
            None
        }
    }
}

fn field_path(parent: Option<&str>, field: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{field}"),
        None => field.to_owned(),
    }
}

fn reject_unknown_fields(
    object: &Map<String, Value>,
    allowed: &[&str],
    parent: Option<&str>,
    violations: &mut Vec<Violation>,
) {
    violations.extend(
        object
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| Violation::new(field_path(parent, key), ViolationCode::UnknownField)),
    );
}

fn check_string(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<String> {
    match value {
        Value::String(text) if text.is_empty() => {
            violations.push(Violation::new(path, ViolationCode::Empty));
            None
        }
        Value::String(text) => Some(text.clone()),
        _ => {
            violations.push(
                Violation::new(path, ViolationCode::InvalidType)
                    .with_message(format!("\"{path}\" must be a string")),
            );
            None
        }
    }
}

/// Whether `text` only uses characters RFC 3986 allows in a URI.
///
/// `Url::parse` repairs some invalid input (percent-encoding spaces, turning
/// `\` into `/`), so raw characters are checked before parsing.
fn has_uri_charset(text: &str) -> bool {
    text.bytes().all(|byte| {
        byte.is_ascii_graphic()
            && !matches!(
                byte,
                b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}'
            )
    })
}

fn check_uri(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<String> {
    let text = check_string(value, path, violations)?;
    if has_uri_charset(&text) && Url::parse(&text).is_ok() {
        Some(text)
    } else {
        violations.push(Violation::new(path, ViolationCode::InvalidUri));
        None
    }
}

fn string_field(
    object: &Map<String, Value>,
    field: &str,
    required: bool,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field) {
        Some(value) => check_string(value, field, violations),
        None if required => {
            violations.push(Violation::new(field, ViolationCode::Required));
            None
        }
        None => None,
    }
}

/// Booleans also accept the strings `"true"` and `"false"` in any case.
fn bool_field(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<bool> {
    match object.get(field)? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => {
            violations.push(
                Violation::new(field, ViolationCode::InvalidType)
                    .with_message(format!("\"{field}\" must be a boolean")),
            );
            None
        }
    }
}

fn feeds_field(
    object: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Option<Vec<String>> {
    let items = match object.get(FEEDS) {
        None => {
            violations.push(Violation::new(FEEDS, ViolationCode::Required));
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            violations.push(
                Violation::new(FEEDS, ViolationCode::InvalidType)
                    .with_message(format!("\"{FEEDS}\" must be an array")),
            );
            return None;
        }
    };

    let before = violations.len();
    let feeds: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| check_uri(item, &format!("{FEEDS}[{index}]"), violations))
        .collect();
    (violations.len() == before).then_some(feeds)
}

fn github_field(
    object: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Option<GithubAccount> {
    let github = match object.get(GITHUB)? {
        Value::Object(github) => github,
        _ => {
            violations.push(
                Violation::new(GITHUB, ViolationCode::InvalidType)
                    .with_message(format!("\"{GITHUB}\" must be an object")),
            );
            return None;
        }
    };

    reject_unknown_fields(github, &GITHUB_FIELDS, Some(GITHUB), violations);

    let username_path = field_path(Some(GITHUB), GITHUB_USERNAME);
    let avatar_path = field_path(Some(GITHUB), GITHUB_AVATAR_URL);
    let username = github
        .get(GITHUB_USERNAME)
        .and_then(|value| check_string(value, &username_path, violations));
    let avatar_url = github
        .get(GITHUB_AVATAR_URL)
        .and_then(|value| check_uri(value, &avatar_path, violations));

    match (
        github.contains_key(GITHUB_USERNAME),
        github.contains_key(GITHUB_AVATAR_URL),
    ) {
        (true, false) => violations.push(missing_peer(GITHUB_USERNAME, GITHUB_AVATAR_URL)),
        (false, true) => violations.push(missing_peer(GITHUB_AVATAR_URL, GITHUB_USERNAME)),
        _ => {}
    }

    Some(GithubAccount {
        username,
        avatar_url,
    })
}

fn missing_peer(present: &str, missing: &str) -> Violation {
    Violation::new(GITHUB, ViolationCode::MissingPeer).with_message(format!(
        "\"{GITHUB}\" contains [{present}] without its required peers [{missing}]"
    ))
}

#[cfg(test)]
mod tests;
