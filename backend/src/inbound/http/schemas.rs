//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A user already exists at the requested id.
    #[schema(rename = "already_exists")]
    AlreadyExists,
    /// The document store could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Validation failed")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as schema violations.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::GithubAccount`].
#[derive(ToSchema)]
#[schema(as = crate::domain::GithubAccount, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GithubAccountSchema {
    #[schema(example = "carlsagan")]
    username: Option<String>,
    #[schema(format = "uri", example = "https://avatars.githubusercontent.com/u/7242003")]
    avatar_url: Option<String>,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
///
/// Stored user document as returned by the read endpoints.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRecord, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    #[schema(format = "email", example = "carl@email.com")]
    email: String,
    #[schema(example = "Carl")]
    first_name: String,
    #[schema(example = "Sagan")]
    last_name: String,
    #[schema(example = "Carl Sagan")]
    display_name: String,
    is_admin: bool,
    is_flagged: bool,
    #[schema(example = json!(["https://carl.blog.com/feed"]))]
    feeds: Vec<String>,
    github: Option<GithubAccountSchema>,
}

/// OpenAPI schema for user create and update bodies.
///
/// Unknown keys and explicit `null` values are rejected. When both GitHub
/// fields are not supplied together the request fails validation.
#[derive(ToSchema)]
#[schema(as = UserBody, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserBodySchema {
    #[schema(format = "email", example = "carl@email.com")]
    email: String,
    #[schema(example = "Carl")]
    first_name: String,
    #[schema(example = "Sagan")]
    last_name: String,
    /// Defaults to `"{firstName} {lastName}"`.
    display_name: Option<String>,
    /// Defaults to `false`.
    is_admin: Option<bool>,
    /// Defaults to `false`.
    is_flagged: Option<bool>,
    /// Absolute feed URIs; may be empty.
    feeds: Vec<String>,
    github: Option<GithubAccountSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "invalid_request",
            "not_found",
            "already_exists",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "schema should contain traceId");
        assert!(!schema_json.contains("trace_id"));
    }

    #[test]
    fn user_record_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<UserRecordSchema>();
        assert_eq!(UserRecordSchema::name(), "crate.domain.UserRecord");
        for field in ["firstName", "displayName", "isAdmin", "feeds", "github"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }
}
