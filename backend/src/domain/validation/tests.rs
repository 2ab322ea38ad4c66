//! Tests for the user request schema.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const AVATAR_URL: &str = "https://avatars.githubusercontent.com/u/7242003?s=460&v=4";

#[fixture]
fn schema() -> UserSchema {
    UserSchema::new()
}

#[fixture]
fn body() -> Value {
    json!({
        "firstName": "Carl",
        "lastName": "Sagan",
        "email": "carl@email.com",
        "displayName": "Carl Sagan",
        "isAdmin": true,
        "isFlagged": true,
        "feeds": ["https://dev.to/feed/carlsagan"],
        "github": {
            "username": "carlsagan",
            "avatarUrl": AVATAR_URL,
        },
    })
}

fn codes_for(violations: &[Violation], field: &str) -> Vec<ViolationCode> {
    violations
        .iter()
        .filter(|violation| violation.field == field)
        .map(|violation| violation.code)
        .collect()
}

fn without(mut body: Value, field: &str) -> Value {
    body.as_object_mut().expect("object body").remove(field);
    body
}

fn with(mut body: Value, field: &str, value: Value) -> Value {
    body.as_object_mut()
        .expect("object body")
        .insert(field.to_owned(), value);
    body
}

#[rstest]
fn accepts_complete_body(schema: UserSchema, body: Value) {
    let user = schema.validate(&body).expect("valid body");
    assert_eq!(user.email, "carl@email.com");
    assert_eq!(user.display_name.as_deref(), Some("Carl Sagan"));
    assert_eq!(user.is_admin, Some(true));
    assert_eq!(user.is_flagged, Some(true));
    assert_eq!(user.feeds, vec!["https://dev.to/feed/carlsagan".to_owned()]);
    assert_eq!(
        user.github,
        Some(GithubAccount::new("carlsagan", AVATAR_URL))
    );
}

#[rstest]
fn applies_defaults_for_absent_optional_fields(schema: UserSchema, body: Value) {
    let body = ["displayName", "isAdmin", "isFlagged", "github"]
        .into_iter()
        .fold(body, without);
    let user = schema.validate(&body).expect("valid body");
    assert_eq!(user.display_name.as_deref(), Some("Carl Sagan"));
    assert_eq!(user.is_admin, Some(false));
    assert_eq!(user.is_flagged, Some(false));
    assert!(user.github.is_none());
}

#[rstest]
fn accepts_empty_feeds(schema: UserSchema, body: Value) {
    let user = schema
        .validate(&with(body, "feeds", json!([])))
        .expect("empty feeds are valid");
    assert!(user.feeds.is_empty());
}

#[rstest]
#[case("firstName")]
#[case("lastName")]
#[case("email")]
#[case("feeds")]
fn rejects_missing_required_field(schema: UserSchema, body: Value, #[case] field: &str) {
    let violations = schema
        .validate(&without(body, field))
        .expect_err("missing field rejected");
    assert_eq!(codes_for(&violations, field), vec![ViolationCode::Required]);
}

#[rstest]
#[case("firstName")]
#[case("lastName")]
#[case("email")]
#[case("displayName")]
#[case("isAdmin")]
#[case("isFlagged")]
#[case("feeds")]
#[case("github")]
fn rejects_explicit_null(schema: UserSchema, body: Value, #[case] field: &str) {
    let violations = schema
        .validate(&with(body, field, Value::Null))
        .expect_err("null rejected");
    assert_eq!(codes_for(&violations, field), vec![ViolationCode::InvalidType]);
}

#[rstest]
#[case("carl")]
#[case("carl@")]
#[case("carl@localhost")]
#[case("carl sagan@email.com")]
#[case("carl..sagan@email.com")]
#[case(".carl@email.com")]
#[case("carl.@email.com")]
fn rejects_malformed_email(schema: UserSchema, body: Value, #[case] email: &str) {
    let violations = schema
        .validate(&with(body, "email", json!(email)))
        .expect_err("bad email rejected");
    assert_eq!(codes_for(&violations, "email"), vec![ViolationCode::InvalidEmail]);
}

#[rstest]
#[case("123")]
#[case("https://example.com/a b")]
#[case("https://example.com\\feed")]
#[case("https://example.com/{feed}")]
#[case("https://example.com/feed|rss")]
fn rejects_non_uri_feed(schema: UserSchema, body: Value, #[case] feed: &str) {
    let body = with(body, "feeds", json!(["https://ok.example/feed", feed]));
    let violations = schema.validate(&body).expect_err("bad feed rejected");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "feeds[1]");
    assert_eq!(violations[0].code, ViolationCode::InvalidUri);
}

#[rstest]
#[case("carl.sagan@email.com")]
#[case("carl+feeds@mail.email.com")]
fn accepts_dotted_and_tagged_email(schema: UserSchema, body: Value, #[case] email: &str) {
    let user = schema
        .validate(&with(body, "email", json!(email)))
        .expect("valid email accepted");
    assert_eq!(user.email, email);
}

#[rstest]
fn accepts_percent_encoded_feed(schema: UserSchema, body: Value) {
    let feed = "https://example.com/a%20b?format=rss&lang=en#top";
    let user = schema
        .validate(&with(body, "feeds", json!([feed])))
        .expect("encoded feed accepted");
    assert_eq!(user.feeds, vec![feed.to_owned()]);
}

#[rstest]
fn rejects_non_array_feeds(schema: UserSchema, body: Value) {
    let violations = schema
        .validate(&with(body, "feeds", json!("https://ok.example/feed")))
        .expect_err("string feeds rejected");
    assert_eq!(codes_for(&violations, "feeds"), vec![ViolationCode::InvalidType]);
}

#[rstest]
#[case(json!({ "username": "carlsagan" }), "[username] without its required peers [avatarUrl]")]
#[case(json!({ "avatarUrl": AVATAR_URL }), "[avatarUrl] without its required peers [username]")]
fn rejects_partial_github(
    schema: UserSchema,
    body: Value,
    #[case] github: Value,
    #[case] fragment: &str,
) {
    let violations = schema
        .validate(&with(body, "github", github))
        .expect_err("partial github rejected");
    assert_eq!(codes_for(&violations, "github"), vec![ViolationCode::MissingPeer]);
    assert!(violations[0].message.contains(fragment));
}

#[rstest]
#[case("avatar.png")]
#[case("https://avatars.example.com/carl sagan.png")]
#[case("https://avatars.example.com\\carl.png")]
fn rejects_invalid_avatar_url(schema: UserSchema, body: Value, #[case] avatar: &str) {
    let github = json!({ "username": "carlsagan", "avatarUrl": avatar });
    let violations = schema
        .validate(&with(body, "github", github))
        .expect_err("bad avatar rejected");
    assert_eq!(
        codes_for(&violations, "github.avatarUrl"),
        vec![ViolationCode::InvalidUri]
    );
}

#[rstest]
fn rejects_unknown_fields(schema: UserSchema, body: Value) {
    let body = with(body, "id", json!("abc"));
    let violations = schema.validate(&body).expect_err("unknown field rejected");
    assert_eq!(codes_for(&violations, "id"), vec![ViolationCode::UnknownField]);
}

#[rstest]
fn rejects_unknown_github_fields(schema: UserSchema, body: Value) {
    let github = json!({ "username": "carl", "avatarUrl": AVATAR_URL, "token": "x" });
    let violations = schema
        .validate(&with(body, "github", github))
        .expect_err("unknown github field rejected");
    assert_eq!(
        codes_for(&violations, "github.token"),
        vec![ViolationCode::UnknownField]
    );
}

#[rstest]
fn rejects_empty_strings(schema: UserSchema, body: Value) {
    let violations = schema
        .validate(&with(body, "firstName", json!("")))
        .expect_err("empty name rejected");
    assert_eq!(codes_for(&violations, "firstName"), vec![ViolationCode::Empty]);
}

#[rstest]
fn accepts_boolean_strings(schema: UserSchema, body: Value) {
    let body = with(with(body, "isAdmin", json!("TRUE")), "isFlagged", json!("false"));
    let user = schema.validate(&body).expect("boolean strings accepted");
    assert_eq!(user.is_admin, Some(true));
    assert_eq!(user.is_flagged, Some(false));
}

#[rstest]
fn collects_every_violation(schema: UserSchema) {
    let body = json!({
        "firstName": 7,
        "email": "nope",
        "feeds": ["123"],
        "github": { "username": "carl" },
    });
    let violations = schema.validate(&body).expect_err("many violations");
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    for expected in ["firstName", "lastName", "email", "feeds[0]", "github"] {
        assert!(fields.contains(&expected), "missing violation for {expected}");
    }
}

#[rstest]
#[case(json!([]))]
#[case(json!("user"))]
#[case(Value::Null)]
fn rejects_non_object_body(schema: UserSchema, #[case] body: Value) {
    let violations = schema.validate(&body).expect_err("non-object rejected");
    assert_eq!(codes_for(&violations, "body"), vec![ViolationCode::InvalidType]);
}

#[rstest]
fn validate_user_id_reports_field() {
    let violation = validate_user_id("xyz").expect_err("non-hex rejected");
    assert_eq!(violation.field, "id");
    assert_eq!(violation.code, ViolationCode::InvalidId);
    assert_eq!(
        validate_user_id("").expect_err("empty rejected").code,
        ViolationCode::Empty
    );
}

#[rstest]
fn violations_serialise_as_snake_case_codes() {
    let violation = validate_user_id("xyz").expect_err("non-hex rejected");
    let value = serde_json::to_value(violation).expect("serialise");
    assert_eq!(value.get("code"), Some(&json!("invalid_id")));
    assert_eq!(value.get("field"), Some(&json!("id")));
}
