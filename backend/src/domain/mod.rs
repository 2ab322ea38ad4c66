//! Domain primitives, entities and services.
//!
//! Purpose: keep the user model, its identity derivation and request schema
//! independent of HTTP and storage concerns. Adapters in
//! [`crate::inbound`] and [`crate::outbound`] translate to and from these
//! types.
//!
//! Public surface:
//! - `User`, `NewUser`, `UserRecord`, `GithubAccount`: the user entity, its
//!   input record and its stored form.
//! - `UserId`, `hash_email`: identity derivation from an email address.
//! - `UserSchema`, `Violation`: request body and identifier validation.
//! - `UsersService`: CRUD use-cases over the [`ports::UserStore`] port.
//! - `Error`, `ErrorCode`: transport-agnostic failures.

pub mod error;
pub mod identity;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod users_service;
pub mod validation;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{USER_ID_LEN, UserId, UserIdValidationError, hash_email};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{GithubAccount, NewUser, User, UserRecord, default_display_name};
pub use self::users_service::UsersService;
pub use self::validation::{UserSchema, Violation, ViolationCode, validate_user_id};
