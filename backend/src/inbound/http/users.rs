//! Users API handlers.
//!
//! ```text
//! GET    /users
//! GET    /users/{id}
//! POST   /users/{id} {"firstName":"Carl","lastName":"Sagan","email":"carl@email.com","feeds":[]}
//! PUT    /users/{id} {...}
//! DELETE /users/{id}
//! ```
//!
//! The `{id}` segment is validated before the body, and both before any
//! storage access.

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::UserRecord;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserBodySchema, UserRecordSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_user_body, parse_user_id};

/// Confirmation body returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "Added user with id: ba7816bf8f")]
    pub msg: String,
}

impl MessageBody {
    fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Register the users handlers under `mount_path`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::users::users_scope;
///
/// let app = App::new().service(users_scope("/users"));
/// ```
pub fn users_scope(mount_path: &str) -> Scope {
    web::scope(mount_path)
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
}

/// List every stored user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Stored users in store order", body = [UserRecordSchema]),
        (status = 404, description = "No users stored", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserRecord>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Hex user id derived from the email address")),
    responses(
        (status = 200, description = "Stored user", body = UserRecordSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserRecord>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(&id).await?;
    Ok(web::Json(user))
}

/// Create a user at `id`.
#[utoipa::path(
    post,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Hex user id derived from the email address")),
    request_body = UserBodySchema,
    responses(
        (status = 201, description = "User created", body = MessageBody),
        (status = 400, description = "Invalid id or body, or user already exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/{id}")]
pub async fn create_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let user = parse_user_body(&state.schema, &payload)?;
    state.users_command.create_user(&id, user).await?;
    Ok(HttpResponse::Created().json(MessageBody::new(format!("Added user with id: {id}"))))
}

/// Merge new values into the user at `id`.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Hex user id derived from the email address")),
    request_body = UserBodySchema,
    responses(
        (status = 200, description = "User updated", body = MessageBody),
        (status = 400, description = "Invalid id or body", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = parse_user_id(&path)?;
    let user = parse_user_body(&state.schema, &payload)?;
    state.users_command.update_user(&id, user).await?;
    Ok(web::Json(MessageBody::new(format!("Updated user {id}"))))
}

/// Remove the user at `id`.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Hex user id derived from the email address")),
    responses(
        (status = 200, description = "User removed", body = MessageBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = parse_user_id(&path)?;
    state.users_command.delete_user(&id).await?;
    Ok(web::Json(MessageBody::new(format!("User {id} was removed."))))
}
