use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{is_valid_email, CredentialsRequest},
    error::{AccountError, AccountResult},
    state::AppState,
    users::{
        dto::{MessageResponse, UpdateRequest},
        repo_types::UserPublicView,
        services::UserService,
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/user",
            get(list_users).post(create_user).delete(delete_all_users),
        )
        .route(
            "/admin/user/:email",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(users))]
pub async fn list_users(State(users): State<UserService>) -> AccountResult<Json<Vec<UserPublicView>>> {
    Ok(Json(users.list_users().await?))
}

/// Responds `200 null` for an unknown email.
#[instrument(skip(users))]
pub async fn get_user(
    State(users): State<UserService>,
    Path(email): Path<String>,
) -> AccountResult<Json<Option<UserPublicView>>> {
    Ok(Json(users.get_user(&email).await?))
}

#[instrument(skip(users, payload))]
pub async fn create_user(
    State(users): State<UserService>,
    Json(payload): Json<CredentialsRequest>,
) -> AccountResult<(StatusCode, Json<MessageResponse>)> {
    let payload = payload.validated()?;
    users.create_user(&payload.email, &payload.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User successfully created",
        }),
    ))
}

#[instrument(skip(users, payload))]
pub async fn update_user(
    State(users): State<UserService>,
    Path(email): Path<String>,
    Json(mut payload): Json<UpdateRequest>,
) -> AccountResult<Json<MessageResponse>> {
    payload.email = payload.email.map(|e| e.trim().to_string());
    if let Some(new_email) = payload.email.as_deref().filter(|e| !e.is_empty()) {
        if !is_valid_email(new_email) {
            warn!(email = %new_email, "invalid email");
            return Err(AccountError::Validation("Invalid email".into()));
        }
    }

    users.update_user(&email, payload).await?;
    Ok(Json(MessageResponse {
        message: "User updated successfully",
    }))
}

#[instrument(skip(users))]
pub async fn delete_user(
    State(users): State<UserService>,
    Path(email): Path<String>,
) -> AccountResult<Json<MessageResponse>> {
    users.delete_user(&email).await?;
    info!(email = %email, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

#[instrument(skip(users))]
pub async fn delete_all_users(State(users): State<UserService>) -> AccountResult<Json<MessageResponse>> {
    users.delete_all_users().await?;
    Ok(Json(MessageResponse {
        message: "Users table successfully cleared",
    }))
}
