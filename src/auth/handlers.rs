use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{dto::CredentialsRequest, services::AccountService},
    error::AccountResult,
    state::AppState,
    users::UserPublicView,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signUp", post(sign_up))
        .route("/user/signIn", post(sign_in))
}

#[instrument(skip(accounts, payload))]
pub async fn sign_up(
    State(accounts): State<AccountService>,
    Json(payload): Json<CredentialsRequest>,
) -> AccountResult<(StatusCode, Json<UserPublicView>)> {
    let payload = payload.validated()?;
    let user = accounts.sign_up(&payload.email, &payload.password).await?;

    info!(email = %user.email, "user signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(accounts, payload))]
pub async fn sign_in(
    State(accounts): State<AccountService>,
    Json(payload): Json<CredentialsRequest>,
) -> AccountResult<Json<UserPublicView>> {
    let payload = payload.validated()?;
    let user = accounts.sign_in(&payload.email, &payload.password).await?;

    info!(email = %user.email, "user signed in");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn sign_up_sign_in_and_conflict() {
        let app = build_app(AppState::fake());
        let creds = json!({ "email": "a@x.io", "password": "s3cret-pass" });

        let (status, body) = post_json(app.clone(), "/api/v1/user/signUp", creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "email": "a@x.io" }));

        let (status, body) = post_json(app.clone(), "/api/v1/user/signUp", creds.clone()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "User already exists");

        let (status, body) = post_json(app.clone(), "/api/v1/user/signIn", creds).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "email": "a@x.io" }));
    }

    #[tokio::test]
    async fn sign_in_unknown_email_is_unauthorized() {
        let app = build_app(AppState::fake());
        let (status, body) = post_json(
            app,
            "/api/v1/user/signIn",
            json!({ "email": "missing@x.io", "password": "pw" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn invalid_email_is_bad_request() {
        let app = build_app(AppState::fake());
        let (status, _) = post_json(
            app,
            "/api/v1/user/signUp",
            json!({ "email": "not-an-email", "password": "pw" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = build_app(AppState::fake());
        let (status, _) = post_json(app, "/api/v1/user/signUp", json!({ "email": "a@x.io" })).await;
        assert!(status.is_client_error());
    }
}
