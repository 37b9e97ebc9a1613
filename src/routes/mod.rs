use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::{error::AppError, services::auth_service, state::SharedState};

/// Session login and logout.
pub mod auth;
/// Clock control.
pub mod clock;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Scoreboard view and control.
pub mod scoreboard;
/// Viewer event stream.
pub mod sse;
/// Peer synchronisation socket.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let control_router = scoreboard::control_router()
        .merge(clock::router())
        .route_layer(middleware::from_fn(require_session));

    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(auth::router())
        .merge(scoreboard::router())
        .merge(control_router);

    api_router.merge(docs::router()).with_state(state)
}

/// Reject control requests that do not carry the session cookie set by `/api/login`.
async fn require_session(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    if auth_service::has_session(req.headers()) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized(
            "missing session; log in through /api/login".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        http::{
            Method, StatusCode,
            header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        },
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn control_routes_require_the_session_cookie() {
        let state = AppState::new(AppConfig::default());
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/scoreboard/teams/A/score",
                None,
                Some(json!({"delta": 3})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/clocks/game/start",
                Some("session=forged"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.snapshot().await.team_a.score, 0);
        assert!(!state.clock_status().await.game_running);

        let response = app
            .oneshot(request(
                Method::POST,
                "/scoreboard/teams/A/score",
                Some("session=authenticated"),
                Some(json!({"delta": 3})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["team_a"]["score"], 3);
        assert_eq!(state.snapshot().await.team_a.score, 3);
    }

    #[tokio::test]
    async fn read_routes_stay_open() {
        let app = router(AppState::new(AppConfig::default()));

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/scoreboard", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["game_timer"], "10:00");

        let response = app
            .oneshot(request(Method::GET, "/healthcheck", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_sets_the_cookie_only_on_exact_match() {
        let app = router(AppState::new(AppConfig::default()));

        for credentials in [
            json!({"username": "", "password": ""}),
            json!({"username": "admin", "password": "wrong"}),
        ] {
            let response = app
                .clone()
                .oneshot(request(Method::POST, "/api/login", None, Some(credentials)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().get(SET_COOKIE).is_none());
            assert_eq!(json_body(response).await, json!({"success": false}));
        }

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/login",
                None,
                Some(json!({"username": "admin", "password": "password"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("session=authenticated;"));
        assert_eq!(json_body(response).await, json!({"success": true}));
    }

    #[tokio::test]
    async fn malformed_clock_value_is_a_conflict() {
        let state = AppState::new(AppConfig::default());
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/scoreboard/shot-clock",
                Some("session=authenticated"),
                Some(json!({"value": "--"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(
                Method::POST,
                "/clocks/shot/start",
                Some("session=authenticated"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(!state.clock_status().await.shot_running);
    }
}
