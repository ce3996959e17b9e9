use super::*;

use axum::{
    body,
    body::Body,
    http::{Request, StatusCode},
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use shared::domain::{RobotId, RobotStatus};
use shared::protocol::{FleetStatus, RobotStatusDetail};
use tower::ServiceExt;

use crate::peer::PeerHandle;

const SECRET: &str = "test-secret";

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

fn mint_token() -> String {
    let claims = TestClaims {
        sub: "operator-1".into(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token")
}

fn test_state() -> Arc<RelayState> {
    let verifier = Arc::new(JwtVerifier::new(SECRET));
    let gemini = Arc::new(GeminiClient::new("", "gemini-2.5-flash"));
    Arc::new(RelayState::new(verifier, gemini.clone(), gemini))
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_router(test_state());
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn robot_listing_requires_a_valid_token() {
    let app = build_router(test_state());
    let request = Request::get("/api/robots?token=bogus")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn robot_listing_counts_by_status() {
    let state = test_state();
    {
        let mut registry = state.registry.lock().await;
        let (r1, _rx1) = PeerHandle::new();
        let (r2, _rx2) = PeerHandle::new();
        let (op, _rx3) = PeerHandle::new();
        registry
            .register_robot(RobotId::new("rover-1"), r1)
            .expect("robot");
        registry
            .register_robot(RobotId::new("rover-2"), r2)
            .expect("robot");
        registry
            .register_operator(RobotId::new("rover-2"), op)
            .expect("pair");
    }

    let app = build_router(state);
    let token = mint_token();
    let request = Request::get(format!("/api/robots?token={token}"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let fleet: FleetStatus = serde_json::from_slice(&body).expect("json");
    assert_eq!(fleet.total, 2);
    assert_eq!(fleet.available, 1);
    assert_eq!(fleet.controlled, 1);
    assert_eq!(
        fleet.robots.get(&RobotId::new("rover-2")),
        Some(&RobotStatus::Controlled)
    );
}

#[tokio::test]
async fn unknown_robot_detail_reports_disconnected() {
    let app = build_router(test_state());
    let token = mint_token();
    let request = Request::get(format!("/api/robots/ghost?token={token}"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let detail: RobotStatusDetail = serde_json::from_slice(&body).expect("json");
    assert_eq!(detail.robot_id, RobotId::new("ghost"));
    assert_eq!(detail.status, RobotStatus::Disconnected);
}
