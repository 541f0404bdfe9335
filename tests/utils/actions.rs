use axum::{
    body::Body,
    http::{Request, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// HTTP Actions
// ============================================================================

pub async fn response_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

impl TestSetup {
    pub fn token_for(&self, caller_id: &str, privileged: bool) -> String {
        self.tokens
            .create_token(caller_id, &format!("member-{caller_id}"), privileged)
            .unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn add_player(&self, moderator: &str, name: &str, external_id: &str) -> Response<Body> {
        let token = self.token_for(moderator, true);
        self.send(
            "POST",
            "/players",
            Some(&token),
            Some(json!({ "name": name, "external_id": external_id })),
        )
        .await
    }

    pub async fn register_game(&self, caller_id: &str, privileged: bool, reference: &str) -> Response<Body> {
        let token = self.token_for(caller_id, privileged);
        self.send(
            "POST",
            "/games",
            Some(&token),
            Some(json!({ "reference": reference })),
        )
        .await
    }

    /// Runs one registration to completion without going through HTTP
    pub async fn register_and_wait(&self, caller_id: &str, reference: &str) {
        self.state
            .dispatcher
            .submit(caller_id, true, reference)
            .unwrap()
            .await
            .unwrap();
    }

    pub async fn leaderboard(&self) -> Value {
        response_json(self.send("GET", "/leaderboard", None, None).await).await
    }
}
