//! Liveness endpoint (spec §6 `GET /health`): "Always 200 `{status: ok}`
//! when up."

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
    }
}
