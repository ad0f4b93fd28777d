use std::{sync::OnceLock, time::Instant};

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::json;

use crate::typed_path::LiveHealthPath;

// Global that stores the current when the server started
// This is used to check if the server is running
pub static START_TIME: OnceLock<Instant> = OnceLock::new();

pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

/// `GET /health/live`
pub async fn live_check(_path: LiveHealthPath) -> impl IntoResponse {
    let uptime = START_TIME
        .get()
        .map_or(0, |start| Instant::now().duration_since(*start).as_secs());

    (
        StatusCode::OK,
        json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": uptime,
            "timestamp": chrono::Local::now().timestamp(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod test {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use axum_extra::routing::RouterExt;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::{init_start_time, live_check};

    #[tokio::test]
    async fn test_live_check_passes() {
        init_start_time();
        let app = Router::new().typed_get(live_check);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["uptime"].is_u64());
    }
}
