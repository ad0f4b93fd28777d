use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, info};

/// Logs method, path and headers of every request and the status and
/// headers of its response.
///
/// Bodies are not buffered, streamed assets pass through untouched.
pub async fn print_request_response(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    info!("{method} {uri}");
    for (k, v) in req.headers() {
        debug!("request-header: {k:?} -> {v:?} ");
    }

    let res = next.run(req).await;

    info!(status = %res.status(), "{method} {uri}");
    for (k, v) in res.headers() {
        debug!("reply-header: {k:?} -> {v:?} ");
    }

    res
}
