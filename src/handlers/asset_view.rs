use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::{headers::Range, TypedHeader};
use tracing::{debug, info};

use crate::{
    error::{ApiErrorKind, ApiResult},
    state::AppState,
    view::RequestContext,
    webscript::{HttpWebScriptRequest, ServiceMatch, WebScriptRequest},
};

/// Renders the asset at the request path through the view resolver chain.
///
/// `GET /` and `GET /*path`
pub(crate) async fn render_asset(
    State(state): State<AppState>,
    range: Option<TypedHeader<Range>>,
    request: Request,
) -> Response {
    let request = match HttpWebScriptRequest::from_request(
        request,
        state.context_path(),
        ServiceMatch::catch_all(),
        state.runtime().clone(),
    )
    .await
    {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    let force_success = request.force_success_status();
    let range = range.map(|TypedHeader(range)| range);

    match resolve_view(&state, &request, range).await {
        Ok(response) => response,
        Err(err) => {
            let mut response = err.into_response();
            if force_success {
                debug!(status = %response.status(), "forcing success status");
                *response.status_mut() = StatusCode::OK;
            }
            response
        }
    }
}

async fn resolve_view(
    state: &AppState,
    request: &HttpWebScriptRequest,
    range: Option<Range>,
) -> ApiResult<Response> {
    let path = request.path_info();
    let asset = state.repository().asset_at(path).await?;
    debug!(path, found = asset.is_some(), "looked up asset");

    let ctx = RequestContext::from_request(request, asset);
    let Some(view) = state.resolvers().resolve(&ctx).await? else {
        info!(path, "no view for path");
        return Err(ApiErrorKind::AssetNotFound(path.to_string()));
    };

    Ok(view.render(range))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::render_asset;
    use crate::{
        log::print_request_response,
        pages::PageCatalog,
        repository::LocalRepository,
        state::AppState,
        test_helpers::{content_dir, init_tracing},
        view::{DynamicPageViewResolver, NamedRouteResolver, ViewResolverChain, ASSET_ID_HEADER, PAGE_ID_HEADER},
    };

    fn app_with_context(context_path: &str) -> Router {
        init_tracing();

        let root = content_dir();
        let catalog = Arc::new(PageCatalog::from_file(&root.join("pages.toml")).unwrap());
        let resolvers = ViewResolverChain::new()
            .then(NamedRouteResolver::new(
                catalog.routes().clone(),
                catalog.clone(),
            ))
            .then(DynamicPageViewResolver::new(catalog));
        let repository = Arc::new(LocalRepository::try_new(&root).unwrap());
        let state = AppState::new(repository, resolvers, context_path);

        Router::new()
            .route("/", get(render_asset))
            .route("/*path", get(render_asset))
            .layer(middleware::from_fn(print_request_response))
            .with_state(state)
    }

    #[fixture]
    fn app() -> Router {
        app_with_context("")
    }

    async fn get_uri(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_declared_template_renders_page_passes(app: Router) {
        let resp = get_uri(app, "/news/story.html").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(PAGE_ID_HEADER).unwrap(), "article");

        let json = body_json(resp).await;
        assert_eq!(json["url"], "article");
        assert_eq!(json["page"]["template-instance"], "templates/article.ftl");
    }

    #[rstest]
    #[tokio::test]
    async fn test_view_parameter_overrides_template_passes(app: Router) {
        let resp = get_uri(app, "/news/story.html?view=summary").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["url"], "summary");
    }

    #[rstest]
    #[tokio::test]
    async fn test_section_index_passes(app: Router) {
        let resp = get_uri(app, "/news/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["url"], "sectionpage");
    }

    #[rstest]
    #[tokio::test]
    async fn test_named_route_passes(app: Router) {
        let resp = get_uri(app, "/search?q=rust").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(PAGE_ID_HEADER).unwrap(), "search");
    }

    #[rstest]
    #[tokio::test]
    async fn test_raw_asset_is_streamed_passes(app: Router) {
        let resp = get_uri(app, "/logo.svg").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        assert_eq!(resp.headers().get(ASSET_ID_HEADER).unwrap(), "logo.svg");
        let body = body_bytes(resp).await;
        assert!(body.starts_with(b"<svg"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_range_request_passes(app: Router) {
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/logo.svg")
                    .header(header::RANGE, "bytes=0-3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_bytes(resp).await, b"<svg");
    }

    #[rstest]
    #[tokio::test]
    async fn test_editorial_errors_passes(app: Router) {
        let resp = get_uri(app.clone(), "/news/story.html?view=missing").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(body.contains("template.none"));
        assert!(body.contains("/news/story.html"));

        let resp = get_uri(app, "/news/placeholder").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(body.contains("No template and no content for /news/placeholder"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_force_success_status_passes(app: Router) {
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/news/placeholder")
                    .header("alf-force-success-response", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/nope.html", StatusCode::NOT_FOUND)]
    #[case("/section.toml", StatusCode::NOT_FOUND)]
    #[case("/news/../pages.toml", StatusCode::FORBIDDEN)]
    #[case("/news/%2E%2E/pages.toml", StatusCode::FORBIDDEN)]
    #[tokio::test]
    async fn test_unavailable_paths_passes(app: Router, #[case] uri: &str, #[case] status: StatusCode) {
        assert_eq!(get_uri(app, uri).await.status(), status);
    }

    #[tokio::test]
    async fn test_context_path_is_stripped_passes() {
        let app = app_with_context("/site");
        let resp = get_uri(app.clone(), "/site/news/story.html").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get_uri(app, "/news/story.html").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
