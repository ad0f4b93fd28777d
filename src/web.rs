use axum::{middleware, routing::get, Router};
use axum_extra::routing::RouterExt;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    context::ServerRuntimeContext,
    error::{AppResult, ErrorKind},
    handlers::{
        asset_view::render_asset,
        health::{init_start_time, live_check},
    },
    log::print_request_response,
    state::AppState,
};

/// Builds the routing structure
///
/// `/health/live` is matched before the asset catch-all.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .typed_get(live_check)
        .route("/", get(render_asset))
        .route("/*path", get(render_asset))
        .with_state(state);

    // -----------------------------------------------
    // Extra logging requested. Handlers will log too
    // ----------------------------------------------
    match LevelFilter::current() {
        LevelFilter::TRACE | LevelFilter::DEBUG | LevelFilter::INFO => {
            app = app.layer(middleware::from_fn(print_request_response));
        }
        _ => {}
    };

    app
}

pub async fn start_web_server(runtime_ctx: ServerRuntimeContext) -> AppResult<()> {
    init_start_time();

    let ServerRuntimeContext {
        socket_address,
        state,
        tls,
    } = runtime_ctx;

    let app = router(state);

    info!("Starting web server ...");

    // -----------------------------------------------
    // Start server with or without TLS
    // -----------------------------------------------
    match tls {
        None => {
            info!("Listening on: `http://{socket_address}`");

            let listener = TcpListener::bind(socket_address).await.map_err(|err| {
                ErrorKind::WebServer.context(format!("Could not bind to {socket_address}: {err}"))
            })?;

            axum::serve(listener, app.into_make_service())
                .await
                .map_err(|err| {
                    ErrorKind::WebServer.context(format!("Could not start web server: {err}"))
                })?;
        }
        Some(tls) => {
            // the ring provider may already be installed by an earlier start
            let _ = rustls::crypto::ring::default_provider().install_default();

            let config = RustlsConfig::from_pem_file(&tls.tls_cert, &tls.tls_key)
                .await
                .map_err(|err| {
                    ErrorKind::WebServer.context(format!("Could not load TLS files: {err}"))
                })?;

            info!("Listening on: `https://{socket_address}`");

            axum_server::bind_rustls(socket_address, config)
                .serve(app.into_make_service())
                .await
                .map_err(|err| {
                    ErrorKind::WebServer.context(format!("Could not start web server: {err}"))
                })?;
        }
    }

    Ok(())
}
