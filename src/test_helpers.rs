use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ------------------------------------------------
// test facility for fixtures
// ------------------------------------------------

pub(crate) fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("test_data")
}

/// Content repository fixture
pub(crate) fn content_dir() -> PathBuf {
    test_data_dir().join("content")
}

// ------------------------------------------------
// test facility for tracing
// ------------------------------------------------

/// When we initialize the global tracing subscriber, this must only happen once.
/// During tests, each test will initialize, to make sure we have at least tracing once.
static TRACER: OnceLock<Mutex<usize>> = OnceLock::new();

pub(crate) fn init_tracing() {
    let _ = TRACER.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "wcm_view_server=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
        Mutex::new(0)
    });
}
