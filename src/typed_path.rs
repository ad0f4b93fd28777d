use axum_extra::routing::TypedPath;
use serde::Deserialize;

// A type safe route with `"/health/live"` as its associated path.
#[derive(TypedPath, Deserialize, Debug, Clone, Copy)]
#[typed_path("/health/live")]
pub struct LiveHealthPath;
