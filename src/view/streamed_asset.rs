use axum::{
    http::{header, header::HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_extra::headers::Range;
use axum_range::{KnownSize, Ranged};

use crate::asset::{AssetId, ContentStream, DEFAULT_MIME_TYPE};

pub const ASSET_ID_HEADER: HeaderName = HeaderName::from_static("x-asset-id");

/// A view that sends an asset's raw bytes
#[derive(Debug)]
pub struct StreamedAssetView {
    asset_id: AssetId,
    stream: ContentStream,
}

impl StreamedAssetView {
    pub fn new(asset_id: AssetId, stream: ContentStream) -> Self {
        Self { asset_id, stream }
    }

    pub const fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn mime_type(&self) -> &str {
        self.stream.mime_type()
    }

    pub fn into_stream(self) -> ContentStream {
        self.stream
    }

    /// Streams the content, a `Range` yields a partial response.
    pub fn render(self, range: Option<Range>) -> Response {
        let (reader, length, mime_type) = self.stream.into_parts();
        let content_type = HeaderValue::from_str(&mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));

        let mut response = Ranged::new(range, KnownSize::sized(reader, length)).into_response();
        let headers = response.headers_mut();
        let _ = headers.insert(header::CONTENT_TYPE, content_type);
        if let Ok(asset_id) = HeaderValue::from_str(self.asset_id.as_str()) {
            let _ = headers.insert(ASSET_ID_HEADER, asset_id);
        }
        response
    }
}

impl IntoResponse for StreamedAssetView {
    fn into_response(self) -> Response {
        self.render(None)
    }
}
