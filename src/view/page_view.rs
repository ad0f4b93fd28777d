use std::sync::Arc;

use axum::{
    http::{header::HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pages::Page;

pub const PAGE_ID_HEADER: HeaderName = HeaderName::from_static("x-page-id");

/// A view bound to a page template.
///
/// `url` is the template identifier the page was resolved from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageView {
    url: String,
    page: Arc<Page>,
}

impl PageView {
    pub fn new(url: impl Into<String>, page: Arc<Page>) -> Self {
        Self {
            url: url.into(),
            page,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

/// Hands the page model to the client, template rendering happens downstream.
impl IntoResponse for PageView {
    fn into_response(self) -> Response {
        let page_id = HeaderValue::from_str(&self.page.id).ok();
        let mut response = Json(self).into_response();
        if let Some(page_id) = page_id {
            let _ = response.headers_mut().insert(PAGE_ID_HEADER, page_id);
        }
        response
    }
}
