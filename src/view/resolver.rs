use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::Range;
use tracing::debug;

use crate::{
    error::ApiResult,
    view::{PageView, RequestContext, StreamedAssetView},
};

/// The view a request was bound to
#[derive(Debug)]
pub enum ResolvedView {
    /// Render the asset through a page template
    Page(PageView),

    /// Send the asset's raw bytes
    Stream(StreamedAssetView),
}

impl ResolvedView {
    /// Renders the view, honouring `range` for raw streams.
    pub fn render(self, range: Option<Range>) -> Response {
        match self {
            Self::Page(view) => view.into_response(),
            Self::Stream(view) => view.render(range),
        }
    }
}

impl IntoResponse for ResolvedView {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

/// Binds a request to a view
#[async_trait]
pub trait ViewResolver: Send + Sync + Debug + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this resolver is responsible for the request
    fn can_handle(&self, ctx: &RequestContext) -> bool;

    async fn resolve(&self, ctx: &RequestContext) -> ApiResult<ResolvedView>;
}

/// Ordered list of view resolvers, first match wins.
#[derive(Clone, Debug, Default)]
pub struct ViewResolverChain {
    resolvers: Vec<Arc<dyn ViewResolver>>,
}

impl ViewResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `resolver` with lower priority than all resolvers added before.
    #[must_use]
    pub fn then(mut self, resolver: impl ViewResolver) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Resolves with the first resolver that can handle `ctx`, `None` if
    /// there is none.
    pub async fn resolve(&self, ctx: &RequestContext) -> ApiResult<Option<ResolvedView>> {
        let Some(resolver) = self.resolvers.iter().find(|r| r.can_handle(ctx)) else {
            debug!(view = ctx.view_name(), "no view resolver matched");
            return Ok(None);
        };

        debug!(
            view = ctx.view_name(),
            resolver = resolver.name(),
            "resolving view"
        );
        resolver.resolve(ctx).await.map(Some)
    }
}
