use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    asset::Asset,
    error::{ApiErrorKind, ApiResult, EditorialError},
    pages::PageRegistry,
    view::{PageView, RequestContext, ResolvedView, StreamedAssetView, ViewResolver},
};

/// Query parameter that overrides the asset's own template
pub const VIEW_PARAMETER: &str = "view";

/// Renders an asset with the template it asks for.
///
/// Catch-all for every request that carries an asset, so it belongs at the
/// end of the resolver chain. The template comes from the `view` parameter
/// or else from the asset itself; without any template the raw content is
/// streamed.
#[derive(Clone, Debug)]
pub struct DynamicPageViewResolver {
    pages: Arc<dyn PageRegistry>,
}

impl DynamicPageViewResolver {
    pub fn new(pages: Arc<dyn PageRegistry>) -> Self {
        Self { pages }
    }

    /// Template for `asset`: a non-empty `view` parameter wins over the
    /// asset's declared template.
    fn template<'a>(ctx: &'a RequestContext, asset: &'a Asset) -> Option<&'a str> {
        ctx.parameter(VIEW_PARAMETER)
            .filter(|view| !view.is_empty())
            .or_else(|| asset.template())
    }

    async fn stream_view(asset: &Asset) -> ApiResult<ResolvedView> {
        let Some(stream) = asset.content_stream().await? else {
            return Err(EditorialError::no_template_no_content(
                asset.section().path(),
                asset.name(),
            )
            .into());
        };

        debug!(id = %asset.id(), mime_type = stream.mime_type(), "streaming raw asset");
        Ok(ResolvedView::Stream(StreamedAssetView::new(
            asset.id().clone(),
            stream,
        )))
    }
}

#[async_trait]
impl ViewResolver for DynamicPageViewResolver {
    fn name(&self) -> &'static str {
        "dynamic-page"
    }

    fn can_handle(&self, ctx: &RequestContext) -> bool {
        ctx.asset().is_some()
    }

    async fn resolve(&self, ctx: &RequestContext) -> ApiResult<ResolvedView> {
        let Some(asset) = ctx.asset() else {
            return Err(ApiErrorKind::InternalError(format!(
                "no asset bound to view `{}`",
                ctx.view_name()
            )));
        };

        let Some(template) = Self::template(ctx, asset) else {
            return Self::stream_view(asset).await;
        };

        let page = self.pages.lookup_template(template).ok_or_else(|| {
            EditorialError::invalid_template(asset.section().path(), asset.name(), template)
        })?;

        debug!(id = %asset.id(), template, "resolved page view");
        Ok(ResolvedView::Page(PageView::new(template, page)))
    }
}
