//! View resolution
//!
//! A request is bound to a view by asking an ordered list of
//! [`ViewResolver`]s. The first resolver that can handle the
//! [`RequestContext`] decides; the dynamic page resolver is the catch-all at
//! the end of the list.

mod dynamic_page;
mod named_route;
mod page_view;
mod request_context;
mod resolver;
mod streamed_asset;

pub use self::{
    dynamic_page::{DynamicPageViewResolver, VIEW_PARAMETER},
    named_route::NamedRouteResolver,
    page_view::{PageView, PAGE_ID_HEADER},
    request_context::RequestContext,
    resolver::{ResolvedView, ViewResolver, ViewResolverChain},
    streamed_asset::{StreamedAssetView, ASSET_ID_HEADER},
};
