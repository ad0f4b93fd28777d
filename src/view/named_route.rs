use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::{ApiErrorKind, ApiResult},
    pages::PageRegistry,
    view::{PageView, RequestContext, ResolvedView, ViewResolver},
};

/// Maps fixed request paths straight to pages, e.g. `/search`.
#[derive(Clone, Debug)]
pub struct NamedRouteResolver {
    routes: BTreeMap<String, String>,
    pages: Arc<dyn PageRegistry>,
}

impl NamedRouteResolver {
    pub fn new(routes: BTreeMap<String, String>, pages: Arc<dyn PageRegistry>) -> Self {
        Self { routes, pages }
    }
}

#[async_trait]
impl ViewResolver for NamedRouteResolver {
    fn name(&self) -> &'static str {
        "named-route"
    }

    fn can_handle(&self, ctx: &RequestContext) -> bool {
        self.routes.contains_key(ctx.view_name())
    }

    async fn resolve(&self, ctx: &RequestContext) -> ApiResult<ResolvedView> {
        let route = ctx.view_name();
        let Some(page_id) = self.routes.get(route) else {
            return Err(ApiErrorKind::InternalError(format!(
                "no route for view `{route}`"
            )));
        };

        let page = self
            .pages
            .lookup_template(page_id)
            .ok_or_else(|| ApiErrorKind::InvalidRoute(route.to_string(), page_id.clone()))?;

        Ok(ResolvedView::Page(PageView::new(page_id.clone(), page)))
    }
}
