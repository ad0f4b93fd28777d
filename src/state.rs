use std::sync::Arc;

use crate::{
    repository::ContentRepository, view::ViewResolverChain, webscript::ScriptRuntime,
};

/// Shared state handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    repository: Arc<dyn ContentRepository>,
    resolvers: Arc<ViewResolverChain>,
    context_path: String,
    runtime: ScriptRuntime,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        resolvers: ViewResolverChain,
        context_path: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            resolvers: Arc::new(resolvers),
            context_path: context_path.into(),
            runtime: ScriptRuntime::default(),
        }
    }

    pub fn repository(&self) -> &dyn ContentRepository {
        self.repository.as_ref()
    }

    pub fn resolvers(&self) -> &ViewResolverChain {
        &self.resolvers
    }

    /// Prefix all content paths are served below, empty for the root
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub const fn runtime(&self) -> &ScriptRuntime {
        &self.runtime
    }
}
