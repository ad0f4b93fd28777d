use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use abscissa_core::prelude::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::{default_socket_address, ContentSettings, TlsSettings, WcmViewServerConfig},
    error::{AppResult, ErrorKind},
    pages::{CachingPageRegistry, PageCatalog, PageRegistry},
    repository::LocalRepository,
    state::AppState,
    view::{DynamicPageViewResolver, NamedRouteResolver, ViewResolverChain},
};

#[derive(Clone, Serialize, Deserialize, Default, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TlsOptions {
    /// Path to the TLS key file
    pub tls_key: PathBuf,

    /// Path to the TLS certificate file
    pub tls_cert: PathBuf,
}

/// Everything the web server needs, built once from the configuration
#[derive(Clone, Debug)]
pub struct ServerRuntimeContext {
    pub(crate) socket_address: SocketAddr,
    pub(crate) state: AppState,
    pub(crate) tls: Option<TlsOptions>,
}

impl ServerRuntimeContext {
    pub fn from_config(config: Arc<WcmViewServerConfig>) -> AppResult<Self> {
        let socket_address = Self::socket_address(
            config
                .server
                .listen
                .unwrap_or_else(default_socket_address),
        );

        let context_path = config.server.context_path_or_default();
        info!("Serving content below context path `{context_path}/`");

        let repository = Self::repository(&config.content)?;

        let catalog = Self::catalog(&config.content)?;

        let resolvers = Self::resolvers(catalog, config.resolver.cache_pages);

        let tls = Self::tls(config.tls.clone())?;

        Ok(Self {
            socket_address,
            state: AppState::new(Arc::new(repository), resolvers, context_path),
            tls,
        })
    }

    fn repository(content: &ContentSettings) -> AppResult<LocalRepository> {
        let content_dir = content.content_dir_or_default();
        let repository = LocalRepository::try_new(&content_dir)?;

        info!(
            "Using content repository at: `{}`",
            repository.root().display()
        );

        Ok(repository)
    }

    fn catalog(content: &ContentSettings) -> AppResult<PageCatalog> {
        let pages_file = content.pages_file_or_default();
        let catalog = PageCatalog::from_file(&pages_file)?;

        info!(
            "Loaded {} pages and {} routes from `{}`",
            catalog.len(),
            catalog.routes().len(),
            pages_file.display()
        );

        Ok(catalog)
    }

    /// Named routes first, the dynamic page resolver catches the rest.
    fn resolvers(catalog: PageCatalog, cache_pages: bool) -> ViewResolverChain {
        let routes = catalog.routes().clone();
        let catalog = Arc::new(catalog);

        let pages: Arc<dyn PageRegistry> = if cache_pages {
            info!("Page lookup caching is enabled.");
            Arc::new(CachingPageRegistry::new(catalog))
        } else {
            info!("Page lookup caching is disabled.");
            catalog
        };

        let chain = ViewResolverChain::new()
            .then(NamedRouteResolver::new(routes, Arc::clone(&pages)))
            .then(DynamicPageViewResolver::new(pages));

        debug!(resolvers = ?chain.names(), "Built view resolver chain.");

        chain
    }

    fn tls(tls_settings: TlsSettings) -> AppResult<Option<TlsOptions>> {
        let tls = if tls_settings.is_disabled() {
            info!("TLS is disabled.");
            None
        } else {
            let (Some(tls_key), Some(tls_cert)) = (tls_settings.tls_key, tls_settings.tls_cert)
            else {
                return Err(ErrorKind::Config
                    .context("TLS is enabled but no key or certificate was provided.")
                    .into());
            };
            info!("TLS is enabled.");

            Some(TlsOptions { tls_key, tls_cert })
        };

        debug!(?tls, "Loaded TLS settings.");

        Ok(tls)
    }

    fn socket_address(address: SocketAddr) -> SocketAddr {
        debug!(?address, "Parsed socket address.");

        address
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config(cache_pages: bool) -> WcmViewServerConfig {
        let mut config = WcmViewServerConfig::default();
        config.content.content_dir = Some(Path::new("tests/fixtures/test_data/content").into());
        config.server.context_path = Some("/site/".into());
        config.resolver.cache_pages = cache_pages;
        config
    }

    #[test]
    fn test_context_from_config_passes() {
        for cache_pages in [false, true] {
            let ctx = ServerRuntimeContext::from_config(Arc::new(config(cache_pages))).unwrap();
            assert_eq!(ctx.state().context_path(), "/site");
            assert_eq!(
                ctx.state().resolvers().names(),
                vec!["named-route", "dynamic-page"]
            );
            assert!(ctx.tls.is_none());
        }
    }

    #[test]
    fn test_missing_content_dir_fails_passes() {
        let mut config = config(false);
        config.content.content_dir = Some("tests/fixtures/no_content_here".into());
        assert!(ServerRuntimeContext::from_config(Arc::new(config)).is_err());
    }

    #[test]
    fn test_tls_without_key_fails_passes() {
        let mut config = config(false);
        config.tls.disable_tls = false;
        config.tls.tls_cert = Some("cert.pem".into());
        assert!(ServerRuntimeContext::from_config(Arc::new(config)).is_err());
    }
}
