//! Page (template) registry
//!
//! A page names a presentation template together with its layout metadata.
//! The registry is looked up by template identifier, the catalog also knows
//! fixed routes that map a request path directly to a page.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::Path,
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppResult, ErrorKind};

/// A presentation template and its layout metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Page {
    /// Set from the catalog key
    #[serde(default, skip_deserializing)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Template file used by the renderer
    pub template_instance: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Page {
    pub fn new(id: impl Into<String>, template_instance: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            template_instance: template_instance.into(),
            layout: None,
            properties: BTreeMap::new(),
        }
    }
}

/// Lookup of pages by template identifier
pub trait PageRegistry: Send + Sync + Debug + 'static {
    fn lookup_template(&self, id: &str) -> Option<Arc<Page>>;
}

impl<R: PageRegistry + ?Sized> PageRegistry for Arc<R> {
    fn lookup_template(&self, id: &str) -> Option<Arc<Page>> {
        (**self).lookup_template(id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
struct CatalogFile {
    pages: BTreeMap<String, Page>,
    routes: BTreeMap<String, String>,
}

/// Page registry loaded from a TOML catalog:
///
/// ```toml
/// [pages.article]
/// title = "Article"
/// template-instance = "templates/article.ftl"
/// layout = "two-column"
///
/// [routes]
/// "/search" = "search"
/// ```
#[derive(Clone, Debug, Default)]
pub struct PageCatalog {
    pages: BTreeMap<String, Arc<Page>>,
    routes: BTreeMap<String, String>,
}

impl PageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(pth: &Path) -> AppResult<Self> {
        let s = fs::read_to_string(pth).map_err(|err| {
            ErrorKind::PageCatalog.context(format!(
                "Could not read page catalog `{}`: {err}",
                pth.display()
            ))
        })?;

        let catalog = Self::from_toml(&s).map_err(|err| {
            ErrorKind::PageCatalog.context(format!(
                "Could not parse page catalog `{}`: {err}",
                pth.display()
            ))
        })?;

        debug!(
            pages = catalog.pages.len(),
            routes = catalog.routes.len(),
            "Loaded page catalog."
        );

        Ok(catalog)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(s)?;
        let pages = file
            .pages
            .into_iter()
            .map(|(id, mut page)| {
                page.id.clone_from(&id);
                (id, Arc::new(page))
            })
            .collect();

        Ok(Self {
            pages,
            routes: file.routes,
        })
    }

    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        let _ = self.pages.insert(page.id.clone(), Arc::new(page));
        self
    }

    #[must_use]
    pub fn with_route(mut self, path: impl Into<String>, page_id: impl Into<String>) -> Self {
        let _ = self.routes.insert(path.into(), page_id.into());
        self
    }

    /// Fixed routes, request path to page id
    pub const fn routes(&self) -> &BTreeMap<String, String> {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageRegistry for PageCatalog {
    fn lookup_template(&self, id: &str) -> Option<Arc<Page>> {
        self.pages.get(id).cloned()
    }
}

/// Remembers successful lookups of the wrapped registry.
///
/// Misses are never cached so a page added later becomes visible.
#[derive(Debug)]
pub struct CachingPageRegistry<R> {
    inner: R,
    cache: RwLock<HashMap<String, Arc<Page>>>,
}

impl<R: PageRegistry> CachingPageRegistry<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.read().map_or(0, |cache| cache.len())
    }
}

impl<R: PageRegistry> PageRegistry for CachingPageRegistry<R> {
    fn lookup_template(&self, id: &str) -> Option<Arc<Page>> {
        if let Some(page) = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(id).cloned())
        {
            return Some(page);
        }

        let page = self.inner.lookup_template(id)?;
        if let Ok(mut cache) = self.cache.write() {
            let _ = cache.insert(id.to_string(), Arc::clone(&page));
        }
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pages_file() -> PathBuf {
        Path::new("tests")
            .join("fixtures")
            .join("test_data")
            .join("content")
            .join("pages.toml")
    }

    #[rstest]
    fn test_catalog_from_file_passes(pages_file: PathBuf) {
        let catalog = PageCatalog::from_file(&pages_file).unwrap();

        let article = catalog.lookup_template("article").unwrap();
        assert_eq!(article.id, "article");
        assert_eq!(article.template_instance, "templates/article.ftl");
        assert_eq!(article.layout.as_deref(), Some("two-column"));

        assert!(catalog.lookup_template("summary").is_some());
        assert!(catalog.lookup_template("missing").is_none());
        assert_eq!(
            catalog.routes().get("/search").map(String::as_str),
            Some("search")
        );
    }

    #[test]
    fn test_catalog_rejects_unknown_fields_passes() {
        let toml_string = r#"
[pages.article]
template-instance = "article.ftl"
colour = "blue"
"#;
        assert!(PageCatalog::from_toml(toml_string).is_err());
    }

    #[test]
    fn test_missing_catalog_file_fails_passes() {
        assert!(PageCatalog::from_file(Path::new("tests/fixtures/none.toml")).is_err());
    }

    #[derive(Debug, Default)]
    struct CountingRegistry {
        catalog: PageCatalog,
        lookups: std::sync::atomic::AtomicUsize,
    }

    impl PageRegistry for CountingRegistry {
        fn lookup_template(&self, id: &str) -> Option<Arc<Page>> {
            let _ = self
                .lookups
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.catalog.lookup_template(id)
        }
    }

    #[test]
    fn test_caching_registry_only_caches_hits_passes() {
        let inner = Arc::new(CountingRegistry {
            catalog: PageCatalog::new().with_page(Page::new("article", "article.ftl")),
            ..CountingRegistry::default()
        });
        let registry = CachingPageRegistry::new(Arc::clone(&inner));

        assert!(registry.lookup_template("article").is_some());
        assert!(registry.lookup_template("article").is_some());
        assert!(registry.lookup_template("missing").is_none());
        assert!(registry.lookup_template("missing").is_none());

        assert_eq!(registry.cached(), 1);
        assert_eq!(
            inner.lookups.load(std::sync::atomic::Ordering::SeqCst),
            3
        );
    }
}
