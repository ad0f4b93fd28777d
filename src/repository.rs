use std::{
    collections::BTreeMap,
    fmt::Debug,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    asset::{guess_mime_type, Asset, AssetId, ContentSource, Section},
    error::{ApiErrorKind, ApiResult, AppResult, ErrorKind},
};

/// Name of the per-section metadata file
pub const SECTION_METADATA_FILE: &str = "section.toml";

/// Asset served when a section itself is requested
pub const SECTION_INDEX: &str = "index.html";

/// Files that live next to content but are never served
const HIDDEN_FILES: [&str; 2] = [SECTION_METADATA_FILE, "pages.toml"];

/// Read access to the content repository
#[async_trait]
pub trait ContentRepository: Send + Sync + Debug + 'static {
    /// Looks up the asset at `path`, `None` if there is no such asset.
    async fn asset_at(&self, path: &str) -> ApiResult<Option<Asset>>;
}

#[async_trait]
impl<R: ContentRepository + ?Sized> ContentRepository for Arc<R> {
    async fn asset_at(&self, path: &str) -> ApiResult<Option<Asset>> {
        (**self).asset_at(path).await
    }
}

/// Splits a request path into its section and asset name.
///
/// A path ending in `/` addresses the section index.
pub(crate) fn split_asset_path(path: &str) -> ApiResult<(Vec<String>, String)> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut parts: Vec<String> = Vec::new();

    for part in trimmed.split('/') {
        match part {
            ".." | "." => return Err(ApiErrorKind::PathNotAllowed(path.to_string())),
            part if part.contains('\\') => {
                return Err(ApiErrorKind::PathNotAllowed(path.to_string()))
            }
            part => parts.push(part.to_string()),
        }
    }

    // `split` always yields at least one element
    let name = parts.pop().unwrap_or_default();
    if parts.iter().any(String::is_empty) {
        return Err(ApiErrorKind::PathNotAllowed(path.to_string()));
    }

    let name = if name.is_empty() {
        SECTION_INDEX.to_string()
    } else {
        name
    };

    Ok((parts, name))
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
struct SectionMetadata {
    assets: BTreeMap<String, AssetMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
struct AssetMetadata {
    id: Option<String>,
    title: Option<String>,
    template: Option<String>,
    mime_type: Option<String>,
}

/// Content repository backed by a directory tree.
///
/// Every directory is a section, every file an asset. A section may carry a
/// `section.toml` with per-asset metadata; assets listed there but missing
/// on disk exist without content.
#[derive(Clone, Debug)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn try_new(root: &Path) -> AppResult<Self> {
        if !root.is_dir() {
            return Err(ErrorKind::ContentRepository
                .context(format!(
                    "Content directory `{}` does not exist or is not a directory",
                    root.display()
                ))
                .into());
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn section_metadata(&self, dir: &Path) -> ApiResult<SectionMetadata> {
        let path = dir.join(SECTION_METADATA_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(SectionMetadata::default())
            }
            Err(err) => {
                return Err(ApiErrorKind::InternalError(format!(
                    "could not read `{}`: {err}",
                    path.display()
                )))
            }
        };

        toml::from_str(&content).map_err(|err| {
            ApiErrorKind::InternalError(format!("could not parse `{}`: {err}", path.display()))
        })
    }
}

#[async_trait]
impl ContentRepository for LocalRepository {
    async fn asset_at(&self, path: &str) -> ApiResult<Option<Asset>> {
        let (mut sections, mut name) = split_asset_path(path)?;

        let mut dir = sections.iter().fold(self.root.clone(), |dir, s| dir.join(s));
        if name != SECTION_INDEX && dir.join(&name).is_dir() {
            dir = dir.join(&name);
            sections.push(name);
            name = SECTION_INDEX.to_string();
        }

        if name.starts_with('.') || HIDDEN_FILES.contains(&name.as_str()) {
            debug!("[asset_at] hidden file requested: {path}");
            return Ok(None);
        }

        let file = dir.join(&name);
        let metadata = self.section_metadata(&dir).await?;
        let asset_metadata = metadata.assets.get(&name).cloned();

        if asset_metadata.is_none() && !file.is_file() {
            debug!("[asset_at] no asset at `{path}`");
            return Ok(None);
        }

        let meta = asset_metadata.unwrap_or_default();
        let content = file.is_file().then(|| {
            let mime_type = meta
                .mime_type
                .clone()
                .unwrap_or_else(|| guess_mime_type(&name).to_string());
            ContentSource::file(&file, mime_type)
        });

        let mut asset = Asset::new(Section::new(sections.join("/")), name)
            .with_title(meta.title)
            .with_template(meta.template)
            .with_content(content);
        if let Some(id) = meta.id {
            asset = asset.with_id(AssetId::new(id));
        }

        debug!(id = %asset.id(), template = ?asset.template(), "[asset_at] found asset");

        Ok(Some(asset))
    }
}

/// Content repository held in memory, keyed by asset path
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    assets: BTreeMap<String, Asset>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.insert(asset);
        self
    }

    pub fn insert(&mut self, asset: Asset) {
        let _ = self.assets.insert(asset.path(), asset);
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn asset_at(&self, path: &str) -> ApiResult<Option<Asset>> {
        let (sections, name) = split_asset_path(path)?;
        let key = format!("{}{name}", Section::new(sections.join("/")).path());
        Ok(self.assets.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> LocalRepository {
        let root = Path::new("tests")
            .join("fixtures")
            .join("test_data")
            .join("content");
        LocalRepository::try_new(&root).unwrap()
    }

    #[rstest]
    #[case("/", vec![], "index.html")]
    #[case("/news/", vec!["news"], "index.html")]
    #[case("/news/story.html", vec!["news"], "story.html")]
    #[case("about.html", vec![], "about.html")]
    fn test_split_asset_path_passes(
        #[case] path: &str,
        #[case] sections: Vec<&str>,
        #[case] name: &str,
    ) {
        let (s, n) = split_asset_path(path).unwrap();
        assert_eq!(s, sections);
        assert_eq!(n, name);
    }

    #[rstest]
    #[case("/../secret")]
    #[case("/news/../../etc/passwd")]
    #[case("/news/./story.html")]
    #[case("/news//story.html")]
    #[case("/news\\story.html")]
    fn test_split_asset_path_rejects_traversal_passes(#[case] path: &str) {
        assert!(matches!(
            split_asset_path(path),
            Err(ApiErrorKind::PathNotAllowed(_))
        ));
    }

    #[test]
    fn test_local_repository_requires_directory_passes() {
        assert!(LocalRepository::try_new(Path::new("tests/fixtures/not-here")).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn test_asset_with_metadata_passes(repository: LocalRepository) {
        let asset = repository
            .asset_at("/news/story.html")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(asset.id().as_str(), "story-0001");
        assert_eq!(asset.section().path(), "/news/");
        assert_eq!(asset.name(), "story.html");
        assert_eq!(asset.template(), Some("article"));
        assert_eq!(asset.title(), Some("Local team wins"));
        assert!(asset.has_content());
    }

    #[rstest]
    #[tokio::test]
    async fn test_plain_file_asset_passes(repository: LocalRepository) {
        let asset = repository.asset_at("/logo.svg").await.unwrap().unwrap();

        assert_eq!(asset.id().as_str(), "logo.svg");
        assert_eq!(asset.template(), None);
        let stream = asset.content_stream().await.unwrap().unwrap();
        assert_eq!(stream.mime_type(), "image/svg+xml");
    }

    #[rstest]
    #[tokio::test]
    async fn test_virtual_asset_has_no_content_passes(repository: LocalRepository) {
        let asset = repository
            .asset_at("/news/placeholder")
            .await
            .unwrap()
            .unwrap();

        assert!(!asset.has_content());
        assert_eq!(asset.template(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_section_requests_resolve_to_index_passes(repository: LocalRepository) {
        let with_slash = repository.asset_at("/news/").await.unwrap().unwrap();
        let without_slash = repository.asset_at("/news").await.unwrap().unwrap();

        assert_eq!(with_slash.name(), SECTION_INDEX);
        assert_eq!(with_slash.section().path(), "/news/");
        assert_eq!(with_slash, without_slash);
        assert_eq!(with_slash.template(), Some("sectionpage"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_and_hidden_assets_passes(repository: LocalRepository) {
        assert!(repository.asset_at("/nope.html").await.unwrap().is_none());
        assert!(repository
            .asset_at("/news/section.toml")
            .await
            .unwrap()
            .is_none());
        assert!(repository.asset_at("/pages.toml").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_repository_passes() {
        let repository = MemoryRepository::new()
            .with_asset(Asset::new(Section::new("/a/"), "b.html"))
            .with_asset(Asset::new(Section::root(), SECTION_INDEX));

        assert!(repository.asset_at("/a/b.html").await.unwrap().is_some());
        assert!(repository.asset_at("/").await.unwrap().is_some());
        assert!(repository.asset_at("/a/c.html").await.unwrap().is_none());
    }
}
