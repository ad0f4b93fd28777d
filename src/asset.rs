//! Content assets as seen by the delivery tier.
//!
//! An [`Asset`] is owned by a content repository and is read-only here. Its
//! raw bytes are only opened on demand through [`Asset::content_stream`],
//! and the resulting [`ContentStream`] belongs to whoever asked for it.

use std::{
    fmt,
    io::{self, Cursor},
    path::PathBuf,
};

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncSeek};

use crate::error::{ApiErrorKind, ApiResult};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Opaque identifier of an asset in the content repository
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The section (folder) an asset lives in.
///
/// A section path always starts and ends with `/`, the root section is `/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    path: String,
}

impl Section {
    pub fn new(path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim_matches('/');
        let path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        Self { path }
    }

    pub fn root() -> Self {
        Self::new("/")
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::root()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ContentData {
    File(PathBuf),
    Bytes(Bytes),
}

/// Where the raw bytes of an asset can be read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSource {
    data: ContentData,
    mime_type: String,
}

impl ContentSource {
    pub fn file(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            data: ContentData::File(path.into()),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: ContentData::Bytes(bytes.into()),
            mime_type: mime_type.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Opens the content. A file that disappeared in the meantime counts as
    /// no content at all.
    pub async fn open(&self) -> io::Result<Option<ContentStream>> {
        match &self.data {
            ContentData::File(path) => {
                let file = match tokio::fs::File::open(path).await {
                    Ok(file) => file,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                    Err(err) => return Err(err),
                };
                let length = file.metadata().await?.len();
                Ok(Some(ContentStream::new(
                    file,
                    length,
                    self.mime_type.clone(),
                )))
            }
            ContentData::Bytes(bytes) => Ok(Some(ContentStream::new(
                Cursor::new(bytes.clone()),
                bytes.len() as u64,
                self.mime_type.clone(),
            ))),
        }
    }
}

/// Anything a content stream can be read from
pub trait ContentReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ContentReader for T {}

/// An opened content stream together with its mime type.
///
/// Dropping the stream releases the underlying resource.
pub struct ContentStream {
    reader: Box<dyn ContentReader>,
    length: u64,
    mime_type: String,
}

impl ContentStream {
    pub fn new(reader: impl ContentReader + 'static, length: u64, mime_type: String) -> Self {
        Self {
            reader: Box::new(reader),
            length,
            mime_type,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub const fn length(&self) -> u64 {
        self.length
    }

    pub fn into_parts(self) -> (Box<dyn ContentReader>, u64, String) {
        (self.reader, self.length, self.mime_type)
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("length", &self.length)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// A content item being rendered
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    id: AssetId,
    name: String,
    section: Section,
    title: Option<String>,
    template: Option<String>,
    content: Option<ContentSource>,
}

impl Asset {
    /// Creates an asset without template or content. The id defaults to the
    /// asset path relative to the repository root.
    pub fn new(section: Section, name: impl Into<String>) -> Self {
        let name = name.into();
        let id = AssetId::new(format!("{}{}", section.path(), name).trim_start_matches('/'));
        Self {
            id,
            name,
            section,
            title: None,
            template: None,
            content: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: AssetId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: Option<ContentSource>) -> Self {
        self.content = content;
        self
    }

    pub const fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn section(&self) -> &Section {
        &self.section
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Template the asset declares for itself, if any
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Full path of the asset inside the repository
    pub fn path(&self) -> String {
        format!("{}{}", self.section.path(), self.name)
    }

    pub const fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Opens the raw content of the asset, `None` if it has none.
    pub async fn content_stream(&self) -> ApiResult<Option<ContentStream>> {
        let Some(content) = &self.content else {
            return Ok(None);
        };

        content.open().await.map_err(|err| {
            ApiErrorKind::OpeningContentFailed(format!("{}: {err}", self.path()))
        })
    }
}

/// Guesses a mime type from the file extension of `name`.
pub fn guess_mime_type(name: &str) -> &'static str {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => DEFAULT_MIME_TYPE,
    }
}
