//! Error types

use std::{fmt, io, ops::Deref};

use abscissa_core::error::{BoxError, Context};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use displaydoc::Display;
use thiserror::Error;

pub type AppResult<T> = Result<T, Error>;
pub type ApiResult<T> = Result<T, ApiErrorKind>;

/// Kinds of errors
#[derive(Copy, Clone, Debug, Display, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Error in configuration file
    Config,

    /// Input/output error
    Io,

    /// Content repository error
    ContentRepository,

    /// Page catalog error
    PageCatalog,

    /// Module management error
    ModuleManagement,

    /// Patch error
    Patch,

    /// Web server error
    WebServer,
}

impl ErrorKind {
    /// Create an error context from this error
    pub fn context(self, source: impl Into<BoxError>) -> Context<Self> {
        Context::new(self, Some(source.into()))
    }
}

/// Error type
#[derive(Debug)]
pub struct Error(Box<Context<ErrorKind>>);

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.0)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Deref for Error {
    type Target = Context<ErrorKind>;

    fn deref(&self) -> &Context<ErrorKind> {
        &self.0
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Context::new(kind, None).into()
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(context: Context<ErrorKind>) -> Self {
        Self(Box::new(context))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io.context(err).into()
    }
}

/// Reason an asset could not be bound to a view.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum EditorialErrorKind {
    /// invalid template reference
    InvalidTemplateReference,

    /// no template and no content
    NoTemplateNoContent,
}

/// An error caused by how content was authored rather than by the system.
///
/// Carries enough context for an operator to find the offending asset.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub struct EditorialError {
    kind: EditorialErrorKind,
    section_path: String,
    asset_name: String,
    template: Option<String>,
}

impl EditorialError {
    pub const MESSAGE_KEY: &'static str = "template.none";

    pub fn invalid_template(
        section_path: impl Into<String>,
        asset_name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            kind: EditorialErrorKind::InvalidTemplateReference,
            section_path: section_path.into(),
            asset_name: asset_name.into(),
            template: Some(template.into()),
        }
    }

    pub fn no_template_no_content(
        section_path: impl Into<String>,
        asset_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: EditorialErrorKind::NoTemplateNoContent,
            section_path: section_path.into(),
            asset_name: asset_name.into(),
            template: None,
        }
    }

    pub const fn kind(&self) -> EditorialErrorKind {
        self.kind
    }

    pub const fn message_key(&self) -> &'static str {
        Self::MESSAGE_KEY
    }

    pub fn section_path(&self) -> &str {
        &self.section_path
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Full repository path of the asset, `section_path` always ends with `/`.
    pub fn asset_path(&self) -> String {
        format!("{}{}", self.section_path, self.asset_name)
    }
}

impl fmt::Display for EditorialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.template) {
            (EditorialErrorKind::InvalidTemplateReference, Some(template)) => write!(
                f,
                "Invalid template page \"{template}\" specified for {}",
                self.asset_path()
            ),
            _ => write!(f, "No template and no content for {}", self.asset_path()),
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ApiErrorKind {
    /// Internal server error: `{0}`
    InternalError(String),
    /// Bad request: `{0}`
    BadRequest(String),
    /// Path `{0}` is not allowed
    PathNotAllowed(String),
    /// Asset not found: `{0}`
    AssetNotFound(String),
    /// Route `{0}` refers to unknown page `{1}`
    InvalidRoute(String, String),
    /// Opening content failed: `{0}`
    OpeningContentFailed(String),
    /// Reading request body failed: `{0}`
    ReadingFromStreamFailed(String),
    /// `{0}`
    Editorial(#[from] EditorialError),
}

impl IntoResponse for ApiErrorKind {
    fn into_response(self) -> Response {
        let response = match self {
            Self::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {err}"),
            ),
            Self::BadRequest(err) => (StatusCode::BAD_REQUEST, format!("Bad request: {err}")),
            Self::PathNotAllowed(path) => {
                (StatusCode::FORBIDDEN, format!("Path {path} is not allowed"))
            }
            Self::AssetNotFound(path) => {
                (StatusCode::NOT_FOUND, format!("Asset not found: {path}"))
            }
            Self::InvalidRoute(route, page) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Route {route} refers to unknown page {page}"),
            ),
            Self::OpeningContentFailed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error opening content: {err}"),
            ),
            Self::ReadingFromStreamFailed(err) => (
                StatusCode::BAD_REQUEST,
                format!("Error reading request body: {err}"),
            ),
            Self::Editorial(err) => {
                tracing::warn!(
                    kind = %err.kind(),
                    asset = %err.asset_path(),
                    template = ?err.template(),
                    "editorial error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Editorial error [{}]: {err}", err.message_key()),
                )
            }
        };

        response.into_response()
    }
}
