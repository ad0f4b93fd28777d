//! Web script request abstraction
//!
//! [`WebScriptRequest`] is the read-only view a script (or a controller)
//! gets of an HTTP request. [`HttpWebScriptRequest`] implements it on top
//! of an axum request.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Query, Request},
    http::{header, HeaderMap, Uri},
};
use http_body_util::{BodyExt, Limited};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{ApiErrorKind, ApiResult};

/// Largest request body that is buffered
pub const MAX_CONTENT_LENGTH: usize = 2 * 1024 * 1024;

/// Format used when the request names none
pub const DEFAULT_FORMAT: &str = "html";

/// How a service matched the request
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Path and method matched
    #[default]
    Full,
    /// Path matched, method did not
    Verb,
    /// Only a prefix of the path matched
    Uri,
}

/// Where the requested format came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FormatStyle {
    /// No explicit format, the default applies
    #[default]
    Any,
    /// `?format=...`
    Argument,
    /// extension of the last path segment
    Extension,
}

/// The service registration a request was matched against
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceMatch {
    template: String,
    path: String,
    kind: MatchKind,
    template_vars: BTreeMap<String, String>,
}

impl ServiceMatch {
    pub fn new(template: impl Into<String>, path: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            template: template.into(),
            path: path.into(),
            kind,
            template_vars: BTreeMap::new(),
        }
    }

    /// Registration that matches every path below the root
    pub fn catch_all() -> Self {
        Self::new("/{path}", "", MatchKind::Uri)
    }

    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.template_vars.insert(name.into(), value.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The registered (static) part of the path
    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn kind(&self) -> MatchKind {
        self.kind
    }

    pub const fn template_vars(&self) -> &BTreeMap<String, String> {
        &self.template_vars
    }
}

/// The runtime that constructed a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRuntime {
    name: String,
    version: String,
}

impl ScriptRuntime {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Request body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContent {
    mime_type: Option<String>,
    bytes: Bytes,
}

impl RequestContent {
    pub fn new(mime_type: Option<String>, bytes: Bytes) -> Self {
        Self { mime_type, bytes }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Request body parsed according to its content type
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedContent {
    Json(serde_json::Value),
    Text(String),
}

/// Read access to a request as seen by a web script
pub trait WebScriptRequest {
    /// The service registration that matched this request
    fn service_match(&self) -> &ServiceMatch;

    /// Server portion of the request, e.g. `scheme://host:port`
    fn server_path(&self) -> String;

    /// Context path of the application, e.g. `/site`
    fn context_path(&self) -> &str;

    /// Path all services are mounted at, e.g. `/site/service`
    fn service_context_path(&self) -> String;

    /// Full path of the matched service, e.g. `/site/service/search`
    fn service_path(&self) -> String {
        format!(
            "{}{}",
            self.service_context_path(),
            self.service_match().path()
        )
    }

    /// Request path and query, e.g. `/site/news/story.html?view=summary`
    fn url(&self) -> String;

    /// Service specific path, e.g. `/news/story.html`
    fn path_info(&self) -> &str;

    fn query_string(&self) -> Option<&str>;

    /// Names of all parameters, each name once, in order of appearance
    fn parameter_names(&self) -> Vec<&str>;

    /// All values of the parameter, `None` if it is absent
    fn parameter_values(&self, name: &str) -> Option<Vec<&str>>;

    /// First value of the parameter, `None` if it is absent
    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_values(name)
            .and_then(|values| values.first().copied())
    }

    fn header_names(&self) -> Vec<&str>;

    fn header_values(&self, name: &str) -> Option<Vec<&str>>;

    fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|values| values.first().copied())
    }

    /// Path beyond the registered service path.
    ///
    /// Service `/search/engine` requested as `/search/engine/external`
    /// gives `/external`.
    fn extension_path(&self) -> &str {
        let path_info = self.path_info();
        path_info
            .strip_prefix(self.service_match().path())
            .unwrap_or(path_info)
    }

    fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Request body, `None` if there is none
    fn content(&self) -> Option<&RequestContent>;

    /// Request body parsed by content type: JSON for `application/json`,
    /// text for `text/*`, otherwise `None`.
    fn parse_content(&self) -> Option<ParsedContent> {
        let content = self.content()?;
        let mime_type = content
            .mime_type()
            .or_else(|| self.content_type())?
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime_type == "application/json" || mime_type.ends_with("+json") {
            serde_json::from_slice(content.bytes())
                .ok()
                .map(ParsedContent::Json)
        } else if mime_type.starts_with("text/") {
            content
                .as_text()
                .map(|text| ParsedContent::Text(text.to_string()))
        } else {
            None
        }
    }

    /// Whether the request asks to be run as guest (`?guest=true`)
    fn is_guest(&self) -> bool {
        self.parameter("guest")
            .is_some_and(|guest| guest.eq_ignore_ascii_case("true"))
    }

    /// Requested format
    fn format(&self) -> String {
        match self.format_style() {
            FormatStyle::Argument => self.parameter("format").unwrap_or(DEFAULT_FORMAT).to_string(),
            FormatStyle::Extension => path_extension(self.path_info())
                .unwrap_or(DEFAULT_FORMAT)
                .to_string(),
            FormatStyle::Any => DEFAULT_FORMAT.to_string(),
        }
    }

    fn format_style(&self) -> FormatStyle {
        if self.parameter("format").is_some_and(|f| !f.is_empty()) {
            FormatStyle::Argument
        } else if path_extension(self.path_info()).is_some() {
            FormatStyle::Extension
        } else {
            FormatStyle::Any
        }
    }

    /// Known user agent, `MSIE` or `Firefox`
    fn agent(&self) -> Option<&'static str> {
        let agent = self.header(header::USER_AGENT.as_str())?;
        if agent.contains("MSIE") {
            Some("MSIE")
        } else if agent.contains("Firefox") {
            Some("Firefox")
        } else {
            None
        }
    }

    /// JSON callback method (`?alf_callback=...`)
    fn json_callback(&self) -> Option<&str> {
        self.parameter("alf_callback")
    }

    /// Whether the client wants `200 OK` regardless of the outcome
    fn force_success_status(&self) -> bool {
        self.header("alf-force-success-response")
            .is_some_and(|force| force.eq_ignore_ascii_case("true"))
    }

    fn runtime(&self) -> &ScriptRuntime;
}

/// Extension of the last segment of `path`
fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, extension) = segment.rsplit_once('.')?;
    (!stem.is_empty() && !extension.is_empty()).then_some(extension)
}

/// [`WebScriptRequest`] over an axum request with a buffered body
#[derive(Clone, Debug)]
pub struct HttpWebScriptRequest {
    uri: Uri,
    headers: HeaderMap,
    context_path: String,
    path_info: String,
    parameters: Vec<(String, String)>,
    content: Option<RequestContent>,
    service_match: ServiceMatch,
    runtime: ScriptRuntime,
}

impl HttpWebScriptRequest {
    /// Wraps `request`, buffering its body.
    ///
    /// `context_path` is stripped from the request path to get the path info.
    pub async fn from_request(
        request: Request,
        context_path: &str,
        service_match: ServiceMatch,
        runtime: ScriptRuntime,
    ) -> ApiResult<Self> {
        let (parts, body) = request.into_parts();

        let Query(parameters) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|err| ApiErrorKind::BadRequest(format!("invalid query string: {err}")))?;

        let context_path = context_path.trim_end_matches('/').to_string();
        let path = urlencoding::decode(parts.uri.path())
            .map_err(|err| ApiErrorKind::BadRequest(format!("invalid request path: {err}")))?;
        let path_info = path
            .strip_prefix(context_path.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| ApiErrorKind::AssetNotFound(path.to_string()))?;
        let path_info = if path_info.is_empty() {
            "/".to_string()
        } else {
            path_info.to_string()
        };

        let bytes = Limited::new(body, MAX_CONTENT_LENGTH)
            .collect()
            .await
            .map_err(|err| ApiErrorKind::ReadingFromStreamFailed(err.to_string()))?
            .to_bytes();
        let content = (!bytes.is_empty()).then(|| {
            let mime_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            RequestContent::new(mime_type, bytes)
        });

        Ok(Self {
            uri: parts.uri,
            headers: parts.headers,
            context_path,
            path_info,
            parameters,
            content,
            service_match,
            runtime,
        })
    }
}

impl WebScriptRequest for HttpWebScriptRequest {
    fn service_match(&self) -> &ServiceMatch {
        &self.service_match
    }

    fn server_path(&self) -> String {
        let scheme = self
            .uri
            .scheme_str()
            .or_else(|| self.header("x-forwarded-proto"))
            .unwrap_or("http");
        let host = self
            .uri
            .authority()
            .map(|authority| authority.as_str())
            .or_else(|| self.header(header::HOST.as_str()))
            .unwrap_or("localhost");
        format!("{scheme}://{host}")
    }

    fn context_path(&self) -> &str {
        &self.context_path
    }

    fn service_context_path(&self) -> String {
        self.context_path.clone()
    }

    fn url(&self) -> String {
        self.uri
            .path_and_query()
            .map_or_else(|| self.uri.path().to_string(), ToString::to_string)
    }

    fn path_info(&self) -> &str {
        &self.path_info
    }

    fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.parameters {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<&str>> {
        let values: Vec<&str> = self
            .parameters
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect();
        (!values.is_empty()).then_some(values)
    }

    fn header_names(&self) -> Vec<&str> {
        self.headers.keys().map(|name| name.as_str()).collect()
    }

    fn header_values(&self, name: &str) -> Option<Vec<&str>> {
        let values: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        (!values.is_empty()).then_some(values)
    }

    fn content(&self) -> Option<&RequestContent> {
        self.content.as_ref()
    }

    fn runtime(&self) -> &ScriptRuntime {
        &self.runtime
    }
}
