use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A namespace qualified name, written `{namespace-uri}local-name`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace_uri: Cow<'static, str>,
    local_name: Cow<'static, str>,
}

impl QName {
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: Cow::Owned(namespace_uri.into()),
            local_name: Cow::Owned(local_name.into()),
        }
    }

    pub const fn from_static(namespace_uri: &'static str, local_name: &'static str) -> Self {
        Self {
            namespace_uri: Cow::Borrowed(namespace_uri),
            local_name: Cow::Borrowed(local_name),
        }
    }

    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
    }
}

impl FromStr for QName {
    type Err = String;

    /// Accepts `{uri}local` and a bare `local` in the default namespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace_uri, local_name) = match s.strip_prefix('{') {
            Some(rest) => rest
                .split_once('}')
                .ok_or_else(|| format!("missing `}}` in qualified name `{s}`"))?,
            None => ("", s),
        };

        if local_name.is_empty() {
            return Err(format!("qualified name `{s}` has no local name"));
        }

        Ok(Self::new(namespace_uri, local_name))
    }
}

impl TryFrom<String> for QName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.to_string()
    }
}

/// Names from the content model
pub mod content_model {
    use super::QName;

    pub const CONTENT_MODEL_1_0_URI: &str = "http://www.alfresco.org/model/content/1.0";

    pub const TYPE_CMOBJECT: QName = QName::from_static(CONTENT_MODEL_1_0_URI, "cmobject");
}
