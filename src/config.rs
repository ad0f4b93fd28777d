//! `WcmViewServer` Config
//!
//! See instructions in `commands.rs` to specify the path to your
//! application's configuration file and/or command-line options
//! for specifying it.

use std::{
    fs::{self},
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Args, Parser};
use conflate::Merge;
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ErrorKind};

/// Default file name of the page catalog inside the content directory
pub const DEFAULT_PAGES_FILE: &str = "pages.toml";

/// `WcmViewServer` Configuration
#[derive(Clone, Debug, Deserialize, Serialize, Default, Merge, Parser)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct WcmViewServerConfig {
    /// Server settings
    #[command(flatten)]
    pub server: ConnectionSettings,

    /// Content settings
    #[command(flatten)]
    pub content: ContentSettings,

    /// View resolver settings
    #[command(flatten)]
    pub resolver: ResolverSettings,

    /// Optional TLS Settings
    #[command(flatten)]
    pub tls: TlsSettings,
}

/// Overwrite the left value with the right value if the right value is `Some`.
fn overwrite_with_some<T>(left: &mut Option<T>, right: Option<T>) {
    if right.is_some() {
        *left = right;
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Parser)]
#[serde(deny_unknown_fields, default, rename_all = "kebab-case")]
pub struct ConnectionSettings {
    /// IP address and port to bind to
    #[arg(long, env = "WCM_VIEW_SERVER_LISTEN")]
    #[merge(strategy = overwrite_with_some)]
    pub listen: Option<SocketAddr>,

    /// Path prefix content is served below, e.g. `/site`
    #[arg(long, env = "WCM_VIEW_SERVER_CONTEXT_PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[merge(strategy = overwrite_with_some)]
    pub context_path: Option<String>,
}

impl ConnectionSettings {
    /// Context path without trailing slash, empty for the root
    pub fn context_path_or_default(&self) -> String {
        let path = self.context_path.as_deref().unwrap_or_default().trim();
        let path = path.trim_end_matches('/');
        if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            listen: Some(default_socket_address()),
            context_path: None,
        }
    }
}

pub(crate) fn default_socket_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Parser)]
#[serde(deny_unknown_fields, default, rename_all = "kebab-case")]
pub struct ContentSettings {
    /// Path to the content repository
    #[arg(long = "content-dir", env = "WCM_VIEW_SERVER_CONTENT_DIR")]
    #[merge(strategy = overwrite_with_some)]
    pub content_dir: Option<PathBuf>,

    /// Path to the page catalog (default: "<content directory>/pages.toml")
    #[arg(long, env = "WCM_VIEW_SERVER_PAGES_FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[merge(strategy = overwrite_with_some)]
    pub pages_file: Option<PathBuf>,
}

pub(crate) fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

impl ContentSettings {
    pub fn content_dir_or_default(&self) -> PathBuf {
        self.content_dir.clone().unwrap_or_else(default_content_dir)
    }

    pub fn pages_file_or_default(&self) -> PathBuf {
        self.pages_file
            .clone()
            .unwrap_or_else(|| self.content_dir_or_default().join(DEFAULT_PAGES_FILE))
    }
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            content_dir: Some(default_content_dir()),
            pages_file: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, Merge, Parser)]
#[serde(deny_unknown_fields, default, rename_all = "kebab-case")]
pub struct ResolverSettings {
    /// Remember page lookups per template
    #[arg(long)]
    #[merge(strategy = conflate::bool::overwrite_false)]
    pub cache_pages: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Args)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
#[group(id = "tls")]
pub struct TlsSettings {
    /// Disable TLS support
    // `--tls` clears this flag, TLS stays off by default
    #[arg(
        long = "tls",
        action=ArgAction::SetFalse,
        default_value = "true",
        help = "Enable TLS support",
        requires = "tls_key",
        requires = "tls_cert"
    )]
    #[serde(default = "default_true")]
    #[merge(strategy = conflate::bool::overwrite_true)]
    pub disable_tls: bool,

    /// Optional path to the TLS key file
    #[arg(long, requires = "disable_tls", env = "WCM_VIEW_SERVER_TLS_KEY")]
    #[merge(strategy = overwrite_with_some)]
    pub tls_key: Option<PathBuf>,

    /// Optional path to the TLS certificate file
    #[arg(long, requires = "disable_tls", env = "WCM_VIEW_SERVER_TLS_CERT")]
    #[merge(strategy = overwrite_with_some)]
    pub tls_cert: Option<PathBuf>,
}

impl TlsSettings {
    pub const fn is_disabled(&self) -> bool {
        self.disable_tls
    }
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            disable_tls: true,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl WcmViewServerConfig {
    pub fn from_file(pth: &Path) -> AppResult<Self> {
        let s = fs::read_to_string(pth)?;

        let config: Self = toml::from_str(&s).map_err(|err| {
            ErrorKind::Config.context(format!(
                "Could not parse file: {} due to {}",
                pth.to_string_lossy(),
                err
            ))
        })?;

        Ok(config)
    }

    pub fn to_file(&self, pth: &Path) -> AppResult<()> {
        let toml_string = toml::to_string(&self).map_err(|err| {
            ErrorKind::Config.context(format!(
                "Could not serialize configuration to toml due to {}",
                err
            ))
        })?;

        fs::write(pth, toml_string)?;

        Ok(())
    }
}
