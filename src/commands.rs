//! `WcmViewServer` Subcommands
//!
//! - `serve`: serve content through the view resolvers
//! - `module`: inspect or install module details in a WAR
//! - `patch`: apply repository patches
//! - `--version`: print application version
//!
//! See the `impl Configurable` below for how to specify the path to the
//! application's configuration file.

mod module;
mod patch;
mod serve;

use crate::{
    commands::{module::ModuleCmd, patch::PatchCmd, serve::ServeCmd},
    config::WcmViewServerConfig,
};
use abscissa_core::{
    config::Override, tracing::info, Command, Configurable, FrameworkError, Runnable,
};
use clap::builder::{
    styling::{AnsiColor, Effects},
    Styles,
};
use std::path::PathBuf;

/// `WcmViewServer` Configuration Filename
pub const CONFIG_FILE: &str = "wcm_view_server.toml";

/// `WcmViewServer` Subcommands
/// Subcommands need to be listed in an enum.
#[derive(clap::Parser, Command, Debug, Runnable)]
pub enum WcmViewServerCmd {
    /// Start a server with the specified configuration
    Serve(ServeCmd),

    /// Show or install module details in a WAR
    Module(ModuleCmd),

    /// Apply a repository patch
    Patch(PatchCmd),
}

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Red.on_default() | Effects::BOLD)
        .usage(AnsiColor::Red.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

/// Entry point for the application. It needs to be a struct to allow using subcommands!
#[derive(clap::Parser, Command, Debug)]
#[command(author, about, name="wcm-view-server", styles=styles(), version = env!("CARGO_PKG_VERSION"))]
pub struct EntryPoint {
    #[command(subcommand)]
    cmd: WcmViewServerCmd,

    /// Enable verbose logging
    #[arg(short, long, global = true, env = "WCM_VIEW_SERVER_VERBOSE")]
    pub verbose: bool,

    /// Use the specified config file
    #[arg(short, long, global = true, env = "WCM_VIEW_SERVER_CONFIG_PATH")]
    pub config: Option<String>,
}

impl Runnable for EntryPoint {
    fn run(&self) {
        self.cmd.run();
    }
}

/// This trait allows you to define how application configuration is loaded.
impl Configurable<WcmViewServerConfig> for EntryPoint {
    /// Location of the configuration file
    fn config_path(&self) -> Option<PathBuf> {
        // Early return if no config file was provided
        let Some(filename) = self.config.as_ref().map(PathBuf::from) else {
            info!("No configuration file provided.");
            return None;
        };

        if filename.exists() {
            info!("Using configuration file: `{filename:?}`");
            Some(filename)
        } else {
            info!("Provided configuration file not found. Trying default.");
            // a missing default file is a hard error
            Some(PathBuf::from(CONFIG_FILE))
        }
    }

    /// Apply changes to the config after it's been loaded, e.g. overriding
    /// values in a config file using command-line options.
    fn process_config(
        &self,
        config: WcmViewServerConfig,
    ) -> Result<WcmViewServerConfig, FrameworkError> {
        match &self.cmd {
            WcmViewServerCmd::Serve(cmd) => cmd.override_config(config),
            _ => Ok(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::EntryPoint;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        EntryPoint::command().debug_assert();
    }
}
