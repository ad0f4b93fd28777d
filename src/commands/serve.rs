//! `serve` subcommand

use std::time::Duration;

use abscissa_core::{
    config::Override,
    status_err,
    tracing::{debug, info},
    Application, Command, FrameworkError, Runnable, Shutdown,
};
use clap::Parser;
use conflate::Merge;

use crate::{
    config::WcmViewServerConfig, context::ServerRuntimeContext, error::AppResult,
    prelude::WCM_VIEW_SERVER_APP, web::start_web_server,
};

/// `serve` subcommand
#[derive(Command, Debug, Parser)]
pub struct ServeCmd {
    /// Server settings
    #[clap(flatten)]
    context: WcmViewServerConfig,
}

impl Override<WcmViewServerConfig> for ServeCmd {
    fn override_config(
        &self,
        mut config: WcmViewServerConfig,
    ) -> Result<WcmViewServerConfig, FrameworkError> {
        debug!(?config, "ServerConfig before merge.");
        debug!(?self.context, "Command context from CLI.");

        // Command-line values have precedence over the config file
        config.merge(self.context.clone());

        Ok(config)
    }
}

impl Runnable for ServeCmd {
    /// Start the application.
    fn run(&self) {
        if let Err(tokio_err) = abscissa_tokio::run(&WCM_VIEW_SERVER_APP, async {
            if let Err(err) = self.inner_run().await {
                status_err!("{}", err);
                WCM_VIEW_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
            }
        }) {
            status_err!("{}", tokio_err);
            WCM_VIEW_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        };
    }
}

/// Delay after which a server started with `CI` set stops by itself
const CI_SHUTDOWN_DELAY: Duration = Duration::from_secs(3);

impl ServeCmd {
    pub async fn inner_run(&self) -> AppResult<()> {
        let server_config = WCM_VIEW_SERVER_APP.config();
        debug!(?server_config, "Loaded ServerConfig.");

        info!(
            "Serving content from `{}` under context path `{}`.",
            server_config.content.content_dir_or_default().display(),
            server_config.server.context_path_or_default()
        );

        let runtime_ctx = ServerRuntimeContext::from_config(server_config.clone())?;

        _ = tokio::spawn(async {
            wait_for_shutdown().await;
            info!("Shutting down gracefully ...");
            WCM_VIEW_SERVER_APP.shutdown(Shutdown::Graceful);
        });

        start_web_server(runtime_ctx).await
    }
}

/// Resolves on Ctrl-C, or after [`CI_SHUTDOWN_DELAY`] when `CI` is set.
async fn wait_for_shutdown() {
    let ci_timeout = async {
        if std::env::var_os("CI").is_some() {
            tokio::time::sleep(CI_SHUTDOWN_DELAY).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                status_err!("Could not listen for shutdown signal: {}", err);
            }
        }
        () = ci_timeout => {}
    }
}
