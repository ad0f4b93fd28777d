//! `patch` subcommand

use std::path::PathBuf;

use abscissa_core::{status_err, Application, Command, Runnable, Shutdown};
use clap::{Parser, Subcommand};

use crate::{
    error::AppResult,
    patch::{FilePermissionStore, Patch, UpdateGuestPermissionPatch},
    prelude::WCM_VIEW_SERVER_APP,
};

/// `patch` subcommand
#[derive(Command, Debug, Parser)]
pub struct PatchCmd {
    #[command(subcommand)]
    cmd: PatchSubCmd,
}

#[derive(Subcommand, Debug, Runnable)]
enum PatchSubCmd {
    /// Rename the `Guest` permission to `Consumer`
    GuestPermission(GuestPermissionCmd),
}

impl Runnable for PatchCmd {
    fn run(&self) {
        self.cmd.run();
    }
}

#[derive(Command, Debug, Parser)]
struct GuestPermissionCmd {
    /// Permissions file (TOML, one `[[entry]]` per access control entry)
    #[arg(long)]
    permissions: PathBuf,
}

impl Runnable for GuestPermissionCmd {
    fn run(&self) {
        if let Err(err) = self.inner_run() {
            status_err!("{}", err);
            WCM_VIEW_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        }
    }
}

impl GuestPermissionCmd {
    fn inner_run(&self) -> AppResult<()> {
        let store = FilePermissionStore::load(&self.permissions)?;
        let mut patch = UpdateGuestPermissionPatch::new(store);
        let report = patch.apply()?;
        println!("{report}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_patch() {
        PatchCmd::command().debug_assert();
    }
}
