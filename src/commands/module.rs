//! `module` subcommand

use std::path::PathBuf;

use abscissa_core::{status_err, Application, Command, Runnable, Shutdown};
use clap::{Args, Parser, Subcommand};

use crate::{
    error::{AppResult, ErrorKind},
    module_tool::{ModuleDetails, ModuleDetailsHelper, ModuleInstallState, WarFile},
    prelude::WCM_VIEW_SERVER_APP,
};

/// `module` subcommand
#[derive(Command, Debug, Parser)]
pub struct ModuleCmd {
    #[command(subcommand)]
    cmd: ModuleSubCmd,
}

#[derive(Subcommand, Debug, Runnable)]
enum ModuleSubCmd {
    /// Print the details of a module installed in a WAR
    Show(ShowCmd),

    /// Record a module as installed in a WAR
    Install(InstallCmd),
}

impl Runnable for ModuleCmd {
    fn run(&self) {
        self.cmd.run();
    }
}

#[derive(Args, Debug)]
struct WarArgs {
    /// WAR file or exploded WAR directory
    #[arg(long)]
    war: PathBuf,

    /// Module id, e.g. `org.alfresco.module.forms`
    module_id: String,
}

impl WarArgs {
    fn open(&self) -> AppResult<WarFile> {
        WarFile::open(&self.war).map_err(|err| {
            ErrorKind::ModuleManagement
                .context(format!("Could not open WAR `{}`: {err}", self.war.display()))
                .into()
        })
    }
}

#[derive(Command, Debug, Parser)]
struct ShowCmd {
    #[command(flatten)]
    war: WarArgs,
}

impl Runnable for ShowCmd {
    fn run(&self) {
        if let Err(err) = self.inner_run() {
            status_err!("{}", err);
            WCM_VIEW_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        }
    }
}

impl ShowCmd {
    fn inner_run(&self) -> AppResult<()> {
        let war = self.war.open()?;

        let Some(helper) = ModuleDetailsHelper::create(&war, &self.war.module_id)? else {
            println!(
                "Module `{}` is not installed in `{}`.",
                self.war.module_id,
                war.path().display()
            );
            return Ok(());
        };

        for (key, value) in helper.properties().iter() {
            println!("{key} = {value}");
        }

        Ok(())
    }
}

#[derive(Command, Debug, Parser)]
struct InstallCmd {
    #[command(flatten)]
    war: WarArgs,

    /// Module version, kept from existing details if omitted
    #[arg(long = "module-version")]
    module_version: Option<String>,

    /// Module title
    #[arg(long)]
    title: Option<String>,

    /// Module description
    #[arg(long)]
    description: Option<String>,
}

impl Runnable for InstallCmd {
    fn run(&self) {
        if let Err(err) = self.inner_run() {
            status_err!("{}", err);
            WCM_VIEW_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        }
    }
}

impl InstallCmd {
    fn inner_run(&self) -> AppResult<()> {
        let war = self.war.open()?;
        let module_id = self.war.module_id.as_str();

        let mut helper = match ModuleDetailsHelper::create(&war, module_id)? {
            Some(helper) => helper,
            None => {
                let Some(version) = self.module_version.as_deref() else {
                    return Err(ErrorKind::ModuleManagement
                        .context(format!(
                            "Module `{module_id}` is new, a `--module-version` is required."
                        ))
                        .into());
                };
                ModuleDetailsHelper::new(ModuleDetails::new(module_id, version))
            }
        };

        if let Some(version) = &self.module_version {
            helper.set_version(version);
        }
        if let Some(title) = &self.title {
            helper.set_title(title);
        }
        if let Some(description) = &self.description {
            helper.set_description(description);
        }
        helper.set_install_state(ModuleInstallState::Installed);
        helper.save(&war, module_id)?;

        println!(
            "Installed module `{module_id}` ({}) into `{}`.",
            helper.version().unwrap_or("unknown version"),
            war.path().display()
        );

        Ok(())
    }
}
