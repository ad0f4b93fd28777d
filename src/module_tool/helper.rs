use std::ops::{Deref, DerefMut};

use chrono::Local;
use tracing::{debug, info};

use crate::{
    error::{AppResult, ErrorKind},
    module_tool::{details::ModuleDetails, properties::Properties, war::WarFile},
};

/// Directory inside a WAR that holds one sub-directory per installed module
pub const MODULE_DIR: &str = "WEB-INF/classes/alfresco/module";

/// File name of a module's details
pub const MODULE_PROPERTIES: &str = "module.properties";

/// Module details as stored in a WAR
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDetailsHelper {
    details: ModuleDetails,
}

impl ModuleDetailsHelper {
    pub const fn new(details: ModuleDetails) -> Self {
        Self { details }
    }

    /// Entry name of the module's details inside the WAR
    pub fn file_location(module_id: &str) -> String {
        format!("{MODULE_DIR}/{module_id}/{MODULE_PROPERTIES}")
    }

    /// Reads the details of `module_id` from `war`, `None` if the module has
    /// no details file.
    pub fn create(war: &WarFile, module_id: &str) -> AppResult<Option<Self>> {
        let location = Self::file_location(module_id);
        debug!(war = %war.path().display(), location, "loading module details");

        let Some(bytes) = war.read_entry(&location).map_err(load_error)? else {
            return Ok(None);
        };

        // Property files are ISO-8859-1; every byte is one code point.
        let text: String = bytes.iter().map(|&byte| char::from(byte)).collect();
        let properties = Properties::parse(&text).map_err(load_error)?;

        Ok(Some(Self::new(ModuleDetails::from_properties(properties))))
    }

    /// Stamps the install date and writes the details into `war`, creating
    /// the file if needed.
    pub fn save(&mut self, war: &WarFile, module_id: &str) -> AppResult<()> {
        self.details.set_install_date(Local::now());

        let location = Self::file_location(module_id);
        let text = self.details.properties().write(&[]);
        war.write_entry(&location, text.as_bytes()).map_err(|err| {
            ErrorKind::ModuleManagement
                .context(format!("Unable to save module details into WAR file. {err}"))
        })?;

        info!(
            war = %war.path().display(),
            module = module_id,
            "saved module details"
        );

        Ok(())
    }

    pub fn into_details(self) -> ModuleDetails {
        self.details
    }
}

fn load_error(err: impl std::fmt::Display) -> crate::error::Error {
    ErrorKind::ModuleManagement
        .context(format!(
            "Unable to load module details from property file. {err}"
        ))
        .into()
}

impl Deref for ModuleDetailsHelper {
    type Target = ModuleDetails;

    fn deref(&self) -> &ModuleDetails {
        &self.details
    }
}

impl DerefMut for ModuleDetailsHelper {
    fn deref_mut(&mut self) -> &mut ModuleDetails {
        &mut self.details
    }
}
