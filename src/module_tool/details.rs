use chrono::{DateTime, Local};
use strum::{AsRefStr, Display, EnumString};

use crate::module_tool::properties::Properties;

pub const PROP_ID: &str = "module.id";
pub const PROP_VERSION: &str = "module.version";
pub const PROP_TITLE: &str = "module.title";
pub const PROP_DESCRIPTION: &str = "module.description";
pub const PROP_INSTALL_DATE: &str = "module.installDate";
pub const PROP_INSTALL_STATE: &str = "module.installState";

/// Format of `module.installDate`, e.g. `Tue Mar 04 10:15:00 +01:00 2025`
pub const INSTALL_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ModuleInstallState {
    #[default]
    Unknown,
    Installed,
    Disabled,
    Uninstalled,
}

/// Typed view over a module's `module.properties`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleDetails {
    properties: Properties,
}

impl ModuleDetails {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        let mut properties = Properties::new();
        let _ = properties.set(PROP_ID, id);
        let _ = properties.set(PROP_VERSION, version);
        Self { properties }
    }

    pub const fn from_properties(properties: Properties) -> Self {
        Self { properties }
    }

    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn id(&self) -> Option<&str> {
        self.properties.get(PROP_ID)
    }

    pub fn version(&self) -> Option<&str> {
        self.properties.get(PROP_VERSION)
    }

    pub fn title(&self) -> Option<&str> {
        self.properties.get(PROP_TITLE)
    }

    pub fn description(&self) -> Option<&str> {
        self.properties.get(PROP_DESCRIPTION)
    }

    /// Raw install date as written by the last install
    pub fn install_date(&self) -> Option<&str> {
        self.properties.get(PROP_INSTALL_DATE)
    }

    /// Unknown or missing states read as [`ModuleInstallState::Unknown`].
    pub fn install_state(&self) -> ModuleInstallState {
        self.properties
            .get(PROP_INSTALL_STATE)
            .and_then(|state| state.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_version(&mut self, version: &str) {
        let _ = self.properties.set(PROP_VERSION, version);
    }

    pub fn set_title(&mut self, title: &str) {
        let _ = self.properties.set(PROP_TITLE, title);
    }

    pub fn set_description(&mut self, description: &str) {
        let _ = self.properties.set(PROP_DESCRIPTION, description);
    }

    pub fn set_install_date(&mut self, date: DateTime<Local>) {
        let _ = self
            .properties
            .set(PROP_INSTALL_DATE, date.format(INSTALL_DATE_FORMAT).to_string());
    }

    pub fn set_install_state(&mut self, state: ModuleInstallState) {
        let _ = self.properties.set(PROP_INSTALL_STATE, state.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accessors_passes() {
        let props = Properties::parse(
            "module.id=org.example.forms\nmodule.version=1.2\nmodule.title=Forms\nmodule.installState=installed\n",
        )
        .unwrap();
        let details = ModuleDetails::from_properties(props);

        assert_eq!(details.id(), Some("org.example.forms"));
        assert_eq!(details.version(), Some("1.2"));
        assert_eq!(details.title(), Some("Forms"));
        assert_eq!(details.description(), None);
        assert_eq!(details.install_state(), ModuleInstallState::Installed);
    }

    #[test]
    fn test_setters_passes() {
        let mut details = ModuleDetails::new("org.example.forms", "1.0");
        assert_eq!(details.install_state(), ModuleInstallState::Unknown);

        details.set_install_state(ModuleInstallState::Disabled);
        assert_eq!(
            details.properties().get(PROP_INSTALL_STATE),
            Some("DISABLED")
        );

        let date = Local.with_ymd_and_hms(2025, 3, 4, 10, 15, 0).unwrap();
        details.set_install_date(date);
        let written = details.install_date().unwrap();
        assert!(written.starts_with("Tue Mar 04 10:15:00 "));
        assert!(written.ends_with(" 2025"));
    }
}
