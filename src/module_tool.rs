//! Module management
//!
//! Reads and writes the details of modules installed into a WAR.

pub mod details;
pub mod helper;
pub mod properties;
pub mod war;

pub use self::{
    details::{ModuleDetails, ModuleInstallState},
    helper::{ModuleDetailsHelper, MODULE_DIR},
    properties::Properties,
    war::WarFile,
};
