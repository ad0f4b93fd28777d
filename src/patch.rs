//! Repository patches
//!
//! A patch is a one-off change to stored data, applied once when the data
//! is upgraded.

pub mod guest_permission;
pub mod permission_store;
pub mod qname;

use tracing::info;

use crate::error::AppResult;

pub use self::{
    guest_permission::UpdateGuestPermissionPatch,
    permission_store::{
        FilePermissionStore, PermissionEntry, PermissionReference, PermissionStore,
        PermissionTable,
    },
    qname::{content_model, QName},
};

pub trait Patch {
    fn id(&self) -> &str;

    fn description(&self) -> String;

    /// Does the work, returns a human readable result message.
    fn apply_internal(&mut self) -> AppResult<String>;

    fn apply(&mut self) -> AppResult<String> {
        info!(patch = self.id(), "applying patch: {}", self.description());
        let report = self.apply_internal()?;
        info!(patch = self.id(), "{report}");
        Ok(report)
    }
}
