use crate::{
    error::AppResult,
    messages::message,
    patch::{content_model::TYPE_CMOBJECT, Patch, PermissionReference, PermissionStore},
};

const MSG_DESCRIPTION: &str = "patch.updateGuestPermission.description";
const MSG_SUCCESS: &str = "patch.updateGuestPermission.result";

/// The permission `Guest` has been renamed to `Consumer`.
#[derive(Debug)]
pub struct UpdateGuestPermissionPatch<S> {
    store: S,
}

impl<S: PermissionStore> UpdateGuestPermissionPatch<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: PermissionStore> Patch for UpdateGuestPermissionPatch<S> {
    fn id(&self) -> &str {
        "patch.updateGuestPermission"
    }

    fn description(&self) -> String {
        message(MSG_DESCRIPTION, &[])
    }

    fn apply_internal(&mut self) -> AppResult<String> {
        let update_count = self.store.rename_permission(
            &PermissionReference::new(TYPE_CMOBJECT, "Guest"),
            &PermissionReference::new(TYPE_CMOBJECT, "Consumer"),
        )?;

        Ok(message(MSG_SUCCESS, &[&update_count]))
    }
}
