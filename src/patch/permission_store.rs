use std::{
    fmt::{self, Debug},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{AppResult, ErrorKind},
    patch::QName,
};

/// A permission, named within the type it applies to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PermissionReference {
    type_qname: QName,
    name: String,
}

impl PermissionReference {
    pub fn new(type_qname: QName, name: impl Into<String>) -> Self {
        Self {
            type_qname,
            name: name.into(),
        }
    }

    pub const fn type_qname(&self) -> &QName {
        &self.type_qname
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PermissionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_qname, self.name)
    }
}

/// One access control entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PermissionEntry {
    pub node: String,
    pub authority: String,
    pub permission_type: QName,
    pub permission: String,
    pub allowed: bool,
}

impl PermissionEntry {
    pub fn refers_to(&self, reference: &PermissionReference) -> bool {
        self.permission_type == reference.type_qname && self.permission == reference.name
    }
}

/// Storage of access control entries
pub trait PermissionStore: Debug {
    /// Renames every use of `old` to `new`, returns how many entries changed.
    fn rename_permission(
        &mut self,
        old: &PermissionReference,
        new: &PermissionReference,
    ) -> AppResult<usize>;
}

/// Access control entries held in memory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PermissionTable {
    #[serde(rename = "entry")]
    entries: Vec<PermissionEntry>,
}

impl PermissionTable {
    pub const fn new(entries: Vec<PermissionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }
}

impl PermissionStore for PermissionTable {
    fn rename_permission(
        &mut self,
        old: &PermissionReference,
        new: &PermissionReference,
    ) -> AppResult<usize> {
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|e| e.refers_to(old)) {
            entry.permission_type = new.type_qname.clone();
            entry.permission = new.name.clone();
            count += 1;
        }
        debug!(%old, %new, count, "renamed permission");
        Ok(count)
    }
}

/// Access control entries kept in a TOML file of `[[entry]]` tables
#[derive(Clone, Debug)]
pub struct FilePermissionStore {
    path: PathBuf,
    table: PermissionTable,
}

impl FilePermissionStore {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            ErrorKind::Patch.context(format!(
                "Could not read permissions from `{}`: {err}",
                path.display()
            ))
        })?;
        let table = toml::from_str(&content).map_err(|err| {
            ErrorKind::Patch.context(format!(
                "Could not parse permissions in `{}`: {err}",
                path.display()
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    pub fn entries(&self) -> &[PermissionEntry] {
        self.table.entries()
    }

    fn save(&self) -> AppResult<()> {
        let toml_string = toml::to_string(&self.table).map_err(|err| {
            ErrorKind::Patch.context(format!("Could not serialize permissions: {err}"))
        })?;
        fs::write(&self.path, toml_string)?;
        Ok(())
    }
}

impl PermissionStore for FilePermissionStore {
    fn rename_permission(
        &mut self,
        old: &PermissionReference,
        new: &PermissionReference,
    ) -> AppResult<usize> {
        let count = self.table.rename_permission(old, new)?;
        if count > 0 {
            self.save()?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::patch::content_model::TYPE_CMOBJECT;

    fn guest() -> PermissionReference {
        PermissionReference::new(TYPE_CMOBJECT, "Guest")
    }

    fn consumer() -> PermissionReference {
        PermissionReference::new(TYPE_CMOBJECT, "Consumer")
    }

    #[test]
    fn test_file_store_renames_and_persists_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.toml");
        fs::copy("tests/fixtures/test_data/permissions.toml", &path).unwrap();

        let mut store = FilePermissionStore::load(&path).unwrap();
        assert_eq!(store.entries().len(), 4);
        assert_eq!(store.rename_permission(&guest(), &consumer()).unwrap(), 2);

        let reloaded = FilePermissionStore::load(&path).unwrap();
        let consumers = reloaded
            .entries()
            .iter()
            .filter(|e| e.refers_to(&consumer()))
            .count();
        assert_eq!(consumers, 3);

        // the `sys:base` Guest entry is a different permission
        assert_eq!(
            reloaded
                .entries()
                .iter()
                .filter(|e| e.permission == "Guest")
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_file_fails_passes() {
        assert!(FilePermissionStore::load(Path::new("tests/fixtures/none.toml")).is_err());
    }
}
