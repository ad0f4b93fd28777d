//! Acceptance test: runs the application as a subprocess and asserts its
//! output for given argument combinations matches what is expected.
//!
//! For more information, see:
//! <https://docs.rs/abscissa_core/latest/abscissa_core/testing/index.html>

#![forbid(unsafe_code)]

use std::{fs, path::Path};

use crate::_impl::AssertCmdExt;
use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::{predicate, PredicateBooleanExt};
use rstest::{fixture, rstest};
use wcm_view_server::config::WcmViewServerConfig;

const MODULE_ID: &str = "org.example.wcm.forms";

#[fixture]
fn setup() -> Result<Command> {
    let runner = Command::cargo_bin(env!("CARGO_PKG_NAME").replace('_', "-"))?;

    Ok(runner)
}

/// Copies a fixture file or directory tree into `target`
fn copy_fixture(source: &Path, target: &Path) -> Result<()> {
    if source.is_dir() {
        fs::create_dir_all(target)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_fixture(&entry.path(), &target.join(entry.file_name()))?;
        }
    } else {
        let _ = fs::copy(source, target)?;
    }
    Ok(())
}

#[rstest]
fn test_version_passes(setup: Result<Command>) -> Result<()> {
    setup?
        .arg("--version")
        .assert()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .success();

    Ok(())
}

#[rstest]
fn test_module_show_passes(setup: Result<Command>) -> Result<()> {
    setup?
        .args(["module", "show", "--war", "tests/fixtures/test_data/war", MODULE_ID])
        .assert()
        .stdout(predicate::str::contains(format!("module.id = {MODULE_ID}")))
        .stdout(predicate::str::contains("module.version = 1.2.0"))
        .success();

    Ok(())
}

#[rstest]
fn test_module_show_unknown_module_passes(setup: Result<Command>) -> Result<()> {
    setup?
        .args([
            "module",
            "show",
            "--war",
            "tests/fixtures/test_data/war",
            "not.installed",
        ])
        .assert()
        .stdout(predicate::str::contains("is not installed"))
        .success();

    Ok(())
}

#[rstest]
fn test_module_install_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let war = dir.path().join("war");
    copy_fixture(Path::new("tests/fixtures/test_data/war"), &war)?;
    let war_arg = war.display().to_string();

    setup?
        .args([
            "module",
            "install",
            "--war",
            &war_arg,
            "--module-version",
            "1.3.0",
            MODULE_ID,
        ])
        .assert()
        .stdout(predicate::str::contains("Installed module"))
        .success();

    let written = fs::read_to_string(
        war.join("WEB-INF/classes/alfresco/module")
            .join(MODULE_ID)
            .join("module.properties"),
    )?;
    assert!(written.contains("module.version=1.3.0"));
    assert!(written.contains("module.installDate="));
    assert!(written.contains("module.installState=INSTALLED"));

    Ok(())
}

#[rstest]
fn test_module_install_new_module_needs_version_fails(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let war_arg = dir.path().display().to_string();

    setup?
        .args(["module", "install", "--war", &war_arg, "brand.new"])
        .assert()
        .stderr(predicate::str::contains("--module-version"))
        .failure();

    Ok(())
}

#[rstest]
fn test_patch_guest_permission_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let permissions = dir.path().join("permissions.toml");
    copy_fixture(
        Path::new("tests/fixtures/test_data/permissions.toml"),
        &permissions,
    )?;
    let permissions_arg = permissions.display().to_string();

    setup?
        .args(["patch", "guest-permission", "--permissions", &permissions_arg])
        .assert()
        .stdout(predicate::str::contains(
            "Renamed permission 'Guest' to 'Consumer' on 2 access control entries.",
        ))
        .success();

    let written = fs::read_to_string(&permissions)?;
    assert!(written.contains(r#"permission = "Consumer""#));

    Ok(())
}

#[rstest]
fn test_patch_missing_permissions_fails(setup: Result<Command>) -> Result<()> {
    setup?
        .args([
            "patch",
            "guest-permission",
            "--permissions",
            "tests/fixtures/nothing.toml",
        ])
        .assert()
        .stderr(predicate::str::contains("Could not read permissions").and(
            predicate::str::contains("nothing.toml"),
        ))
        .failure();

    Ok(())
}

/// Use configured value
#[rstest]
#[ignore = "needs to bind to a port"]
fn test_serve_with_config_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("wcm_view_server.toml");
    let mut config = WcmViewServerConfig::from_file(Path::new(
        "tests/fixtures/test_data/wcm_view_server.toml",
    ))?;
    config.server.listen = Some(([127, 0, 0, 1], 8091).into());
    config.to_file(&config_path)?;

    setup?
        .test_mode_args()
        .config_file(&config_path)
        .arg("serve")
        .assert()
        .stdout(predicate::str::contains("Using configuration file:"))
        .stdout(predicate::str::contains("Page lookup caching is enabled."))
        .stdout(predicate::str::contains(
            "under context path `/site`",
        ))
        .stdout(predicate::str::contains("TLS is disabled."))
        .stdout(predicate::str::contains(
            "Listening on: `http://127.0.0.1:8091`",
        ))
        .stdout(predicate::str::contains("Shutting down gracefully ..."))
        .success();

    Ok(())
}
