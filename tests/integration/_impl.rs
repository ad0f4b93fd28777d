use std::{path::Path, time::Duration};

use assert_cmd::Command;

pub trait AssertCmdExt {
    /// Use the given configuration file
    fn config_file(&mut self, path: &Path) -> &mut Self;

    /// Enable test mode
    fn test_mode_args(&mut self) -> &mut Self;
}

impl AssertCmdExt for Command {
    fn config_file(&mut self, path: &Path) -> &mut Self {
        self.args(["-c", &path.display().to_string()]);
        self
    }

    fn test_mode_args(&mut self) -> &mut Self {
        self.timeout(Duration::from_secs(10)) // Set a timeout of 10 seconds
            .args(["-v"]) // Enable verbose logging
            .env("CI", "1"); // Enable CI test mode

        self
    }
}
