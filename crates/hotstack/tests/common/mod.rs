#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch working directory that hides the user's settings and environment
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_settings(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("hotstack.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// `hotstack` running inside the project, ignoring the user's own settings
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("hotstack").unwrap();
        cmd.current_dir(self.path())
            .env_remove("HOTSTACK_CONFIG_PATH")
            .env_remove("HOTSTACK_BMH_NAMESPACE")
            .env_remove("OS_CLOUD")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.path())
            .env("HOME", self.path());
        cmd
    }

    /// Like [`command`](Self::command) but with no external tools reachable
    pub fn command_without_tools(&self) -> Command {
        let bin = self.path().join("empty-bin");
        fs::create_dir_all(&bin).unwrap();
        let mut cmd = self.command();
        cmd.env("PATH", bin);
        cmd
    }
}
