#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const HEADER: &str =
    "epic_key,epic_summary,task_key,task_summary,subtask_key,subtask_summary\n";

/// Scratch directory holding the CSV and mapping files of one test.
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `HEADER` followed by `body` and return the file path.
    pub fn write_csv(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, format!("{HEADER}{body}")).expect("write csv");
        path
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("write file");
        path
    }
}

/// A binary with every Jira setting cleared from the environment.
pub fn bin(name: &str, workspace: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin(name).expect("binary built");
    cmd.current_dir(workspace.root())
        .env_remove("JIRA_URL")
        .env_remove("JIRA_USER")
        .env_remove("JIRA_API_TOKEN")
        .env_remove("JIRA_HIERARCHY_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
