//! Configuration management for `jira_hierarchy`.
//!
//! Settings are layered, lowest precedence first:
//! - YAML file (`--config <FILE>` or `JIRA_HIERARCHY_CONFIG`)
//! - Environment variables (`JIRA_URL`, `JIRA_USER`, `JIRA_API_TOKEN`)
//! - Command-line flags
//!
//! clap already merges flags with the environment, so this module only
//! has to fall back to the file.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{HierarchyError, Result};

/// Default Jira issue-type names.
pub const DEFAULT_EPIC_TYPE: &str = "Epic";
pub const DEFAULT_TASK_TYPE: &str = "Task";
pub const DEFAULT_SUBTASK_TYPE: &str = "Sub-task";

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub api_token: Option<String>,
    pub epic_type: Option<String>,
    pub task_type: Option<String>,
    pub subtask_type: Option<String>,
    pub epic_name_field: Option<String>,
}

impl FileConfig {
    /// Load a config file. `None` yields an empty config.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` for a missing explicit path, or `Config` if the
    /// YAML cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HierarchyError::FileNotFound(path.to_path_buf())
            } else {
                HierarchyError::Io(e)
            }
        })?;
        let config = Self::parse(&text)
            .map_err(|e| HierarchyError::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub api_token: Option<String>,
    pub epic_type: Option<String>,
    pub task_type: Option<String>,
    pub subtask_type: Option<String>,
    pub epic_name_field: Option<String>,
}

/// Connection settings for one Jira site.
#[derive(Clone, PartialEq, Eq)]
pub struct JiraCredentials {
    pub base_url: String,
    pub user: String,
    pub api_token: String,
}

impl fmt::Debug for JiraCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraCredentials")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Names of the three issue types in the target Jira.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTypeNames {
    pub epic: String,
    pub task: String,
    pub subtask: String,
}

impl Default for IssueTypeNames {
    fn default() -> Self {
        Self {
            epic: DEFAULT_EPIC_TYPE.to_string(),
            task: DEFAULT_TASK_TYPE.to_string(),
            subtask: DEFAULT_SUBTASK_TYPE.to_string(),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    cli: CliOverrides,
    file: FileConfig,
}

impl Settings {
    #[must_use]
    pub const fn new(cli: CliOverrides, file: FileConfig) -> Self {
        Self { cli, file }
    }

    /// Credentials, CLI/env first, then file.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming every missing variable.
    pub fn credentials(&self) -> Result<JiraCredentials> {
        let url = pick(&self.cli.url, &self.file.url);
        let user = pick(&self.cli.user, &self.file.user);
        let token = pick(&self.cli.api_token, &self.file.api_token);

        let missing: Vec<&str> = [
            ("JIRA_URL", url.is_none()),
            ("JIRA_USER", user.is_none()),
            ("JIRA_API_TOKEN", token.is_none()),
        ]
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| *name)
        .collect();

        match (url, user, token) {
            (Some(url), Some(user), Some(api_token)) => Ok(JiraCredentials {
                base_url: url.trim_end_matches('/').to_string(),
                user,
                api_token,
            }),
            _ => Err(HierarchyError::config(format!(
                "{} must be set through the environment, command-line flags or the config file",
                missing.join(", ")
            ))),
        }
    }

    #[must_use]
    pub fn issue_types(&self) -> IssueTypeNames {
        let defaults = IssueTypeNames::default();
        IssueTypeNames {
            epic: pick(&self.cli.epic_type, &self.file.epic_type).unwrap_or(defaults.epic),
            task: pick(&self.cli.task_type, &self.file.task_type).unwrap_or(defaults.task),
            subtask: pick(&self.cli.subtask_type, &self.file.subtask_type)
                .unwrap_or(defaults.subtask),
        }
    }

    /// Custom field that receives the Epic Name, if any.
    #[must_use]
    pub fn epic_name_field(&self) -> Option<String> {
        pick(&self.cli.epic_name_field, &self.file.epic_name_field)
    }
}

#[allow(clippy::ref_option)]
fn pick(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    [primary.as_deref(), fallback.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
