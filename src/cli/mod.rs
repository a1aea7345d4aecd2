//! Command-line interface for `jira_hierarchy`.
//!
//! Two binaries share the argument groups defined here:
//! `export-jira-hierarchy` ([`ExportCli`]) and `import-jira-hierarchy`
//! ([`ImportCli`]).

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};
use jira_hierarchy_lib::LinkMode;

use crate::config::{CliOverrides, FileConfig, Settings};
use crate::logging;

/// Flags shared by both binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML config file (url, user, api_token, issue-type names)
    #[arg(long, env = "JIRA_HIERARCHY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Append JSON log records to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Jira site and credentials.
#[derive(Args, Debug, Clone, Default)]
pub struct JiraArgs {
    /// Jira base URL, e.g. https://acme.atlassian.net
    #[arg(long, env = "JIRA_URL")]
    pub url: Option<String>,

    /// Jira account e-mail
    #[arg(long, env = "JIRA_USER")]
    pub user: Option<String>,

    /// Jira API token
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

/// Issue-type names in the Jira project.
#[derive(Args, Debug, Clone, Default)]
pub struct TypeArgs {
    /// Issue type used for Epics [default: Epic]
    #[arg(long)]
    pub epic_type: Option<String>,

    /// Issue type used for Tasks [default: Task]
    #[arg(long)]
    pub task_type: Option<String>,

    /// Issue type used for Subtasks [default: Sub-task]
    #[arg(long)]
    pub subtask_type: Option<String>,
}

/// Export a project's Epic → Task → Subtask hierarchy to CSV.
#[derive(Parser, Debug)]
#[command(name = "export-jira-hierarchy", author, version, long_about = None)]
pub struct ExportCli {
    /// Project to export
    #[arg(short = 'k', long)]
    pub project_key: String,

    /// Output CSV file
    #[arg(short, long, default_value = "jira_hierarchy.csv")]
    pub output: PathBuf,

    #[command(flatten)]
    pub jira: JiraArgs,

    #[command(flatten)]
    pub types: TypeArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Recreate an Epic → Task → Subtask hierarchy from CSV.
#[derive(Parser, Debug)]
#[command(
    name = "import-jira-hierarchy",
    author,
    version,
    long_about = None,
    after_help = "A dry run needs no credentials and never writes the mapping file."
)]
pub struct ImportCli {
    /// CSV file produced by export-jira-hierarchy
    #[arg(long)]
    pub csv: PathBuf,

    /// Project to create issues in
    #[arg(short = 'k', long)]
    pub project_key: String,

    /// Custom field that receives the Epic Name (e.g. customfield_10011)
    #[arg(long)]
    pub epic_name_field: Option<String>,

    /// Print the planned creations without calling Jira
    #[arg(long)]
    pub dry_run: bool,

    /// How Tasks are attached to Epics: parent or epic-api
    #[arg(long, default_value = "parent")]
    pub link_mode: LinkMode,

    /// Source → target key ledger; keys already in it are skipped
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    #[command(flatten)]
    pub jira: JiraArgs,

    #[command(flatten)]
    pub types: TypeArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Merge parsed flags with the config file.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load_settings(
    global: &GlobalArgs,
    jira: &JiraArgs,
    types: &TypeArgs,
    epic_name_field: Option<&str>,
) -> jira_hierarchy_lib::Result<Settings> {
    let file = FileConfig::load(global.config.as_deref())?;
    let cli = CliOverrides {
        url: jira.url.clone(),
        user: jira.user.clone(),
        api_token: jira.api_token.clone(),
        epic_type: types.epic_type.clone(),
        task_type: types.task_type.clone(),
        subtask_type: types.subtask_type.clone(),
        epic_name_field: epic_name_field.map(str::to_string),
    };
    Ok(Settings::new(cli, file))
}

fn init_logging(global: &GlobalArgs) -> Result<()> {
    logging::init_logging(global.verbose, global.quiet, global.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

/// Run `export-jira-hierarchy`.
///
/// # Errors
///
/// Returns an error if the export fails.
pub fn run_export() -> Result<()> {
    let cli = ExportCli::parse();
    init_logging(&cli.global)?;
    commands::export::execute(&cli)?;
    Ok(())
}

/// Run `import-jira-hierarchy`.
///
/// # Errors
///
/// Returns an error if the import fails.
pub fn run_import() -> Result<()> {
    let cli = ImportCli::parse();
    init_logging(&cli.global)?;
    commands::import::execute(&cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_commands_are_consistent() {
        ExportCli::command().debug_assert();
        ImportCli::command().debug_assert();
    }

    #[test]
    fn test_export_defaults() {
        let cli = ExportCli::try_parse_from(["export-jira-hierarchy", "-k", "ACME"]).unwrap();
        assert_eq!(cli.project_key, "ACME");
        assert_eq!(cli.output, PathBuf::from("jira_hierarchy.csv"));
        assert_eq!(cli.global.verbose, 0);
        assert!(!cli.global.json);
    }

    #[test]
    fn test_export_requires_project_key() {
        assert!(ExportCli::try_parse_from(["export-jira-hierarchy"]).is_err());
    }

    #[test]
    fn test_import_flags() {
        let cli = ImportCli::try_parse_from([
            "import-jira-hierarchy",
            "--csv",
            "h.csv",
            "--project-key",
            "NEW",
            "--dry-run",
            "--link-mode",
            "epic-api",
            "--mapping",
            "map.csv",
            "--epic-name-field",
            "customfield_10011",
            "--subtask-type",
            "Subtask",
            "-vv",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.link_mode, LinkMode::EpicApi);
        assert_eq!(cli.mapping, Some(PathBuf::from("map.csv")));
        assert_eq!(cli.epic_name_field.as_deref(), Some("customfield_10011"));
        assert_eq!(cli.types.subtask_type.as_deref(), Some("Subtask"));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn test_import_default_link_mode() {
        let cli =
            ImportCli::try_parse_from(["import-jira-hierarchy", "--csv", "h.csv", "-k", "NEW"])
                .unwrap();
        assert_eq!(cli.link_mode, LinkMode::Parent);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_import_rejects_unknown_link_mode() {
        let result = ImportCli::try_parse_from([
            "import-jira-hierarchy",
            "--csv",
            "h.csv",
            "-k",
            "NEW",
            "--link-mode",
            "sideways",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_settings_merges_types() {
        let types = TypeArgs {
            task_type: Some("Story".into()),
            ..TypeArgs::default()
        };
        let settings = load_settings(
            &GlobalArgs::default(),
            &JiraArgs::default(),
            &types,
            Some("customfield_10011"),
        )
        .unwrap();
        assert_eq!(settings.issue_types().task, "Story");
        assert_eq!(settings.issue_types().epic, "Epic");
        assert_eq!(
            settings.epic_name_field().as_deref(),
            Some("customfield_10011")
        );
    }
}
