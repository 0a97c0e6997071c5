use crate::catalog::VariableCatalog;
use crate::types::{
    Command, CommandVariable, Ecosystem, Folder, SharedList, SharedVariable, TerminalConfig,
    TerminalKind, TestRunnerConfig,
};
use serde::{Deserialize, Serialize};

/// The persisted command hub: folders of commands, shared definitions and
/// test runners
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfig {
    /// Bumped on every save
    #[serde(default)]
    pub version: u32,
    /// RFC 3339 timestamp of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_variables: Vec<SharedVariable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_lists: Vec<SharedList>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_runners: Vec<TestRunnerConfig>,
}

impl HubConfig {
    /// Every command with the names of the folders containing it, depth-first:
    /// a folder's own commands come before its subfolders'
    pub fn commands(&self) -> Vec<(Vec<&str>, &Command)> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        for folder in &self.folders {
            collect_commands(folder, &mut path, &mut entries);
        }
        entries
    }

    pub fn find_command(&self, id: &str) -> Option<&Command> {
        self.commands()
            .into_iter()
            .map(|(_, command)| command)
            .find(|command| command.id == id)
    }

    pub fn command_ids(&self) -> Vec<&str> {
        self.commands()
            .into_iter()
            .map(|(_, command)| command.id.as_str())
            .collect()
    }

    pub fn test_runner(&self, id: &str) -> Option<&TestRunnerConfig> {
        self.test_runners.iter().find(|runner| runner.id == id)
    }

    /// Catalog for resolving `command` against this config's shared
    /// definitions
    pub fn catalog_for<'a>(&'a self, command: &'a Command) -> VariableCatalog<'a> {
        VariableCatalog::for_command(command, &self.shared_variables, &self.shared_lists)
    }

    pub fn shared_catalog(&self) -> VariableCatalog<'_> {
        VariableCatalog::new(&self.shared_variables, &self.shared_lists)
    }
}

fn collect_commands<'a>(
    folder: &'a Folder,
    path: &mut Vec<&'a str>,
    entries: &mut Vec<(Vec<&'a str>, &'a Command)>,
) {
    path.push(folder.name.as_str());
    for command in &folder.commands {
        entries.push((path.clone(), command));
    }
    for subfolder in &folder.subfolders {
        collect_commands(subfolder, path, entries);
    }
    path.pop();
}

/// Starter configuration written by `cmdhub init`
pub fn default_config() -> HubConfig {
    let echo = Command {
        description: Some("Simple echo command example".to_string()),
        ..Command::new("example-echo", "Echo Hello", "echo Hello World").with_terminal(
            TerminalConfig::new(TerminalKind::Dedicated)
                .with_name("Echo Example")
                .with_keep_open(true),
        )
    };

    let server = Command {
        description: Some("Run the development server for a selected site".to_string()),
        ..Command::new(
            "example-server",
            "Django Server",
            "docker compose run -e SITE=${input:site} --service-ports --rm django ./manage.py runserver 0.0.0.0:8000",
        )
        .with_terminal(
            TerminalConfig::new(TerminalKind::Dedicated)
                .with_name("Django Server")
                .with_keep_open(true),
        )
        .with_variable(CommandVariable {
            key: "site".to_string(),
            variable_type: "options".to_string(),
            value: "alphabuyer\nbetaseller".to_string(),
            label: Some("Site".to_string()),
            ..Default::default()
        })
    };

    let commit = Command {
        description: Some("Commit staged changes with a prompted message".to_string()),
        ..Command::new(
            "example-commit",
            "Git Commit",
            "git commit -m \"$input:helptext=\"Commit message\"\"",
        )
    };

    let deploy = Command {
        description: Some("Deploy the current branch to an environment".to_string()),
        ..Command::new("example-deploy", "Deploy", "./deploy.sh $environment $branch")
            .with_variable(CommandVariable {
                key: "branch".to_string(),
                variable_type: "input".to_string(),
                label: Some("Branch".to_string()),
                default_value: Some("main".to_string()),
                remember: true,
                ..Default::default()
            })
    };

    let mut unittest = TestRunnerConfig::new(
        "python-unittest",
        "Python unittest",
        Ecosystem::Python,
        "python -m unittest $executable_test_path",
    );
    unittest.file_name_pattern = "test_*.py".to_string();

    HubConfig {
        version: 1,
        folders: vec![Folder {
            name: "Examples".to_string(),
            icon: Some("📝".to_string()),
            commands: vec![echo, server, commit, deploy],
            ..Default::default()
        }],
        shared_lists: vec![SharedList {
            key: "environment".to_string(),
            label: "Environment".to_string(),
            options: vec!["dev".to_string(), "staging".to_string(), "prod".to_string()],
            description: Some("Deployment targets".to_string()),
        }],
        test_runners: vec![unittest],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> HubConfig {
        HubConfig {
            folders: vec![
                Folder {
                    name: "Build".to_string(),
                    commands: vec![Command::new("build", "Build", "make")],
                    subfolders: vec![Folder {
                        name: "Release".to_string(),
                        commands: vec![Command::new("release", "Release", "make release")],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Folder {
                    name: "Test".to_string(),
                    commands: vec![Command::new("test", "Test", "make test")],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_commands_are_depth_first_with_folder_path() {
        let config = nested();
        let commands = config.commands();

        let summary: Vec<(String, &str)> = commands
            .iter()
            .map(|(path, command)| (path.join("/"), command.id.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Build".to_string(), "build"),
                ("Build/Release".to_string(), "release"),
                ("Test".to_string(), "test"),
            ]
        );
    }

    #[test]
    fn test_find_command_searches_subfolders() {
        let config = nested();
        assert_eq!(
            config.find_command("release").map(|c| c.command.as_str()),
            Some("make release")
        );
        assert!(config.find_command("missing").is_none());
    }

    #[test]
    fn test_default_config_round_trips_through_json() {
        let config = default_config();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: HubConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert!(json.contains("\"sharedLists\""));
        assert!(json.contains("\"runTestCommand\""));
        assert!(parsed.test_runner("python-unittest").is_some());
    }

    #[test]
    fn test_minimal_config_deserializes() {
        let config: HubConfig = serde_json::from_str(
            r#"{
                "folders": [{
                    "name": "Tools",
                    "commands": [{
                        "id": "ls",
                        "label": "List",
                        "command": "ls $dir",
                        "terminal": { "type": "vscode-new", "name": "Tools" },
                        "variables": [{ "key": "dir", "type": "folder", "value": "" }]
                    }]
                }]
            }"#,
        )
        .unwrap();

        let command = config.find_command("ls").unwrap();
        assert_eq!(command.terminal.kind().unwrap(), TerminalKind::Dedicated);
        assert_eq!(config.version, 0);
        assert!(config.test_runners.is_empty());
    }
}
