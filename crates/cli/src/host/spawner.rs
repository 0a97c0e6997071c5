use cmdhub_core::dispatch::{ProcessSpawner, SpawnRequest};
use cmdhub_core::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Launches processes with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl SystemSpawner {
    fn command_for(request: &SpawnRequest) -> Command {
        let mut command = Command::new(&request.program);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if request.verbatim {
                for arg in &request.args {
                    command.raw_arg(arg);
                }
            } else {
                command.args(&request.args);
            }
        }
        #[cfg(not(windows))]
        command.args(&request.args);

        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }
        command
    }

    /// Own console and process group on Windows; own process group on Unix.
    fn detach(command: &mut Command) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            command.creation_flags(CREATE_NEW_CONSOLE | CREATE_NEW_PROCESS_GROUP);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
    }

    fn shell_command(script: &str) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.args(["/C", script]);
            command
        } else {
            let mut command = Command::new("sh");
            command.args(["-c", script]);
            command
        }
    }
}

impl ProcessSpawner for SystemSpawner {
    fn spawn_detached(&mut self, request: &SpawnRequest) -> Result<()> {
        let mut command = Self::command_for(request);
        Self::detach(&mut command);
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::SpawnError(format!("{}: {e}", request.program)))?;
        debug!("Spawned {} (pid {})", request.program, child.id());
        Ok(())
    }

    fn run_to_completion(&mut self, script: &str, cwd: Option<&Path>) -> Result<i32> {
        let mut command = Self::shell_command(script);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        let status = command
            .status()
            .map_err(|e| Error::SpawnError(format!("{script}: {e}")))?;
        debug!("'{}' finished with {}", script, status);
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_to_completion_reports_exit_code() {
        let temp = TempDir::new().unwrap();
        let mut spawner = SystemSpawner;

        assert_eq!(spawner.run_to_completion("true", None).unwrap(), 0);
        assert_eq!(spawner.run_to_completion("exit 3", None).unwrap(), 3);
        assert_eq!(
            spawner
                .run_to_completion("test -d sub || mkdir sub", Some(temp.path()))
                .unwrap(),
            0
        );
        assert!(temp.path().join("sub").is_dir());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_spawned_process_leads_its_own_group() {
        let temp = TempDir::new().unwrap();
        let mut spawner = SystemSpawner;
        let request = SpawnRequest {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo $$ > pid.tmp && cut -d' ' -f5 /proc/$$/stat > pgid.tmp && mv pid.tmp pid && mv pgid.tmp pgid".to_string(),
            ],
            cwd: Some(temp.path().to_path_buf()),
            verbatim: false,
        };
        spawner.spawn_detached(&request).unwrap();

        let pgid_file = temp.path().join("pgid");
        for _ in 0..100 {
            if pgid_file.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        let pid = std::fs::read_to_string(temp.path().join("pid")).unwrap();
        let pgid = std::fs::read_to_string(pgid_file).unwrap();
        assert_eq!(pid.trim(), pgid.trim());
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let mut spawner = SystemSpawner;
        let request = SpawnRequest {
            program: "cmdhub-no-such-program".to_string(),
            args: vec![],
            cwd: None,
            verbatim: true,
        };
        assert!(matches!(
            spawner.spawn_detached(&request),
            Err(Error::SpawnError(_))
        ));
    }
}
