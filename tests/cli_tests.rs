use std::io::Write;
use std::process::{Command, Stdio};
use std::str;
use tempfile::TempDir;

fn battlekeep(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_battlekeep"));
    command
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("RUST_LOG");
    command
}

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help() {
        let dir = TempDir::new().unwrap();
        let output = battlekeep(&dir).arg("--help").output().expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(output.status.success());
        assert!(stdout.contains("Usage:"));
        assert!(stdout.contains("replay"));
        assert!(stdout.contains("serve"));
        assert!(stdout.contains("config"));
    }

    #[test]
    fn test_cli_version() {
        let dir = TempDir::new().unwrap();
        let output = battlekeep(&dir)
            .args(["-q", "version"])
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(output.status.success());
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cli_replay_json() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("battle.log");
        std::fs::write(
            &log,
            "|player|p1|Alice\n|player|p2|Bob\n\
             |switch|p1a: Pikachu|Pikachu, L82|100/100\n|turn|1\n|turn|2\n",
        )
        .unwrap();

        let output = battlekeep(&dir)
            .args(["-q", "-o", "json", "replay", "battle.log", "--turn", "1"])
            .output()
            .expect("Failed to execute command");

        assert!(output.status.success());
        let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(snapshot["turn"], 1);
        assert_eq!(snapshot["pending_lines"], 1);
        assert_eq!(snapshot["sides"][0]["pokemon"][0]["species"], "pikachu");
    }

    #[test]
    fn test_cli_replay_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let output = battlekeep(&dir)
            .args(["-q", "replay", "missing.log"])
            .output()
            .expect("Failed to execute command");

        assert_eq!(output.status.code(), Some(1));
        let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");
        assert!(stderr.starts_with("Error:"));
    }

    #[test]
    fn test_cli_json_errors() {
        let dir = TempDir::new().unwrap();
        let output = battlekeep(&dir)
            .args(["-q", "-o", "json", "replay", "missing.log"])
            .output()
            .expect("Failed to execute command");

        assert_eq!(output.status.code(), Some(1));
        let error: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
        assert!(error["error"].as_str().unwrap().contains("missing.log"));
    }

    #[test]
    fn test_cli_serve() {
        let dir = TempDir::new().unwrap();
        let mut child = battlekeep(&dir)
            .args(["-q", "serve"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("Failed to spawn serve");

        {
            let stdin = child.stdin.as_mut().unwrap();
            writeln!(stdin, r#"{{"op":"start","key":"a"}}"#).unwrap();
            writeln!(stdin, r#"{{"op":"transition","key":"a","changes":"|turn|4"}}"#).unwrap();
            writeln!(stdin, r#"{{"op":"fetch","key":"a"}}"#).unwrap();
            writeln!(stdin, r#"{{"op":"fetch","key":"b"}}"#).unwrap();
        }
        drop(child.stdin.take());

        let output = child.wait_with_output().unwrap();
        assert!(output.status.success());

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        let lines: Vec<serde_json::Value> = stdout
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], serde_json::json!({"ok": true}));
        assert_eq!(lines[2]["result"]["turn"], 4);
        assert_eq!(lines[3]["error"], "Could not find session 'b'");
    }

    #[test]
    fn test_cli_config_init_and_show() {
        let dir = TempDir::new().unwrap();
        let output = battlekeep(&dir).args(["-q", "config", "init"]).output().unwrap();
        assert!(output.status.success());
        assert!(dir.path().join(".battlekeep").join("config.toml").exists());

        let output = battlekeep(&dir)
            .args(["-q", "-o", "json", "config", "show"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(config["global"]["restart_policy"], "replace");
    }
}
