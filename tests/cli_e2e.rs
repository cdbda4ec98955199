//! End-to-end tests for the `script-guard` binary.
//!
//! Every run uses a cleared environment, a temp HOME/XDG config dir and a temp
//! working directory (marked as a repo root) so user and system configs never
//! leak in.
//!
//! # Running
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn script_guard_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_script-guard"))
}

/// Isolated working directory for one test.
struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join(".git")).expect("failed to create .git dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("failed to create HOME dir");
        std::fs::create_dir_all(dir.path().join("xdg_config"))
            .expect("failed to create XDG_CONFIG_HOME dir");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, content).expect("failed to write fixture");
        path
    }

    fn run(&self, args: &[&str], stdin: &str) -> Output {
        self.run_with_env(args, stdin, &[])
    }

    fn run_with_env(&self, args: &[&str], stdin: &str, env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(script_guard_binary());
        cmd.env_clear()
            .env("HOME", self.path().join("home"))
            .env("XDG_CONFIG_HOME", self.path().join("xdg_config"))
            .current_dir(self.path())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().expect("failed to spawn script-guard");
        {
            // The child may exit before reading (usage errors); a broken pipe is fine.
            let mut pipe = child.stdin.take().expect("failed to open stdin");
            let _ = pipe.write_all(stdin.as_bytes());
        }
        child.wait_with_output().expect("failed to wait for script-guard")
    }
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_of(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!("stdout is not JSON ({e}): {}", stdout_of(output));
    })
}

// ============================================================================
// check
// ============================================================================

mod check_tests {
    use super::*;

    #[test]
    fn red_script_reports_critical_pretty() {
        let sb = Sandbox::new();
        sb.write("wipe.sh", "rm -rf /\n");
        let output = sb.run(&["check", "wipe.sh"], "");
        let stdout = stdout_of(&output);

        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
        assert!(stdout.contains("Risk: RED"), "stdout: {stdout}");
        assert!(stdout.contains("⛔ CRITICAL: Attempts to delete entire filesystem"));
        assert!(stdout.contains("🟡 CAUTION: "));
    }

    #[test]
    fn fail_on_red_exits_3() {
        let sb = Sandbox::new();
        sb.write("wipe.sh", "rm -rf /\n");
        let output = sb.run(&["check", "wipe.sh", "--fail-on", "red"], "");
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn fail_on_threshold_is_inclusive() {
        let sb = Sandbox::new();
        sb.write("clean.sh", "#!/bin/bash\nrm -rf ./old_logs\n");
        let yellow = sb.run(&["check", "clean.sh", "--fail-on", "yellow"], "");
        assert_eq!(yellow.status.code(), Some(3));
        let red = sb.run(&["check", "clean.sh", "--fail-on", "red"], "");
        assert_eq!(red.status.code(), Some(0));
    }

    #[test]
    fn stdin_json_with_explicit_kind() {
        let sb = Sandbox::new();
        let output = sb.run(
            &["check", "--kind", "powershell", "--format", "json"],
            "$currentTime = Get-Date -Format \"HH:mm:ss\"",
        );
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));

        let report = json_of(&output);
        assert_eq!(report["schema_version"], 1);
        assert_eq!(report["file"], "-");
        assert_eq!(report["kind"], "powershell");
        assert_eq!(report["risk"], "green");
        assert_eq!(report["confirmation"], "light");
        assert_eq!(report["warnings"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn kind_is_inferred_from_extension() {
        let sb = Sandbox::new();
        sb.write("reboot.ps1", "shutdown /s /t 0");
        let output = sb.run(&["check", "reboot.ps1", "--format", "json"], "");
        let report = json_of(&output);

        assert_eq!(report["kind"], "powershell");
        assert_eq!(report["risk"], "red");
        assert_eq!(report["counts"]["high"], 1);
        assert_eq!(report["counts"]["info"], 1);
        assert_eq!(report["warnings"][0]["tier"], "high");
    }

    #[test]
    fn missing_file_is_an_error() {
        let sb = Sandbox::new();
        let output = sb.run(&["check", "nope.sh"], "");
        assert_eq!(output.status.code(), Some(1));
        let stderr = stderr_of(&output);
        assert!(stderr.contains("Error:"), "stderr: {stderr}");
        assert!(stderr.contains("nope.sh"));
    }

    #[test]
    fn unknown_kind_is_a_usage_error() {
        let sb = Sandbox::new();
        let output = sb.run(&["check", "--kind", "cobol"], "echo hi");
        assert_eq!(output.status.code(), Some(2));
    }
}

// ============================================================================
// --confirm
// ============================================================================

mod confirm_tests {
    use super::*;

    #[test]
    fn red_script_requires_typed_yes() {
        let sb = Sandbox::new();
        sb.write("down.sh", "#!/bin/bash\nshutdown -h now\n");

        let approved = sb.run(&["check", "down.sh", "--confirm"], "yes\n");
        assert_eq!(approved.status.code(), Some(0));
        assert!(stderr_of(&approved).contains("Type 'yes'"));

        let short = sb.run(&["check", "down.sh", "--confirm"], "y\n");
        assert_eq!(short.status.code(), Some(4));
    }

    #[test]
    fn yellow_script_accepts_y() {
        let sb = Sandbox::new();
        sb.write("clean.sh", "#!/bin/bash\nrm -rf ./old_logs\n");
        let output = sb.run(&["check", "clean.sh", "--confirm"], "y\n");
        assert_eq!(output.status.code(), Some(0));
        assert!(stderr_of(&output).contains("[y/N]"));
    }

    #[test]
    fn end_of_input_refuses() {
        let sb = Sandbox::new();
        sb.write("clean.sh", "#!/bin/bash\nrm -rf ./old_logs\n");
        let output = sb.run(&["check", "clean.sh", "--confirm"], "");
        assert_eq!(output.status.code(), Some(4));
    }

    #[test]
    fn green_script_needs_no_answer() {
        let sb = Sandbox::new();
        sb.write("info.ps1", "Get-ChildItem | Select-Object Name, Length");
        let output = sb.run(&["check", "info.ps1", "--confirm"], "");
        assert_eq!(output.status.code(), Some(0));
        assert!(!stderr_of(&output).contains("[y/N]"));
    }
}

// ============================================================================
// configuration
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn explicit_config_adds_custom_rule() {
        let sb = Sandbox::new();
        sb.write(
            "guard.toml",
            r#"
[[rules.custom]]
pattern = "terraform destroy"
tier = "critical"
message = "Destroys managed infrastructure"
"#,
        );
        sb.write("infra.sh", "#!/bin/bash\nterraform destroy -auto-approve\n");
        let output = sb.run(
            &["check", "infra.sh", "--config", "guard.toml", "--format", "json"],
            "",
        );
        let report = json_of(&output);
        assert_eq!(report["risk"], "red");
        assert_eq!(
            report["warnings"][0]["message"],
            "Destroys managed infrastructure"
        );
    }

    #[test]
    fn project_config_is_discovered() {
        let sb = Sandbox::new();
        sb.write(".script-guard.toml", "[rules]\ndisabled = [\"shutdown\"]\n");
        sb.write("down.sh", "#!/bin/bash\nshutdown -h now\n");
        let output = sb.run(&["check", "down.sh", "--format", "json"], "");
        let report = json_of(&output);
        assert_eq!(report["risk"], "green");
    }

    #[test]
    fn invalid_project_config_is_ignored() {
        let sb = Sandbox::new();
        sb.write(".script-guard.toml", "this is = = not toml");
        sb.write("down.sh", "#!/bin/bash\nshutdown -h now\n");
        let output = sb.run(&["check", "down.sh", "--format", "json"], "");
        assert_eq!(output.status.code(), Some(0));
        assert_eq!(json_of(&output)["risk"], "red");
    }

    #[test]
    fn env_disable_list_applies() {
        let sb = Sandbox::new();
        sb.write("down.sh", "#!/bin/bash\nshutdown -h now\n");
        let output = sb.run_with_env(
            &["check", "down.sh", "--format", "json"],
            "",
            &[("SCRIPT_GUARD_DISABLE", "halt, shutdown")],
        );
        assert_eq!(json_of(&output)["risk"], "green");
    }

    #[test]
    fn env_kind_sets_default_kind() {
        let sb = Sandbox::new();
        let output = sb.run_with_env(
            &["check", "--format", "json"],
            "Get-Process | Sort-Object CPU",
            &[("SCRIPT_GUARD_KIND", "pwsh")],
        );
        let report = json_of(&output);
        assert_eq!(report["kind"], "powershell");
        assert_eq!(report["counts"]["info"], 0);
    }

    #[test]
    fn decision_log_is_written() {
        let sb = Sandbox::new();
        sb.write("wipe.sh", "rm -rf /\n");
        let log = sb.path().join("logs").join("decisions.log");
        let log_str = log.to_string_lossy().into_owned();
        let output = sb.run_with_env(
            &["check", "wipe.sh"],
            "",
            &[("SCRIPT_GUARD_LOG_FILE", log_str.as_str())],
        );
        assert_eq!(output.status.code(), Some(0));

        let content = std::fs::read_to_string(&log).expect("log file should exist");
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("RED posix_shell wipe.sh"));
    }

    #[test]
    fn init_writes_sample_and_refuses_overwrite() {
        let sb = Sandbox::new();
        let first = sb.run(&["init", "--output", "sample.toml"], "");
        assert_eq!(first.status.code(), Some(0));
        let sample = std::fs::read_to_string(sb.path().join("sample.toml")).unwrap();
        assert!(sample.contains("[heuristics]"));

        let second = sb.run(&["init", "--output", "sample.toml"], "");
        assert_eq!(second.status.code(), Some(1));
        assert!(stderr_of(&second).contains("--force"));

        let forced = sb.run(&["init", "--output", "sample.toml", "--force"], "");
        assert_eq!(forced.status.code(), Some(0));
    }

    #[test]
    fn config_prints_effective_toml() {
        let sb = Sandbox::new();
        let output = sb.run(&["config"], "");
        let stdout = stdout_of(&output);
        assert_eq!(output.status.code(), Some(0));
        assert!(stdout.contains("[general]"));
        assert!(stdout.contains("default_kind = \"posix_shell\""));
    }

    #[test]
    fn patterns_lists_one_tier() {
        let sb = Sandbox::new();
        let output = sb.run(&["patterns", "--tier", "high"], "");
        let stdout = stdout_of(&output);
        assert_eq!(output.status.code(), Some(0));
        assert!(stdout.contains("- shutdown : Will shutdown the system"));
        assert!(!stdout.contains("rm -rf"));
    }
}
