//! Integration tests for runx

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated home for one test: its own cache root and config file
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cache_root(&self) -> PathBuf {
        self.path().join("envs")
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn runx(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("runx");
        cmd.env("RUNX_CACHE_DIR", self.cache_root())
            .env("RUNX_CONFIG", self.config_path())
            .env_remove("RUST_LOG")
            .env_remove("NODE_PATH");
        cmd
    }
}

mod cli_tests {
    use super::*;

    #[test]
    fn help_displays() {
        Sandbox::new()
            .runx()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("inline dependencies"))
            .stdout(predicate::str::contains("--clean"));
    }

    #[test]
    fn version_displays() {
        Sandbox::new()
            .runx()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn no_arguments_is_usage_error() {
        Sandbox::new().runx().assert().failure();
    }

    #[test]
    fn missing_script() {
        Sandbox::new()
            .runx()
            .arg("does-not-exist.ts")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("File not found: does-not-exist.ts"));
    }

    #[test]
    fn invalid_metadata() {
        let sandbox = Sandbox::new();
        let script = sandbox.write("broken.ts", "/** @runx {\"dependencies\": } */\n");

        sandbox
            .runx()
            .arg(&script)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid JSON in @runx metadata"));
    }

    #[test]
    fn unknown_alias_lists_available() {
        let sandbox = Sandbox::new();
        let script = sandbox.write(
            "tool.ts",
            "/**\n * @runx {\"scripts\": {\"many\": \"--count 10\", \"few\": \"--count 3\"}}\n */\n",
        );

        sandbox
            .runx()
            .arg(format!("{}:missing", script.display()))
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "Script alias 'missing' not found. Available: few, many",
            ));
    }

    #[test]
    fn invalid_config_is_reported() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.config_path(), "[runtime\n").unwrap();
        let script = sandbox.write("plain.ts", "console.log(1)\n");

        sandbox
            .runx()
            .arg(&script)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

mod clean_tests {
    use super::*;

    #[test]
    fn clean_empty_cache() {
        Sandbox::new()
            .runx()
            .arg("--clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is already empty."));
    }

    #[test]
    fn clean_counts_environments() {
        let sandbox = Sandbox::new();
        let root = sandbox.cache_root();
        std::fs::create_dir_all(root.join("hello-0123456789abcdef/node_modules")).unwrap();
        std::fs::create_dir_all(root.join("other-fedcba9876543210")).unwrap();
        std::fs::create_dir_all(root.join(".locks")).unwrap();

        sandbox
            .runx()
            .arg("--clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleaned 2 cached environment(s)."));
        assert!(!root.exists());
    }
}

/// End-to-end runs with `sh` standing in for the installer and executor
#[cfg(unix)]
mod run_tests {
    use super::*;

    /// Shell script whose leading doc comment is hidden from `sh`
    fn shell_script(metadata: &str, body: &str) -> String {
        format!("#!/bin/sh\n: '\n/**\n * @runx {metadata}\n */\n'\n{body}\n")
    }

    fn sh_config(sandbox: &Sandbox, installer_command: &str) {
        let config = format!(
            "[runtime]\nexecutor = 'sh'\nexecutor_args = []\ninstaller = 'sh'\ninstaller_args = ['-c', '{installer_command}']\n"
        );
        std::fs::write(sandbox.config_path(), config).unwrap();
    }

    #[test]
    fn args_follow_defaults_alias_then_user() {
        let sandbox = Sandbox::new();
        sh_config(&sandbox, "mkdir node_modules");
        let script = sandbox.write(
            "args.sh",
            &shell_script(
                r#"{"args": ["base"], "scripts": {"dev": "alias-one alias-two"}}"#,
                "for a in \"$@\"; do echo \"arg=$a\"; done",
            ),
        );

        sandbox
            .runx()
            .arg(format!("{}:dev", script.display()))
            .args(["user", "--flag"])
            .assert()
            .success()
            .stdout("arg=base\narg=alias-one\narg=alias-two\narg=user\narg=--flag\n");
    }

    #[test]
    fn env_overrides_and_exit_code() {
        let sandbox = Sandbox::new();
        sh_config(&sandbox, "mkdir node_modules");
        let script = sandbox.write(
            "env.sh",
            &shell_script(
                r#"{"env": {"GREETING": "from-metadata"}}"#,
                "echo \"GREETING=$GREETING\"\nexit 7",
            ),
        );

        sandbox
            .runx()
            .arg(&script)
            .env("GREETING", "from-shell")
            .assert()
            .code(7)
            .stdout("GREETING=from-metadata\n");
    }

    #[test]
    fn installs_once_and_reuses_environment() {
        let sandbox = Sandbox::new();
        let log = sandbox.path().join("installs.log");
        sh_config(
            &sandbox,
            &format!("mkdir node_modules && echo installed >> {}", log.display()),
        );
        let script = sandbox.write(
            "deps.sh",
            &shell_script(
                r#"{"dependencies": {"chalk": "5.3.0"}}"#,
                "echo \"NODE_PATH=$NODE_PATH\"",
            ),
        );
        let root = sandbox.cache_root();

        for _ in 0..2 {
            sandbox
                .runx()
                .arg(&script)
                .assert()
                .success()
                .stdout(predicate::str::contains(format!(
                    "NODE_PATH={}/deps-",
                    root.display()
                )))
                .stdout(predicate::str::contains("/node_modules"));
        }

        let installs = std::fs::read_to_string(&log).unwrap();
        assert_eq!(installs.lines().count(), 1);

        let entries: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(root.join(&entries[0]).join("package.json").is_file());
    }

    #[test]
    fn failed_install_leaves_no_entry() {
        let sandbox = Sandbox::new();
        sh_config(&sandbox, "exit 3");
        let script = sandbox.write(
            "deps.sh",
            &shell_script(r#"{"dependencies": {"chalk": "5.3.0"}}"#, "echo ran"),
        );

        sandbox
            .runx()
            .arg(&script)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("ran").not())
            .stderr(predicate::str::contains("exit code 3"));

        let root = sandbox.cache_root();
        let leftovers = std::fs::read_dir(&root)
            .unwrap()
            .filter(|e| {
                !e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with('.')
            })
            .count();
        assert_eq!(leftovers, 0);
    }
}
