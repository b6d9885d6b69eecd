//! Integration tests for dbseed

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn dbseed() -> Command {
        let mut cmd = cargo_bin_cmd!("dbseed");
        cmd.env_remove("DBSEED_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        dbseed()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("template cache"));
    }

    #[test]
    fn version_displays() {
        dbseed()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("dbseed"));
    }

    #[test]
    fn cache_help() {
        dbseed()
            .args(["cache", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("purge"))
            .stdout(predicate::str::contains("trim"));
    }

    #[test]
    fn config_path() {
        dbseed()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        dbseed()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("prefix = \"cache\""));
    }

    #[test]
    fn config_init_and_show_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        dbseed()
            .args(["--config", config_path.to_str().unwrap(), "config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("initialized"));

        dbseed()
            .args(["--config", config_path.to_str().unwrap(), "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[builder]"));
    }

    #[test]
    fn config_set_rejects_bad_number() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        dbseed()
            .args([
                "--config",
                config_path.to_str().unwrap(),
                "config",
                "set",
                "cache.max_size",
                "lots",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid number"));
    }

    // Validation happens before any store connection, so these run
    // without a server.

    #[test]
    fn new_rejects_invalid_database_name() {
        dbseed()
            .args(["new", "-n", "1bad name"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid database name"));
    }

    #[test]
    fn new_rejects_invalid_cache_prefix() {
        dbseed()
            .args(["new", "-n", "testdb", "--cache-prefix", "waytoolong"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache prefix"));
    }

    #[test]
    fn new_rejects_unknown_component() {
        let temp = TempDir::new().unwrap();
        let roots = temp.path().join("components");
        fs::create_dir_all(&roots).unwrap();

        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            format!("[catalog]\nroots = [{:?}]\n", roots.to_str().unwrap()),
        )
        .unwrap();

        dbseed()
            .args([
                "--config",
                config_path.to_str().unwrap(),
                "new",
                "-n",
                "testdb",
                "-m",
                "ghost",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Component not found: ghost"));
    }

    #[test]
    fn new_without_database_and_no_cache_does_nothing() {
        dbseed()
            .args(["new", "--no-cache"])
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to do"));
    }

    #[test]
    fn new_without_builder_command_fails() {
        // Cache disabled forces the fresh-build path, which needs
        // builder.command configured
        dbseed()
            .args(["new", "-n", "testdb", "--no-cache"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("builder.command"));
    }
}
