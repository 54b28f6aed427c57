//! Integration tests for stagepath

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn stagepath() -> Command {
        cargo_bin_cmd!("stagepath")
    }

    /// Config mounting hdfs://nn1 onto `<temp>/nn1`
    fn write_config(temp: &TempDir) -> std::path::PathBuf {
        let root = temp.path().join("nn1");
        std::fs::create_dir_all(root.join("warehouse/db/tbl")).unwrap();

        let path = temp.path().join("config.toml");
        let content = format!(
            "[staging]\ndir = \".staging\"\n\n[[mounts]]\nuri = \"hdfs://nn1\"\nroot = {:?}\n",
            root.display().to_string()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn isolated(config: &Path) -> Command {
        let mut cmd = stagepath();
        cmd.arg("--no-local").arg("--config").arg(config);
        cmd
    }

    #[test]
    fn help_displays() {
        stagepath()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Staging-path allocator"));
    }

    #[test]
    fn version_displays() {
        stagepath()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stagepath"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("custom.toml");
        isolated(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("missing.toml");
        isolated(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[staging]"))
            .stdout(predicate::str::contains("_tmp.ext."));
    }

    #[test]
    fn config_init_then_set() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");

        isolated(&config).args(["config", "init"]).assert().success();
        isolated(&config)
            .args(["config", "set", "staging.dir", ".hive-staging"])
            .assert()
            .success();

        let content = std::fs::read_to_string(&config).unwrap();
        assert!(content.contains(".hive-staging"));
    }

    #[test]
    fn allocate_prints_unique_paths() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);

        isolated(&config)
            .args([
                "allocate",
                "--format",
                "plain",
                "--unit",
                "task-1",
                "hdfs://nn1/warehouse/db/tbl",
                "hdfs://nn1/warehouse/db/tbl",
            ])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "hdfs://nn1/warehouse/db/tbl/.staging_stagepath_",
            ))
            .stdout(predicate::str::contains("-task-1/_tmp.ext.10001\n"))
            .stdout(predicate::str::contains("-task-1/_tmp.ext.10002\n"));

        // Cleaned up on exit
        let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("nn1/warehouse/db/tbl"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn allocate_keep_leaves_staging_dir() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);

        isolated(&config)
            .args(["allocate", "--keep", "--unit", "u1", "hdfs://nn1/warehouse/db/tbl"])
            .assert()
            .success();

        let kept: Vec<String> = std::fs::read_dir(temp.path().join("nn1/warehouse/db/tbl"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].starts_with(".staging_"));
        assert!(kept[0].ends_with("-u1"));
    }

    #[test]
    fn allocate_json_output() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);

        let output = isolated(&config)
            .args(["allocate", "-f", "json", "hdfs://nn1/warehouse/db/tbl"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed[0]["destination"], "hdfs://nn1/warehouse/db/tbl");
        assert!(parsed[0]["tmp_path"]
            .as_str()
            .unwrap()
            .ends_with("/_tmp.ext.10001"));
    }

    #[test]
    fn allocate_rejects_unqualified_path() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);

        isolated(&config)
            .args(["allocate", "/warehouse/db/tbl"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Malformed path"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn allocate_unmounted_namespace_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);

        isolated(&config)
            .args(["allocate", "s3://bucket/out"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("No filesystem client"));
    }

    #[test]
    fn invalid_config_exits_with_one() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "[staging]\ndir = \"/abs\"\n").unwrap();

        isolated(&config)
            .args(["allocate", "hdfs://nn1/t"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn allocate_escaped_destination() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp);
        std::fs::create_dir_all(temp.path().join("nn1/ware house")).unwrap();

        isolated(&config)
            .args(["allocate", "--keep", "-f", "plain", "--unit", "u1"])
            .arg("hdfs://nn1/ware%20house")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("hdfs://nn1/ware house/.staging_"));

        let staged: Vec<_> = std::fs::read_dir(temp.path().join("nn1/ware house"))
            .unwrap()
            .collect();
        assert_eq!(staged.len(), 1);
        assert!(!temp.path().join("nn1/ware%20house").exists());
    }
}
