//! Command-line tests for the `ddl-generator` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABLE_ROWS: &str = concat!(
    r#"{"table_name": "users", "column_name": "id", "data_type": "INTEGER", "required": true, "auto_increment": true, "primary_key": true}"#,
    "\n",
    r#"{"column_name": "name", "data_type": "VARCHAR", "length": "50", "required": true}"#,
    "\n",
);

const INDEX_ROWS: &str =
    r#"{"key_name": "idx_users_name", "table_name": "users", "column_name": "name"}"#;

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tables.jsonl"), TABLE_ROWS).unwrap();
    std::fs::write(dir.path().join("indexes.jsonl"), INDEX_ROWS).unwrap();
    dir
}

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ddl-generator").unwrap();
    cmd.current_dir(dir.path())
        // keep a user config file out of the way
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path());
    cmd
}

#[test]
fn test_generate_to_stdout() {
    let dir = fixture_dir();

    cmd(&dir)
        .args(["generate", "--tables", "tables.jsonl", "--indexes", "indexes.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/** DROP TABLE **/\n"))
        .stdout(predicate::str::contains(
            "CREATE TABLE \"users\" (\n    \"id\" SERIAL NOT NULL,\n    \"name\" VARCHAR(50) NOT NULL DEFAULT ''\n,\n\n    PRIMARY KEY (\"id\")\n);\n",
        ))
        .stdout(predicate::str::contains(
            "CREATE INDEX \"idx_users_name\" ON \"users\" (\"name\");",
        ));
}

#[test]
fn test_generate_mysql_to_file() {
    let dir = fixture_dir();
    let config = dir.path().join("builder.json");
    std::fs::write(&config, r#"{"indent": "  "}"#).unwrap();

    cmd(&dir)
        .args(["generate", "--tables", "tables.jsonl", "--dialect", "mysql", "--no-drop"])
        .arg("--config")
        .arg(&config)
        .args(["--output", "out.sql"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let script = std::fs::read_to_string(dir.path().join("out.sql")).unwrap();
    assert!(script.starts_with("/** CREATE TABLE **/\n"));
    assert!(script.contains("  `id` INTEGER NOT NULL AUTO_INCREMENT,\n"));
    assert!(!script.contains("DROP TABLE"));
}

#[test]
fn test_inspect_prints_json() {
    let dir = fixture_dir();

    let output = cmd(&dir)
        .args(["inspect", "--tables", "tables.jsonl"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let table = &json["schemas"][""]["tables"]["users"];
    assert_eq!(table["primary_key"], serde_json::json!(["id"]));
    assert_eq!(table["columns"]["name"]["length"], "50");
}

#[test]
fn test_dialects() {
    let dir = fixture_dir();

    cmd(&dir)
        .arg("dialects")
        .assert()
        .success()
        .stdout("postgres\nmysql\n");
}

#[test]
fn test_duplicate_column_fails() {
    let dir = fixture_dir();
    std::fs::write(
        dir.path().join("dup.jsonl"),
        "{\"table_name\": \"t\", \"column_name\": \"a\", \"data_type\": \"INT\"}\n{\"column_name\": \"a\", \"data_type\": \"INT\"}\n",
    )
    .unwrap();

    cmd(&dir)
        .args(["generate", "--tables", "dup.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column 'a' already exists"));
}

#[test]
fn test_bad_config_is_reported() {
    let dir = fixture_dir();
    std::fs::write(dir.path().join("bad.json"), r#"{"encoding": "klingon"}"#).unwrap();

    cmd(&dir)
        .args(["generate", "--tables", "tables.jsonl", "--config", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_unresolved_index_logs_warning() {
    let dir = fixture_dir();
    std::fs::write(
        dir.path().join("orphan.jsonl"),
        r#"{"key_name": "idx_orphan", "table_name": "missing", "column_name": "id"}"#,
    )
    .unwrap();

    cmd(&dir)
        .args(["generate", "--tables", "tables.jsonl", "--indexes", "orphan.jsonl"])
        .assert()
        .success()
        .stderr(predicate::str::contains("idx_orphan"))
        .stdout(predicate::str::contains("CREATE INDEX \"idx_orphan\""));
}
