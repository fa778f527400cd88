//! CLI integration tests for lucent commands.
//!
//! These tests focus on exit codes and the machine-readable outputs (names, queries and
//! request parameters), not on table layout or colors.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;

/// Configuration used by most tests.
const CONFIG: &str = r#"
root = true

[backend]
site_name = "example.org"
site_hash = "abc123"
index_id = "content"

[search]
languages = ["en"]

[field.title]
type = "text"
boost = 5.0

[field.body]
type = "text"

[field.type]
type = "string"

[field.store]
type = "location"
"#;

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a lucent command.
fn lucent() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("lucent").unwrap()
}

/// Runs `lucent` in `dir` with HOME isolated to `home`.
fn lucent_in(dir: &Path, home: &Path) -> Command {
    let mut cmd = lucent();
    cmd.current_dir(dir).env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// A working directory holding [`CONFIG`] plus a separate empty home.
struct Workspace {
    /// Directory with `.lucent.toml`.
    dir: tempfile::TempDir,
    /// Isolated home directory.
    home: tempfile::TempDir,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = temp_dir();
        fs::write(dir.path().join(".lucent.toml"), config).unwrap();
        Self {
            dir,
            home: temp_dir(),
        }
    }

    fn cmd(&self) -> Command {
        lucent_in(self.dir.path(), self.home.path())
    }
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let contents = fs::read_to_string(dir.path().join(".lucent.toml")).unwrap();
        assert!(contents.contains("# [field.title]"));
    }

    #[test]
    fn fails_if_config_exists() {
        let ws = Workspace::new("root = true\n");

        ws.cmd()
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn force_overwrites() {
        let ws = Workspace::new("existing");

        ws.cmd().args(["init", "--force"]).assert().success();

        let contents = fs::read_to_string(ws.dir.path().join(".lucent.toml")).unwrap();
        assert!(contents.contains("# [backend]"));
    }

    #[test]
    fn global_writes_to_home() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["init", "--global"])
            .assert()
            .success();

        assert!(home.path().join(".lucent.toml").exists());
        assert!(!dir.path().join(".lucent.toml").exists());
    }
}

mod check {
    use super::*;

    #[test]
    fn no_config_is_fine() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No configuration files found"));
    }

    #[test]
    fn valid_config_has_no_issues() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No issues found"))
            .stdout(predicate::str::contains("abc123"));
    }

    #[test]
    fn lists_project_and_global_files() {
        let ws = Workspace::new("[backend]\nindex_id = \"content\"\n");
        fs::write(
            ws.home.path().join(".lucent.toml"),
            "[search]\nlanguages = \"en\"\n\n[field.body]\ntype = \"text\"\n",
        )
        .unwrap();

        ws.cmd()
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("(global)"))
            .stdout(predicate::str::contains("index_id content"))
            .stdout(predicate::str::contains("languages en"));
    }

    #[test]
    fn root_file_is_marked_and_hides_global() {
        let ws = Workspace::new(CONFIG);
        fs::write(ws.home.path().join(".lucent.toml"), "# ignored\n").unwrap();

        ws.cmd()
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("(root)"))
            .stdout(predicate::str::contains("(global)").not());
    }

    #[test]
    fn warnings_fail() {
        let ws = Workspace::new("root = true\n\n[field.body]\ntype = \"text\"\n");

        ws.cmd()
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("need a language"));
    }

    #[test]
    fn parse_errors_fail() {
        let ws = Workspace::new("root = true\n\n[field.body]\ntype = \"blob\"\n");

        ws.cmd()
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains(".lucent.toml"));
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_effective_settings() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("[backend]"))
            .stdout(predicate::str::contains("site_name = \"example.org\""))
            .stdout(predicate::str::contains("[field.title]"));
    }

    #[test]
    fn broken_config_fails() {
        let ws = Workspace::new("root = \"yes\"\n");

        ws.cmd()
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}

mod fields {
    use super::*;

    #[test]
    fn table_lists_backend_names() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .arg("fields")
            .assert()
            .success()
            .stdout(predicate::str::contains("ts_X3b_en_title"))
            .stdout(predicate::str::contains("ss_type"))
            .stdout(predicate::str::contains("locs_store"));
    }

    #[test]
    fn languages_can_be_overridden() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .args(["fields", "--lang", "de", "--lang", "fr"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ts_X3b_de_body"))
            .stdout(predicate::str::contains("ts_X3b_fr_body"))
            .stdout(predicate::str::contains("ts_X3b_en_body").not());
    }

    #[test]
    fn json_output() {
        let ws = Workspace::new(CONFIG);

        let output = ws.cmd().args(["fields", "--json"]).output().unwrap();
        assert!(output.status.success());

        let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        let title = rows.iter().find(|r| r["id"] == "title").unwrap();
        assert_eq!(title["type"], "text");
        assert_eq!(title["names"][0][1], "ts_X3b_en_title");
    }
}

mod naming {
    use super::*;

    #[test]
    fn field_name_for_text() {
        lucent()
            .args(["field-name", "body", "--type", "text", "--lang", "en"])
            .assert()
            .success()
            .stdout("ts_X3b_en_body\n");
    }

    #[test]
    fn field_name_without_language() {
        lucent()
            .args(["field-name", "tags", "--type", "integer", "--multi"])
            .assert()
            .success()
            .stdout("im_tags\n");

        lucent()
            .args(["field-name", "body", "--type", "text"])
            .assert()
            .success()
            .stdout("ts_body\n");
    }

    #[test]
    fn field_name_rejects_unknown_type() {
        lucent()
            .args(["field-name", "x", "--type", "blob"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown data type"));
    }

    #[test]
    fn encode_and_decode() {
        lucent()
            .args(["encode", "field:a b"])
            .assert()
            .success()
            .stdout("field_X3a_a_X20_b\n");

        lucent()
            .args(["decode", "field_X3a_a_X20_b"])
            .assert()
            .success()
            .stdout("field:a b\n");
    }
}

mod keys {
    use super::*;

    #[test]
    fn explicit_fields() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "rust", "--field", "x", "--field", "y^2"])
            .assert()
            .success()
            .stdout("+(x:(+rust)^1 y:(+rust)^2)\n");
    }

    #[test]
    fn or_and_phrase_mode() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "a b", "--or", "--field", "x"])
            .assert()
            .success()
            .stdout("+(x:(a b)^1)\n");

        lucent_in(dir.path(), home.path())
            .args(["keys", "a b", "--mode", "phrase", "--field", "x"])
            .assert()
            .success()
            .stdout("+(x:(+\"a b\")^1)\n");
    }

    #[test]
    fn configured_fields() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .args(["keys", "rust"])
            .assert()
            .success()
            .stdout("+(ts_X3b_en_body:(+rust)^1 ts_X3b_en_title:(+rust)^5)\n");
    }

    #[test]
    fn explain_prints_tree() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "rust -java", "--explain", "--field", "x"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Parsed keys"))
            .stdout(predicate::str::contains("\"negation\": true"));
    }

    #[test]
    fn empty_keys_match_everything() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "   "])
            .assert()
            .success()
            .stdout("*:*\n");
    }

    #[test]
    fn syntax_errors_fail() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "(rust"])
            .assert()
            .failure()
            .stderr(predicate::str::starts_with("error:"));
    }

    #[test]
    fn direct_mode_inserts_raw_keys() {
        let dir = temp_dir();
        let home = temp_dir();

        lucent_in(dir.path(), home.path())
            .args(["keys", "title:rust", "--mode", "direct", "--field", "x"])
            .assert()
            .success()
            .stdout("+(x:(title:rust)^1)\n");
    }
}

mod compile {
    use super::*;

    /// A query exercising keys, a tagged OR group, a facet and a sort.
    const QUERY: &str = r#"{
        "text": "rust",
        "conditions": {
            "conjunction": "AND",
            "conditions": [{
                "conjunction": "OR",
                "tags": ["facet:type"],
                "conditions": [
                    {"field": "type", "operator": "=", "value": "article"},
                    {"field": "type", "operator": "=", "value": "page"}
                ]
            }]
        },
        "facets": [{"field": "type", "operator": "or"}],
        "sorts": [{"field": "search_api_relevance", "order": "desc"}]
    }"#;

    #[test]
    fn prints_params() {
        let ws = Workspace::new(CONFIG);
        fs::write(ws.dir.path().join("query.json"), QUERY).unwrap();

        ws.cmd()
            .args(["compile", "query.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "q=+(ts_X3b_en_body:(+rust)^1 ts_X3b_en_title:(+rust)^5)\n",
            ))
            .stdout(predicate::str::contains("fq=+index_id:content +hash:abc123\n"))
            .stdout(predicate::str::contains(
                "fq={!tag=facet:type}(ss_type:\"article\" ss_type:\"page\")\n",
            ))
            .stdout(predicate::str::contains("fq=ss_search_api_language:\"en\"\n"))
            .stdout(predicate::str::contains("sort=score desc\n"))
            .stdout(predicate::str::contains("facet.field={!ex=facet:type}ss_type\n"));
    }

    #[test]
    fn reads_stdin_and_prints_json() {
        let ws = Workspace::new(CONFIG);

        let output = ws
            .cmd()
            .args(["compile", "-", "--json"])
            .write_stdin(r#"{"limit": 3, "offset": 6}"#)
            .output()
            .unwrap();
        assert!(output.status.success());

        let request: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(request["q"], "*:*");
        assert_eq!(request["rows"], 3);
        assert_eq!(request["start"], 6);
    }

    #[test]
    fn geofilt_flag_compiles_distance_conditions() {
        let ws = Workspace::new(CONFIG);
        let query = r#"{"conditions": {"conditions": [
            {"field": "store", "operator": "<=", "value": "52.5,13.4,5"}
        ]}}"#;

        ws.cmd()
            .args(["compile", "-", "--geofilt"])
            .write_stdin(query)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "fq=_query_:\"{!geofilt sfield=locs_store pt=52.5,13.4 d=5}\"\n",
            ));

        ws.cmd()
            .args(["compile", "-"])
            .write_stdin(query)
            .assert()
            .success()
            .stdout(predicate::str::contains("geofilt").not())
            .stderr(predicate::str::contains("WARN"))
            .stderr(predicate::str::contains("location condition skipped"));
    }

    #[test]
    fn unknown_field_fails() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .args(["compile", "-"])
            .write_stdin(r#"{"conditions": {"conditions": [{"field": "nope", "operator": "=", "value": 1}]}}"#)
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown field: nope"));
    }

    #[test]
    fn invalid_json_fails() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .args(["compile", "-"])
            .write_stdin("{not json")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid query"));
    }

    #[test]
    fn missing_file_fails() {
        let ws = Workspace::new(CONFIG);

        ws.cmd()
            .args(["compile", "missing.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read"));
    }
}
