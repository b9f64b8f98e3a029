use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn repodoc_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("repodoc");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // A "cloned" repository, laid out where `clone` would put it
    let repo = root.join("output").join("git").join("demo");
    fs::create_dir_all(repo.join("node_modules").join("dep")).unwrap();
    fs::write(repo.join("a.py"), "print(1)\n").unwrap();
    fs::write(repo.join("b.py"), "print(2)\n").unwrap();
    fs::write(repo.join("notes.txt"), "not included\n").unwrap();
    fs::write(
        repo.join("node_modules").join("dep").join("index.py"),
        "vendored = True\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/repodoc.sqlite"

[output]
root = "{root}/output"

[aggregate]
include_extensions = [".py"]

[llm]
provider = "disabled"

[server]
bind = "127.0.0.1:7341"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("repodoc.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_repodoc(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = repodoc_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "repodoc=warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run repodoc binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Id of the first project printed by `repodoc projects`.
fn first_project_id(config_path: &Path) -> String {
    let (stdout, stderr, success) = run_repodoc(config_path, &["projects"]);
    assert!(success, "projects failed: {}", stderr);
    stdout
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or_else(|| panic!("no project listed: {}", stdout))
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_repodoc(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("repodoc.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_repodoc(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_repodoc(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_register_and_list_projects() {
    let (_tmp, config_path) = setup_test_env();
    run_repodoc(&config_path, &["init"]);

    let (stdout, stderr, success) = run_repodoc(
        &config_path,
        &["register", "demo", "--git-url", "https://example.com/demo.git"],
    );
    assert!(success, "register failed: {}", stderr);
    assert!(stdout.contains("Registered project demo"));

    let (stdout, _, success) = run_repodoc(&config_path, &["projects"]);
    assert!(success);
    assert!(stdout.contains("demo"));
}

#[test]
fn test_register_duplicate_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_repodoc(&config_path, &["init"]);

    let (_, _, first) = run_repodoc(&config_path, &["register", "demo"]);
    assert!(first);
    let (_, stderr, second) = run_repodoc(&config_path, &["register", "demo"]);
    assert!(!second, "duplicate register should fail");
    assert!(stderr.contains("already exists"), "stderr: {}", stderr);
}

#[test]
fn test_register_rejects_invalid_git_url() {
    let (_tmp, config_path) = setup_test_env();
    run_repodoc(&config_path, &["init"]);

    let (_, stderr, success) =
        run_repodoc(&config_path, &["register", "demo", "--git-url", "not-a-url"]);
    assert!(!success);
    assert!(stderr.contains("invalid git url"), "stderr: {}", stderr);
}

#[test]
fn test_aggregate_writes_artifact() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_repodoc(&config_path, &["aggregate", "demo"]);
    assert!(success, "aggregate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Aggregated 2 files"), "stdout: {}", stdout);

    let artifact = tmp
        .path()
        .join("output")
        .join("aggregate")
        .join("demo")
        .join("aggregated_code.txt");
    let content = fs::read_to_string(&artifact).unwrap();
    assert_eq!(
        content,
        "Path - a.py\n\nprint(1)\n---\nPath - b.py\n\nprint(2)\n---\n"
    );
}

#[test]
fn test_aggregate_is_deterministic() {
    let (tmp, config_path) = setup_test_env();
    let artifact = tmp
        .path()
        .join("output")
        .join("aggregate")
        .join("demo")
        .join("aggregated_code.txt");

    run_repodoc(&config_path, &["aggregate", "demo"]);
    let first = fs::read(&artifact).unwrap();
    run_repodoc(&config_path, &["aggregate", "demo"]);
    let second = fs::read(&artifact).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_aggregate_sanitizes_project_name() {
    let (tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_repodoc(&config_path, &["aggregate", "../../demo"]);
    assert!(success, "aggregate failed: {}", stderr);
    assert!(tmp
        .path()
        .join("output")
        .join("aggregate")
        .join("demo")
        .join("aggregated_code.txt")
        .exists());
}

#[test]
fn test_aggregate_missing_repository_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_repodoc(&config_path, &["aggregate", "ghost"]);
    assert!(!success, "aggregate of a missing repo should fail");
    assert!(stderr.contains("repository directory not found"), "stderr: {}", stderr);
}

#[test]
fn test_run_without_artifact_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_repodoc(&config_path, &["init"]);
    run_repodoc(&config_path, &["register", "demo"]);

    let (_, stderr, success) = run_repodoc(&config_path, &["run", "demo"]);
    assert!(!success);
    assert!(stderr.contains("aggregate artifact not found"), "stderr: {}", stderr);
}

#[test]
fn test_run_with_disabled_model_keeps_records_but_no_readme() {
    let (tmp, config_path) = setup_test_env();
    run_repodoc(&config_path, &["init"]);
    run_repodoc(&config_path, &["register", "demo"]);
    run_repodoc(&config_path, &["aggregate", "demo"]);

    let (_, stderr, success) = run_repodoc(&config_path, &["run", "demo"]);
    assert!(!success, "run should fail when the model is disabled");
    assert!(stderr.contains("model call failed"), "stderr: {}", stderr);
    assert!(!tmp
        .path()
        .join("output")
        .join("readme")
        .join("demo")
        .join("readme.md")
        .exists());

    // Map-stage failures were recorded per file before the reduce stage failed
    let id = first_project_id(&config_path);
    let (stdout, _, success) = run_repodoc(&config_path, &["files", &id]);
    assert!(success);
    assert!(stdout.contains("### a.py"));
    assert!(stdout.contains("### b.py"));
    assert!(stdout.contains("summary failed"));

    let (stdout, _, success) = run_repodoc(&config_path, &["readme", &id]);
    assert!(success);
    assert!(stdout.contains("No README stored"));
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config").join("bad.toml");
    fs::write(
        &bad,
        "[db]\npath = \"./x.sqlite\"\n[llm]\nprovider = \"magic\"\n",
    )
    .unwrap();

    let (_, stderr, success) = run_repodoc(&bad, &["projects"]);
    assert!(!success);
    assert!(stderr.contains("Unknown llm provider"), "stderr: {}", stderr);
}

#[test]
fn test_aggregate_rejects_invalid_config() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config").join("bad.toml");
    fs::write(
        &bad,
        "[db]\npath = \"./x.sqlite\"\n[llm]\nprovider = \"magic\"\n",
    )
    .unwrap();

    let (_, stderr, success) = run_repodoc(&bad, &["aggregate", "demo"]);
    assert!(!success, "aggregate should not fall back to defaults");
    assert!(stderr.contains("Unknown llm provider"), "stderr: {}", stderr);
}

#[test]
fn test_aggregate_without_config_file_uses_defaults() {
    let (tmp, _) = setup_test_env();
    let missing = tmp.path().join("config").join("absent.toml");

    let binary = repodoc_binary();
    let output = Command::new(&binary)
        .current_dir(tmp.path())
        .arg("--config")
        .arg(&missing)
        .args(["aggregate", "demo"])
        .env("RUST_LOG", "repodoc=warn")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(tmp
        .path()
        .join("output")
        .join("aggregate")
        .join("demo")
        .join("aggregated_code.txt")
        .exists());
}
