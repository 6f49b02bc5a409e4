use std::io::Write;
use std::process::Command;

fn run(args: &[&str]) -> (String, String, bool) {
    let bin = env!("CARGO_BIN_EXE_querylens");
    let output = Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_cli_plain() {
    let (stdout, _, ok) = run(&["tests/fixtures/seed.ts"]);
    assert!(ok);
    assert!(stdout.contains("user.findMany"));
    assert!(stdout.contains("$queryRaw"));
}

#[test]
fn test_cli_json_with_filter() {
    let (stdout, _, ok) = run(&["tests/fixtures/seed.ts", "--json", "--filter", "^post\\."]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let queries = value["files"][0]["queries"].as_array().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["operation"], "create");
}

#[test]
fn test_cli_client_class_flag() {
    let (stdout, _, ok) = run(&["tests/fixtures/seed.ts", "--client-class", "PrismaClient"]);
    assert!(ok);
    assert!(stdout.is_empty());
}

#[test]
fn test_cli_config_file() {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(br#"{ "clientClass": "Nope" }"#).unwrap();
    f.flush().unwrap();

    let (stdout, _, ok) = run(&["tests/fixtures/seed.ts", "--config", f.path().to_str().unwrap()]);
    assert!(ok);
    assert!(stdout.is_empty());
}

#[test]
fn test_cli_bad_config_fails() {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(b"{ not json").unwrap();
    f.flush().unwrap();

    let (_, stderr, ok) = run(&["tests/fixtures/seed.ts", "--config", f.path().to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("Invalid config"));
}

#[test]
fn test_cli_missing_path_fails() {
    let (_, stderr, ok) = run(&["does/not/exist.ts"]);
    assert!(!ok);
    assert!(stderr.contains("Path not found"));
}
