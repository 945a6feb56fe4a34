//! CLI tests for `compiler-ide`.
//!
//! Spawns the binary and checks stdout and exit codes for successful runs,
//! failed runs and invalid invocations.

use std::process::{Command, Output};

use axum::routing::post;
use axum::{Json, Router};
use compiler_ide::core::render::ERROR_SENTINEL;
use compiler_ide::exit_codes;
use compiler_ide::io::client::RUN_PATH;
use serde_json::{Value, json};

fn compiler_ide(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_compiler-ide"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn compiler-ide")
}

async fn closed_origin() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn languages_lists_all_three() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = compiler_ide(temp.path(), &["languages"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "java\tJava\tjava\ncpp\tC++\tc_cpp\npython\tPython\tpython\n"
    );
}

#[test]
fn init_config_writes_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = compiler_ide(temp.path(), &["init-config"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let written = std::fs::read_to_string(temp.path().join(".compiler-ide/config.toml"))
        .expect("config written");
    assert!(written.contains("default_language = \"java\""));
    assert!(written.contains("http://localhost:5000"));
}

#[test]
fn invalid_endpoint_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = compiler_ide(
        temp.path(),
        &["run", "--language", "python", "--endpoint", "not-a-url"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-a-url"));
}

#[test]
fn missing_source_file_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = compiler_ide(temp.path(), &["run", "-l", "cpp", "--file", "missing.cpp"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.cpp"));
}

#[tokio::test]
async fn unreachable_service_prints_sentinel_only() {
    let temp = tempfile::tempdir().expect("tempdir");
    let origin = closed_origin().await;
    let dir = temp.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        compiler_ide(&dir, &["run", "-l", "java", "--endpoint", &origin])
    })
    .await
    .expect("join");

    assert_eq!(output.status.code(), Some(exit_codes::RUN_FAILED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, format!("{ERROR_SENTINEL}\n"));
    // Details only reach the diagnostic channel.
    assert!(String::from_utf8_lossy(&output.stderr).contains("execution failed"));
}

#[tokio::test]
async fn switching_from_untouched_default_does_not_warn() {
    let temp = tempfile::tempdir().expect("tempdir");
    let origin = closed_origin().await;
    let dir = temp.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        compiler_ide(&dir, &["run", "-l", "python", "--endpoint", &origin])
    })
    .await
    .expect("join");

    assert_eq!(output.status.code(), Some(exit_codes::RUN_FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("execution failed"), "{stderr}");
    assert!(!stderr.contains("discarded"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_prints_service_output() {
    let app = Router::new().route(
        RUN_PATH,
        post(|Json(body): Json<Value>| async move {
            let code = body["code"].as_str().unwrap_or_default().to_string();
            let input = body["input"].as_str().unwrap_or_default().to_string();
            Json(json!({ "output": format!("ran {} bytes with stdin {input}", code.len()) }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let origin = format!("http://{}", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("main.py"), "print(input())\n").expect("write source");
    let dir = temp.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        compiler_ide(
            &dir,
            &[
                "run",
                "--language",
                "python",
                "--file",
                "main.py",
                "--input",
                "7",
                "--endpoint",
                &origin,
            ],
        )
    })
    .await
    .expect("join");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "ran 15 bytes with stdin 7\n"
    );
}
