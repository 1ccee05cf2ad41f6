#![cfg(all(unix, feature = "cli"))]

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::time::Duration;

const HEADER: [u8; 8] = [0xF4, 0xF5, 0xF4, 0xF5, 0xF4, 0xF5, 0x00, 0x00];

fn command(opcode: u8) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    bytes.push(opcode);
    bytes
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/ctlstream-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn run_with_input(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ctlstream"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("CTLSTREAM_IDENTITY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("ctlstream should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input)
        .expect("input should be writable");

    child.wait_with_output().expect("ctlstream should finish")
}

fn ctlstream(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ctlstream"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("ctlstream should run")
}

#[test]
fn run_passes_plain_data_through() {
    let output = run_with_input(&["run"], b"print('hello')\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"print('hello')\n");
}

fn partial_line_reaches_stdout_before_eof(args: &[&str]) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ctlstream"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("CTLSTREAM_IDENTITY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("ctlstream should start");

    let mut stdin = child.stdin.take().expect("stdin should be piped");
    stdin.write_all(b"ab").expect("input should be writable");
    stdin.flush().expect("input should flush");

    let mut stdout = child.stdout.take().expect("stdout should be piped");
    let (tx, rx) = mpsc::channel();
    let reader = std::thread::spawn(move || {
        let mut seen = [0u8; 2];
        let result = stdout.read_exact(&mut seen).map(|()| seen);
        let _ = tx.send(result);
    });

    let seen = rx.recv_timeout(Duration::from_secs(5));
    drop(stdin);
    let status = child.wait().expect("ctlstream should finish");
    let _ = reader.join();

    let seen = seen
        .expect("data should be visible while stdin is still open")
        .expect("stdout should be readable");
    assert_eq!(&seen, b"ab");
    assert!(status.success());
}

#[test]
fn run_forwards_partial_line_while_input_open() {
    partial_line_reaches_stdout_before_eof(&["run"]);
}

#[test]
fn run_poll_forwards_partial_line_while_input_open() {
    partial_line_reaches_stdout_before_eof(&["run", "--poll", "--poll-interval", "1ms"]);
}

#[test]
fn run_answers_version_between_data() {
    let mut input = b"a".to_vec();
    input.extend_from_slice(&command(0x01));
    input.push(b'b');

    let output = run_with_input(&["run"], &input);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a0.0.0\nb");
}

#[test]
fn run_uses_identity_file() {
    let dir = unique_temp_dir("identity");
    let path = dir.join("identity.json");
    std::fs::write(&path, r#"{"platform":"rp2040","alias":"bench-1"}"#)
        .expect("identity file should be writable");

    let mut input = command(0x02);
    input.extend_from_slice(&command(0x06));
    input.extend_from_slice(&command(0x04));

    let output = run_with_input(
        &["run", "--identity", path.to_str().expect("utf-8 path")],
        &input,
    );
    assert!(output.status.success());
    assert_eq!(output.stdout, b"rp2040\nbench-1\nnone\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_with_missing_identity_fails() {
    let output = run_with_input(&["run", "--identity", "/nonexistent/identity.json"], b"");
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("identity"));
}

#[test]
fn run_reset_acknowledges_and_injects() {
    let output = run_with_input(&["run"], &command(0x08));
    assert!(output.status.success());
    assert_eq!(output.stdout, b"OK\nreset()\n");
}

#[test]
fn run_reports_executing_flag() {
    let output = run_with_input(&["run", "--executing"], &command(0x07));
    assert!(output.status.success());
    assert_eq!(output.stdout, b"T\n");
}

#[test]
fn abort_byte_stops_stream_with_130() {
    let output = run_with_input(&["run"], b"ab\x03cd");
    assert_eq!(output.status.code(), Some(130));
    assert_eq!(output.stdout, b"ab");
}

#[test]
fn abort_opcode_follows_policy() {
    let mut input = command(0x09);
    input.extend_from_slice(b"tail");

    let report = run_with_input(&["run"], &input);
    assert!(report.status.success());
    assert_eq!(report.stdout, b"FAIL\ntail");

    let halt = run_with_input(&["run", "--abort-policy", "halt"], &input);
    assert_eq!(halt.status.code(), Some(130));
    assert!(halt.stdout.is_empty());
}

#[test]
fn truncated_header_is_passed_through_at_end_of_input() {
    let output = run_with_input(&["run"], &HEADER[..5]);
    assert!(output.status.success());
    assert_eq!(output.stdout, &HEADER[..5]);
}

#[test]
fn run_poll_reads_piped_input() {
    let mut input = b"x".to_vec();
    input.extend_from_slice(&command(0x0A));

    let output = run_with_input(&["run", "--poll", "--poll-interval", "1ms"], &input);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"xOK\nrun()\n");
}

#[test]
fn run_rejects_bad_poll_interval() {
    let output = run_with_input(&["run", "--poll", "--poll-interval", "soon"], b"");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn encode_writes_wire_exact_command() {
    let output = ctlstream(&["encode", "version"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, command(0x01));
}

#[test]
fn encode_hex_with_data_prefix() {
    let output = ctlstream(&["encode", "--hex", "--data", "hi", "board"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "68 69 F4 F5 F4 F5 F4 F5 00 00 04"
    );
}

#[test]
fn encode_rejects_abort_byte() {
    let output = ctlstream(&["encode", "0x03"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn encode_output_drives_run() {
    let encoded = ctlstream(&["encode", "--data", "1+1\n", "version", "alias"]);
    assert!(encoded.status.success());

    let output = run_with_input(&["run"], &encoded.stdout);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"1+1\n0.0.0\nMyPico\n");
}

#[test]
fn opcodes_json_lists_known_table() {
    let output = ctlstream(&["--format", "json", "opcodes"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("opcodes output should be json");
    let opcodes = value["opcodes"].as_array().expect("opcodes array");
    assert_eq!(opcodes.len(), 9);
    assert_eq!(value["abort_byte"], 3);
    assert!(opcodes
        .iter()
        .any(|op| op["name"] == "reset" && op["injects"] == "reset()\\n"));
}

#[test]
fn version_prints_package_version() {
    let output = ctlstream(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
