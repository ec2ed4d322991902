use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_moodclassd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn moodclassd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn err_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
}

#[test]
fn default_pin_unlocks_and_can_rotate() {
    let workspace = temp_dir("moodclass-pin");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let bad = request(
        &mut stdin,
        &mut reader,
        "2",
        "panel.unlock",
        json!({ "pin": "0000" }),
    );
    assert_eq!(bad.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(err_code(&bad), "bad_pin");

    let granted = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "panel.unlock",
        json!({ "pin": "1234" }),
    );
    assert_eq!(granted.get("granted").and_then(|v| v.as_bool()), Some(true));

    // Rotation requires the current PIN.
    let bad = request(
        &mut stdin,
        &mut reader,
        "4",
        "panel.set_pin",
        json!({ "pin": "9999", "newPin": "4321" }),
    );
    assert_eq!(err_code(&bad), "bad_pin");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "panel.set_pin",
        json!({ "pin": "1234", "newPin": "4321" }),
    );

    let stale = request(
        &mut stdin,
        &mut reader,
        "6",
        "panel.unlock",
        json!({ "pin": "1234" }),
    );
    assert_eq!(err_code(&stale), "bad_pin");
    let granted = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "panel.unlock",
        json!({ "pin": "4321" }),
    );
    assert_eq!(granted.get("granted").and_then(|v| v.as_bool()), Some(true));

    // The rotated PIN survives reopening the workspace.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let granted = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "panel.unlock",
        json!({ "pin": "4321" }),
    );
    assert_eq!(granted.get("granted").and_then(|v| v.as_bool()), Some(true));

    drop(stdin);
    let _ = child.wait();
}
