use std::ffi::OsStr;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};

fn olecf_vba(args: &[&OsStr]) -> Output {
    Command::new(assert_cmd::cargo::cargo_bin!("olecf-vba"))
        .args(args)
        .output()
        .expect("run olecf-vba")
}

fn write_ole(dir: &Path, name: &str, streams: &[(&str, &[u8])]) -> std::path::PathBuf {
    let mut ole = cfb::CompoundFile::create(Cursor::new(Vec::new())).expect("create cfb");
    for (path, data) in streams {
        if let Some((parent, _)) = path.rsplit_once('/') {
            ole.create_storage_all(parent).expect("create storage");
        }
        let mut stream = ole.create_stream(path).expect("create stream");
        stream.write_all(data).expect("write stream");
    }
    let bytes = ole.into_inner().into_inner();

    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

fn vba_project_stream(strings: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x0061_cccau32.to_le_bytes());
    out.extend_from_slice(&[0u8; 2 + 2 + 5 * 4 + 2]);
    out.extend_from_slice(&(strings.len() as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 2]);
    for s in strings {
        let units: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
        out.extend_from_slice(&(units.len() as u16).to_le_bytes());
        out.extend_from_slice(&units);
        out.extend_from_slice(&[0u8; 12]);
    }
    out
}

const PROJECT: &[u8] = b"ID=\"{00000000-0000-0000-0000-000000000000}\"\r\nBaseClass=UserForm1\r\n";

#[test]
fn missing_source_prints_usage_and_fails() {
    let output = olecf_vba(&[]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Source value is missing."), "{stdout}");
    assert!(stdout.contains("Usage:"), "{stdout}");
}

#[test]
fn container_without_macros_reports_no_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_ole(dir.path(), "plain.doc", &[("WordDocument", b"\x00\x01".as_slice())]);

    let output = olecf_vba(&[path.as_os_str()]);
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "No VBA stream found.\n"
    );
}

#[test]
fn unreadable_source_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.doc");

    let output = olecf_vba(&[path.as_os_str()]);
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn not_a_compound_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("text.doc");
    std::fs::write(&path, b"plain text, not a compound file").expect("write");

    let output = olecf_vba(&[path.as_os_str()]);
    assert!(!output.status.success());
}

#[test]
fn lists_performance_cache_strings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vba_project = vba_project_stream(&["ThisDocument", "UserForm1"]);
    let path = write_ole(
        dir.path(),
        "macros.doc",
        &[
            ("Macros/PROJECT", PROJECT),
            ("Macros/VBA/_VBA_PROJECT", vba_project.as_slice()),
        ],
    );

    let output = olecf_vba(&[path.as_os_str()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Base class: UserForm1\n"), "{stdout}");
    assert!(stdout.contains("String 0: ThisDocument\n"), "{stdout}");
    assert!(stdout.contains("String 1: UserForm1\n"), "{stdout}");
    assert!(!stdout.contains("No VBA stream found."));
}

#[test]
fn json_report_is_machine_readable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vba_project = vba_project_stream(&["VBAProject"]);
    let path = write_ole(
        dir.path(),
        "macros.xls",
        &[
            ("Macros/PROJECT", PROJECT),
            ("Macros/VBA/_VBA_PROJECT", vba_project.as_slice()),
        ],
    );

    let output = olecf_vba(&[OsStr::new("--json"), path.as_os_str()]);
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["stream_found"], true);
    assert_eq!(report["base_class"], "UserForm1");
    assert_eq!(report["vba_project"]["strings"][0]["text"], "VBAProject");
}

#[test]
fn debug_flag_dumps_stream_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vba_project = vba_project_stream(&[]);
    let path = write_ole(
        dir.path(),
        "macros.doc",
        &[
            ("Macros/PROJECT", PROJECT),
            ("Macros/VBA/_VBA_PROJECT", vba_project.as_slice()),
        ],
    );

    let output = olecf_vba(&[OsStr::new("--debug"), path.as_os_str()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("PROJECT stream data:\n"), "{stdout}");
    assert!(stdout.contains("_VBA_PROJECT stream data:\n0x00000000  ca cc 61 00"));
}

#[test]
fn debug_dump_goes_to_stderr_in_json_mode() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vba_project = vba_project_stream(&["VBAProject"]);
    let path = write_ole(
        dir.path(),
        "macros.doc",
        &[
            ("Macros/PROJECT", PROJECT),
            ("Macros/VBA/_VBA_PROJECT", vba_project.as_slice()),
        ],
    );

    let output = olecf_vba(&[
        OsStr::new("--json"),
        OsStr::new("--debug"),
        path.as_os_str(),
    ]);
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["vba_project"]["strings"][0]["text"], "VBAProject");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PROJECT stream data:\n"), "{stderr}");
    assert!(stderr.contains("_VBA_PROJECT stream data:\n"), "{stderr}");
}

#[test]
fn truncated_vba_project_fails_after_reporting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_ole(
        dir.path(),
        "broken.doc",
        &[
            ("Macros/PROJECT", PROJECT),
            ("Macros/VBA/_VBA_PROJECT", [0u8; 10].as_slice()),
        ],
    );

    let output = olecf_vba(&[path.as_os_str()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Base class: UserForm1\n"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("_VBA_PROJECT"), "{stderr}");
}
