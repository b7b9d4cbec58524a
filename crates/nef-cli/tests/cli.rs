//! Runs the `nef` binary the way a shell pipeline would.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

struct Nef {
    home: TempDir,
}

impl Nef {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn run(&self, args: &[&str], stdin: Option<&str>) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_nef"))
            .args(args)
            .env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .env_remove("PYCHARM_HOSTED")
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        if let Some(text) = stdin {
            let mut pipe = child.stdin.take().unwrap();
            pipe.write_all(text.as_bytes()).unwrap();
        }
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_missing_pipe_file_is_fatal() {
    let nef = Nef::new();
    let output = nef.run(&["header", "--pipe", "/definitely/not/here.nef"], None);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.starts_with("ERROR: couldn't open stream /definitely/not/here.nef"));
    assert!(stderr.ends_with("exiting...\n"));
}

#[test]
fn test_verbose_shows_causes() {
    let nef = Nef::new();
    let output = nef.run(&["--verbose", "frames", "list", "--pipe", "/definitely/not/here.nef"], None);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.contains("caused by: couldn't open stream /definitely/not/here.nef"));
    assert!(stderr.contains("ERROR: couldn't read from stdin or --pipe file\nexiting...\n"));
}

#[test]
fn test_header_creates_entry() {
    let nef = Nef::new();
    let output = nef.run(&["header", "--entry-name", "demo"], None);

    assert!(output.status.success());
    let document = stdout(&output);
    assert!(document.starts_with("data_demo\n"));
    assert!(document.contains("save_nef_nmr_meta_data"));
    assert!(document.contains("NEFPipelines"));
}

#[test]
fn test_stages_chain_through_stdin() {
    let nef = Nef::new();
    let first = nef.run(&["header", "--entry-name", "demo"], None);
    let second = nef.run(&["header"], Some(&stdout(&first)));
    let listing = nef.run(&["frames", "list", "--format", "json"], Some(&stdout(&second)));

    assert!(second.status.success());
    assert!(stdout(&second).contains("header.rs"));

    assert!(listing.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&listing)).unwrap();
    assert_eq!(value["entry"], "demo");
    assert_eq!(value["frames"][0]["name"], "nef_nmr_meta_data");
    assert_eq!(value["frames"][0]["rows"], 2);
}

#[test]
fn test_fasta_import() {
    let nef = Nef::new();
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("seq.fasta");
    std::fs::write(&fasta, ">ubq\nMQIF\nVKTL\n").unwrap();

    let output = nef.run(&["fasta", "import", "sequence", fasta.to_str().unwrap()], None);

    assert!(output.status.success(), "{}", stderr(&output));
    let document = stdout(&output);
    assert!(document.starts_with("data_ubq\n"));
    let header = document.find("save_nef_nmr_meta_data").unwrap();
    let sequence = document.find("save_nef_molecular_system").unwrap();
    assert!(header < sequence);
    assert!(document.contains("MET"));
    assert!(document.contains("fasta.rs"));
}

#[test]
fn test_config_entry_name() {
    let nef = Nef::new();
    let config = nef.home.path().join("custom.toml");
    std::fs::write(&config, "[settings]\nentry_name = \"configured\"\n").unwrap();

    let output = nef.run(&["--config", config.to_str().unwrap(), "header"], None);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("data_configured\n"));
}

#[test]
fn test_exhausted_run_history_is_fatal() {
    let nef = Nef::new();
    let document = "data_full\n\nsave_nef_nmr_meta_data\n   _nef_nmr_meta_data.sf_category   nef_nmr_meta_data\n\n   loop_\n      _nef_run_history.run_number\n\n     18446744073709551615\n\n   stop_\n\nsave_\n";
    let output = nef.run(&["header"], Some(document));

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).starts_with("ERROR: couldn't stamp NEF document: run number 18446744073709551615"));
}

#[test]
fn test_frames_list_counts_chain_residues() {
    let nef = Nef::new();
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("seq.fasta");
    std::fs::write(&fasta, ">ubq\nMQIF\n>second\nGG\n").unwrap();

    let imported = nef.run(&["fasta", "import", "sequence", fasta.to_str().unwrap()], None);
    let listing = nef.run(&["frames", "list", "--format", "json"], Some(&stdout(&imported)));

    assert!(listing.status.success(), "{}", stderr(&listing));
    let value: serde_json::Value = serde_json::from_str(&stdout(&listing)).unwrap();
    assert_eq!(value["frames"][1]["name"], "nef_molecular_system");
    assert_eq!(value["frames"][1]["chains"][0]["chain_code"], "A");
    assert_eq!(value["frames"][1]["chains"][0]["residues"], 4);
    assert_eq!(value["frames"][1]["chains"][1]["residues"], 2);
}
