use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap().parent().unwrap().to_path_buf()
}

fn ppl() -> Command {
    let mut cmd = Command::cargo_bin("ppl").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("PPL_PROGRAM")
        .env_remove("PPL_EXIT_LABEL")
        .env_remove("PPL_LENIENT")
        .env_remove("PPL_SATURATING")
        .env_remove("PPL_MAX_DEPTH")
        .env_remove("PPL_REJECT_UNKNOWN");
    cmd
}

fn program(name: &str) -> PathBuf {
    workspace_root().join("programs").join(name)
}

#[test]
fn runs_sum_program() {
    ppl()
        .arg(program("sum.ppl"))
        .args(["-x", "5", "-x", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 8"));
}

#[test]
fn runs_countdown_program() {
    ppl()
        .arg(program("countdown.ppl"))
        .args(["-x", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 4"))
        .stdout(predicate::str::contains("x1 = 0"));
}

#[test]
fn runs_mutually_recursive_macros() {
    ppl()
        .arg(program("even.ppl"))
        .args(["-x", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));

    ppl()
        .arg(program("even.ppl"))
        .args(["-x", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 0"));
}

#[test]
fn defaults_to_program_ppl_in_working_directory() {
    ppl()
        .current_dir(workspace_root().join("programs"))
        .args(["-x", "1", "-x", "2", "-x", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 7"));

    ppl()
        .current_dir(workspace_root().join("programs"))
        .args(["-x", "1", "-x", "2", "-x", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 6"));
}

#[test]
fn prints_json_report() {
    let output = ppl()
        .arg(program("sum.ppl"))
        .args(["-x", "2", "-x", "2", "--json", "--stats"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["y"], 4);
    assert_eq!(report["registers"]["x1"], 2);
    assert_eq!(report["registers"]["y"], 4);
    assert_eq!(report["stats"]["invocations"], 1);
    assert_eq!(report["stats"]["programs_loaded"], 1);
}

#[test]
fn extra_registers_from_set() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("inc.ppl");
    std::fs::write(&path, "y <- acc + 1\n").unwrap();

    ppl()
        .arg(&path)
        .args(["--set", "acc=41"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 42"));
}

#[test]
fn missing_file_is_nonzero() {
    let tmp_dir = tempfile::tempdir().unwrap();
    ppl()
        .arg(tmp_dir.path().join("nope.ppl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn runtime_error_shows_location() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("bad.ppl");
    std::fs::write(&path, "program (0)\ny <- 0\ny <- z + 1\n").unwrap();

    ppl()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Runtime error"))
        .stderr(predicate::str::contains("bad.ppl:3"))
        .stderr(predicate::str::contains("y <- z + 1"));
}

#[test]
fn lenient_mode_skips_bad_instructions() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("bad.ppl");
    std::fs::write(&path, "y <- 0\ny <- z + 1\ngoto nowhere\ny <- y + 1\n").unwrap();

    ppl()
        .arg(&path)
        .arg("--lenient")
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));
}

#[test]
fn load_error_for_reserved_label() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("reserved.ppl");
    std::fs::write(&path, "y <- 0\n[e]\ny <- y + 1\n").unwrap();

    ppl()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Load error"));

    ppl()
        .arg(&path)
        .args(["--exit-label", "done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));
}

#[test]
fn saturating_flag_clamps_at_zero() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("dec.ppl");
    std::fs::write(&path, "y <- 0\ny <- y - 1\n").unwrap();

    ppl()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("y = -1"));

    ppl()
        .arg(&path)
        .arg("--saturating")
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 0"));
}

#[test]
fn recursion_limit_is_reported() {
    let tmp_dir = tempfile::tempdir().unwrap();
    std::fs::write(tmp_dir.path().join("f.ppl"), "g function g.ppl\nprogram (1)\ny <- g(x1)\n").unwrap();
    std::fs::write(tmp_dir.path().join("g.ppl"), "f function f.ppl\nprogram (1)\ny <- f(x1)\n").unwrap();
    std::fs::write(tmp_dir.path().join("main.ppl"), "f function f.ppl\nprogram (1)\ny <- f(x1)\n").unwrap();

    ppl()
        .arg(tmp_dir.path().join("main.ppl"))
        .args(["-x", "1", "--max-depth", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum nesting depth"));
}

#[test]
fn unrecognized_lines_are_no_ops_unless_rejected() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("odd.ppl");
    std::fs::write(&path, "program (0)\ny <- 0\nfoo bar\ny <- nope(y)\ny <- y + 1\n").unwrap();

    ppl()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));

    ppl()
        .arg(&path)
        .arg("--reject-unknown")
        .assert()
        .failure()
        .stderr(predicate::str::contains("odd.ppl:3"));
}

#[test]
fn deep_recursion_under_the_default_limit() {
    ppl()
        .arg(program("even.ppl"))
        .args(["-x", "250"])
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));

    ppl()
        .arg(program("even.ppl"))
        .args(["-x", "5000", "--max-depth", "100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum nesting depth of 4096"));
}
