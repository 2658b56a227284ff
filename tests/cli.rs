use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn marmoset() -> Command {
    let mut cmd = Command::cargo_bin("marmoset").expect("binary exists");
    cmd.env_remove("MARMOSET_LOG");
    cmd
}

#[test]
fn run_quickstart_demo() {
    marmoset()
        .arg("run")
        .arg("demos/quickstart.mr")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello from Marmoset!"))
        .stdout(predicate::str::contains("[1, 4, 9, 16, 25]"))
        .stdout(predicate::str::contains("Ada is 36"));
}

#[test]
fn run_loops_demo() {
    marmoset()
        .arg("run")
        .arg("demos/loops.mr")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[1, 2, Fizz, 4, Buzz, Fizz, 7, 8, Fizz, Buzz, 11, Fizz, 13, 14, FizzBuzz]",
        ))
        .stdout(predicate::str::contains("[20, 30]"));
}

#[test]
fn runtime_error_fails_the_run() {
    marmoset()
        .arg("run")
        .arg("demos/failing.mr")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unreachable").not())
        .stderr(predicate::str::contains(
            "ERROR: type mismatch: INTEGER + BOOLEAN",
        ));
}

#[test]
fn eval_prints_the_result() {
    marmoset()
        .arg("eval")
        .arg("let xs = [1, 2, 3]; len(xs) * 2")
        .assert()
        .success()
        .stdout("6\n");
}

#[test]
fn eval_reports_parse_errors() {
    marmoset()
        .arg("eval")
        .arg("let = 1;")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parser errors:"))
        .stderr(predicate::str::contains(
            "expected next token to be IDENT, got = instead",
        ));
}

#[test]
fn run_script_from_temp_dir() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("counter.mr");
    fs::write(
        &script,
        "let count = fn(n) { if (n == 0) { return 0; } 1 + count(n - 1) };\nputs(count(25));\n",
    )
    .expect("write script");

    marmoset()
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout("25\n");
}

#[test]
fn missing_script_is_an_io_error() {
    let dir = tempdir().expect("create temp dir");
    marmoset()
        .arg("run")
        .arg(dir.path().join("absent.mr"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn verbose_flag_logs_pipeline_stages() {
    marmoset()
        .arg("--verbose")
        .arg("eval")
        .arg("1 + 1")
        .assert()
        .success()
        .stdout("2\n")
        .stderr(predicate::str::contains("parsed program"));
}
