#![allow(dead_code)]

use assert_cmd::Command;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;
use std::path::Path;

pub fn tiger() -> Command {
    Command::cargo_bin("tiger").expect("tiger binary should be built")
}

pub fn init_repository(dir: &Path) {
    tiger()
        .current_dir(dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty Git repository in"));
}

pub fn generated_file_name() -> String {
    format!("{}.txt", Word().fake::<String>())
}

pub fn generated_content() -> String {
    Words(5..10).fake::<Vec<String>>().join(" ")
}
