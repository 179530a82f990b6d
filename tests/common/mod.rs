#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixture copies of the fourteen dataset files.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// File names of every fixture, sorted.
pub fn dataset_files() -> Vec<String> {
    let mut files: Vec<String> = fs::read_dir(fixture_dir())
        .expect("read fixture dir")
        .map(|e| e.expect("fixture entry").file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}

pub struct TestEnv {
    _tmp: TempDir,
    pub data: PathBuf,
}

impl TestEnv {
    /// A data folder holding every dataset file.
    pub fn new() -> Self {
        let env = Self::empty();
        for file in dataset_files() {
            fs::copy(fixture_dir().join(&file), env.data.join(&file)).expect("copy dataset");
        }
        env
    }

    /// A data folder with no dataset files.
    pub fn empty() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let data = tmp.path().join("data");
        fs::create_dir_all(&data).expect("create data dir");
        Self { _tmp: tmp, data }
    }

    pub fn remove(&self, file: &str) {
        fs::remove_file(self.data.join(file)).expect("remove dataset");
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data.join(name)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kpi-dashboards").expect("binary built");
        cmd.env_remove("KPI_DASHBOARDS_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(&self.data);
        cmd
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output file")
}
