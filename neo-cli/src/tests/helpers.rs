//! Test helpers for writing small NEO datasets to disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const NEOS_CSV: &str = "\
pdes,name,pha,diameter
433,Eros,N,16.84
99942,Apophis,Y,0.375
2020 AB,,N,
";

pub(super) const CAD_JSON: &str = r#"{
  "count": "4",
  "fields": ["des", "orbit_id", "cd", "dist", "v_rel"],
  "data": [
    ["433", "659", "1900-Jan-01 00:11", "0.313", "5.58"],
    ["2020 AB", "4", "2020-Jan-01 12:00", "0.0412", "12.5"],
    ["99942", "199", "2029-Apr-13 21:46", "0.000254", "7.42"],
    ["2019 XY", "7", "2020-Feb-20 12:00", "0.0801", "9.1"]
  ]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write file");
}

/// A temporary directory holding `neos.csv` and `cad.json`.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        write_utf8(&root.join("neos.csv"), NEOS_CSV.as_bytes());
        write_utf8(&root.join("cad.json"), CAD_JSON.as_bytes());
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn neofile(&self) -> Utf8PathBuf {
        self.root.join("neos.csv")
    }

    pub(super) fn cadfile(&self) -> Utf8PathBuf {
        self.root.join("cad.json")
    }

    /// Dataset flags pointing at this workspace.
    pub(super) fn dataset_flags(&self) -> Vec<String> {
        vec![
            format!("--{}", super::ARG_NEOFILE),
            self.neofile().into_string(),
            format!("--{}", super::ARG_CADFILE),
            self.cadfile().into_string(),
        ]
    }
}
