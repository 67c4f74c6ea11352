#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const SOURCE_SCHEMA: &str = r#"
fields:
  - name: user_id
    kind: integer
    alias: id
  - name: joined
    kind: text
    date_format: "%Y-%m-%d"
  - name: note
    kind: text
"#;

pub const DEST_SCHEMA: &str = r#"
fields:
  - name: id
    kind: text
  - name: user_id
    kind: integer
  - name: joined
    kind: timestamp
  - name: note
    kind: text
"#;

pub const INPUT_RECORD: &str = r#"{"user_id": 7, "joined": "2021-11-19", "note": "hi"}"#;

/// Scratch directory that is removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
