//! Test helpers for writing feed snapshots and history databases.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Two ports: one with a published time, one relying on its lane update.
pub(super) const SNAPSHOT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<border_wait_time>
  <last_updated_date>10/19/2026</last_updated_date>
  <port>
    <port_number>250401</port_number>
    <border>Mexican Border</border>
    <port_name>San Ysidro</port_name>
    <crossing_name>San Ysidro</crossing_name>
    <date>10/19/2026</date>
    <time>14:30</time>
    <passenger_vehicle_lanes>
      <standard_lanes>
        <update_time>At 2:00 pm PDT</update_time>
        <delay_minutes>45</delay_minutes>
        <lanes_open>12</lanes_open>
      </standard_lanes>
    </passenger_vehicle_lanes>
  </port>
  <port>
    <port_number>250407</port_number>
    <border>Mexican Border</border>
    <port_name>San Ysidro</port_name>
    <crossing_name>PedWest</crossing_name>
    <date>10/19/2026</date>
    <passenger_vehicle_lanes>
      <standard_lanes>
        <update_time>At 8:15 am PDT</update_time>
      </standard_lanes>
    </passenger_vehicle_lanes>
    <pedestrian_lanes>
      <standard_lanes>
        <delay_minutes>30</delay_minutes>
        <lanes_open>N/A</lanes_open>
      </standard_lanes>
    </pedestrian_lanes>
  </port>
</border_wait_time>
"#;

/// Temporary workspace holding a feed snapshot and a history path.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn snapshot(&self) -> Utf8PathBuf {
        self.root.join("bwt.xml")
    }

    pub(super) fn history_db(&self) -> Utf8PathBuf {
        self.root.join("history/border_wait.db")
    }

    pub(super) fn write_snapshot(&self, contents: &str) {
        write_utf8(&self.snapshot(), contents.as_bytes());
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}
