//! Sync command implementation.

use rootly_client::UpstreamClient;
use rootly_connector::{Connector, SyncDriver};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Runs the sync command.
///
/// Writes the snapshot as pretty JSON to `output`, or to `out` when no
/// output file is given.
pub fn run<U: UpstreamClient + 'static>(
    connector: &Connector<U>,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let driver = SyncDriver::new(connector.resource_syncers());
    let snapshot = driver.run()?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            info!(path = %path.display(), "snapshot written");
        }
        None => {
            serde_json::to_writer_pretty(&mut *out, &snapshot)?;
            writeln!(out)?;
        }
    }

    let stats = driver.stats();
    info!(
        resources = stats.resources,
        entitlements = stats.entitlements,
        grants = stats.grants,
        calls = stats.calls,
        "sync complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootly_client::{MockUpstream, Schedule, User};

    fn connector() -> Connector<MockUpstream> {
        Connector::new(
            MockUpstream::new()
                .with_user(User {
                    id: "U1".into(),
                    email: "ada@example.com".into(),
                    ..User::default()
                })
                .with_schedule(Schedule {
                    id: "S1".into(),
                    name: "Primary".into(),
                    owner_user_id: Some("U1".into()),
                    ..Schedule::default()
                }),
        )
    }

    #[test]
    fn writes_snapshot_to_stdout() {
        let mut out = Vec::new();
        run(&connector(), None, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["resources"].as_array().unwrap().len(), 2);
        assert_eq!(value["grants"][0]["entitlement_slug"], "owner");
    }

    #[test]
    fn syncs_over_loopback() {
        use rootly_testkit::prelude::*;

        let server = FixtureServer::new()
            .with_user(user("96913", "ada", "ada@example.com"))
            .with_team(team("sre", "SRE", &["96913"], &[]))
            .with_schedule(schedule("S1", "Primary", None, &["sre"]))
            .with_rotations("S1", &["R1"])
            .with_rotation_members("R1", &["96913"]);
        let connector = Connector::new(loopback_client(server));

        let mut out = Vec::new();
        run(&connector, None, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let grants = value["grants"].as_array().unwrap();
        assert_eq!(grants.len(), 3);
        assert_eq!(
            grants[1]["expandable"]["entitlement_ids"],
            serde_json::json!(["team:sre:member", "team:sre:admin"])
        );
    }

    #[test]
    fn writes_snapshot_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut out = Vec::new();
        run(&connector(), Some(&path), &mut out).unwrap();

        assert!(out.is_empty());
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["resource_types"].as_array().unwrap().len(), 4);
    }
}
