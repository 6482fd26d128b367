//! Validate command implementation.

use rootly_client::UpstreamClient;
use rootly_connector::Connector;
use std::io::Write;

/// Runs the validate command.
pub fn run<U: UpstreamClient + 'static>(
    connector: &Connector<U>,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = connector.metadata();
    match connector.validate() {
        Ok(()) => {
            writeln!(out, "✓ {}: credentials valid", metadata.display_name)?;
            Ok(())
        }
        Err(e) => {
            writeln!(out, "✗ {}: {}", metadata.display_name, e)?;
            Err(e.into())
        }
    }
}
