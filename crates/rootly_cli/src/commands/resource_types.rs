//! Resource-types command implementation.

use rootly_model::ResourceType;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TypeEntry {
    id: &'static str,
    display_name: &'static str,
    entitlements: &'static [&'static str],
    skip_entitlements_and_grants: bool,
}

/// Runs the resource-types command.
pub fn run(format: &str, out: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<TypeEntry> = ResourceType::all()
        .iter()
        .map(|t| TypeEntry {
            id: t.id(),
            display_name: t.display_name(),
            entitlements: t.entitlements,
            skip_entitlements_and_grants: t.skip_entitlements_and_grants(),
        })
        .collect();

    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
        "text" => {
            writeln!(out, "{:<10} {:<12} ENTITLEMENTS", "ID", "NAME")?;
            for entry in &entries {
                let entitlements = if entry.entitlements.is_empty() {
                    "-".to_string()
                } else {
                    entry.entitlements.join(", ")
                };
                writeln!(out, "{:<10} {:<12} {}", entry.id, entry.display_name, entitlements)?;
            }
        }
        other => return Err(format!("unknown format: {other}").into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_lists_every_type() {
        let mut out = Vec::new();
        run("text", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("owner, member, on-call"));
    }

    #[test]
    fn json_output() {
        let mut out = Vec::new();
        run("json", &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["skip_entitlements_and_grants"], true);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(run("yaml", &mut Vec::new()).is_err());
    }
}
