//! Human-readable rendering of scan records.

use anyhow::Result;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use crate::domain::models::scan_record::{ScaRecord, ScanRecord};
use crate::domain::models::severity::{FindingCounts, Severity};
use crate::domain::ports::build_history::BuildRef;

/// Table with the house list style.
fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

fn findings_table(findings: &[FindingCounts]) -> Table {
    let mut table = list_table(&["severity", "count", "new", "net", "mitigated"]);
    for severity in Severity::ALL.iter().rev() {
        let counts = &findings[severity.index()];
        table.add_row(vec![
            Cell::new(severity.as_str()),
            Cell::new(counts.count).set_alignment(CellAlignment::Right),
            Cell::new(counts.new).set_alignment(CellAlignment::Right),
            Cell::new(counts.net).set_alignment(CellAlignment::Right),
            Cell::new(if counts.mitigated { "yes" } else { "" }),
        ]);
    }
    table
}

/// Print a scan record, as JSON or as a styled summary.
pub fn render_record(record: &ScanRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    if !record.has_data {
        println!("{}", style("No scan data available.").yellow());
        return Ok(());
    }

    let policy = if record.policy_passed() {
        style(record.policy_compliance_status.as_str()).green()
    } else {
        style(record.policy_compliance_status.as_str()).red()
    };
    println!(
        "Policy {} — {} (score {}, level {})",
        style(&record.policy_name).bold(),
        policy,
        record.score,
        record.assurance_level,
    );
    if record.scan_overdue {
        println!("{}", style("Scan is overdue.").yellow());
    }

    let mut table = findings_table(&record.findings);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(record.total_count).set_alignment(CellAlignment::Right),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);
    println!("{table}");

    if let Some(sca) = &record.sca {
        render_sca(sca);
    }
    Ok(())
}

fn render_sca(sca: &ScaRecord) {
    println!();
    println!("{}", style("Software composition").bold());
    if sca.max_cvss_score >= 0.0 {
        println!(
            "Max CVSS {:.1}, {} blacklisted component(s)",
            sca.max_cvss_score, sca.blacklisted_count
        );
    } else {
        println!("{} blacklisted component(s)", sca.blacklisted_count);
    }
    println!("{}", findings_table(&sca.findings));

    for component in &sca.components {
        let mut flags = Vec::new();
        if component.blacklisted {
            flags.push("blacklisted");
        }
        if component.is_new {
            flags.push("new");
        }
        if component.violates_policy {
            flags.push("violates policy");
        }
        if flags.is_empty() {
            println!("  {}", component.name);
        } else {
            println!("  {} ({})", component.name, flags.join(", "));
        }
    }
}

/// One line per stored build for the `history` command.
pub fn render_history(entries: &[(BuildRef, ScanRecord)], json: bool) -> Result<()> {
    if json {
        let rows: Vec<serde_json::Value> = entries
            .iter()
            .map(|(build, record)| {
                serde_json::json!({
                    "build": build.number,
                    "has_data": record.has_data,
                    "total_count": record.total_count,
                    "policy_compliance_status": record.policy_compliance_status,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No scan records found.");
        return Ok(());
    }

    let mut table = list_table(&["build", "recorded", "findings", "policy"]);
    for (build, record) in entries {
        let (findings, policy) = if record.has_data {
            (
                record.total_count.to_string(),
                record.policy_compliance_status.clone(),
            )
        } else {
            ("-".to_string(), "no data".to_string())
        };
        table.add_row(vec![
            Cell::new(build.to_string()),
            Cell::new(record.recorded_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(findings).set_alignment(CellAlignment::Right),
            Cell::new(policy),
        ]);
    }
    println!("{table}");
    Ok(())
}
