//! JSON serialization for programmatic output.

use crate::domain::{CatalogSnapshot, Owner, Service, System};
use crate::lint::LintReport;
use crate::relations;
use serde_json::json;
use std::io::{self, Write};

fn write_pretty<W: Write>(w: &mut W, value: &serde_json::Value) -> io::Result<()> {
    let output = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{output}")
}

/// Serialize a service with its references resolved to display names.
pub(super) fn service_to_json(snapshot: &CatalogSnapshot, service: &Service) -> serde_json::Value {
    let mut value = serde_json::to_value(service).unwrap_or_else(|_| json!({}));

    if let Some(system) = relations::system_of(snapshot, service) {
        value["system_name"] = json!(system.name);
    }
    if let Some(owner) = relations::owner_of(snapshot, service) {
        value["owner_name"] = json!(owner.name);
    }

    value
}

pub(super) fn print_service_list_json<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    services: &[Service],
) -> io::Result<()> {
    let values: Vec<serde_json::Value> = services
        .iter()
        .map(|service| service_to_json(snapshot, service))
        .collect();
    write_pretty(w, &json!(values))
}

pub(super) fn print_service_details_json<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    service: &Service,
) -> io::Result<()> {
    write_pretty(w, &service_to_json(snapshot, service))
}

pub(super) fn print_system_list_json<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    systems: &[System],
) -> io::Result<()> {
    let values: Vec<serde_json::Value> = systems
        .iter()
        .map(|system| {
            let mut value = serde_json::to_value(system).unwrap_or_else(|_| json!({}));
            value["service_count"] =
                json!(relations::services_in_system(snapshot, &system.id).len());
            if let Some(owner) = relations::owner_of_system(snapshot, system) {
                value["owner_name"] = json!(owner.name);
            }
            value
        })
        .collect();
    write_pretty(w, &json!(values))
}

pub(super) fn print_owner_list_json<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    owners: &[Owner],
) -> io::Result<()> {
    let values: Vec<serde_json::Value> = owners
        .iter()
        .map(|owner| {
            let mut value = serde_json::to_value(owner).unwrap_or_else(|_| json!({}));
            value["service_count"] =
                json!(relations::services_owned_by(snapshot, &owner.id).len());
            value
        })
        .collect();
    write_pretty(w, &json!(values))
}

pub(super) fn print_lint_report_json<W: Write>(w: &mut W, report: &LintReport) -> io::Result<()> {
    write_pretty(
        w,
        &json!({
            "findings": report.findings,
            "errors": report.error_count(),
            "warnings": report.warning_count(),
            "passed": report.passed(),
        }),
    )
}
