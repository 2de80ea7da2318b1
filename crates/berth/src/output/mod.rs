//! Output formatting for CLI commands.
//!
//! Every command can render three ways: human-readable text (colored,
//! width-aware), JSON for programmatic use, and a quiet mode that prints
//! only record ids so output composes with shell pipelines.
//!
//! Submodules:
//! - [`color`]: color and styling helpers (semantic colors, icons)
//! - [`json`]: JSON serialization for programmatic output
//! - [`tree`]: dependency tree rendering with ASCII/Unicode connectors

pub mod color;
mod json;
pub mod tree;

use crate::domain::{CatalogSnapshot, Owner, Service, System};
use crate::graph::{DepsReport, ServiceRef};
use crate::lint::LintReport;
use crate::relations;
use crate::search::SearchHit;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_id, colorize_lifecycle, colorize_severity, colorize_tags, dimmed,
    severity_icon};
use tree::print_deps_report_text;

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `BERTH_MAX_WIDTH`: maximum content width (default: 80)
    /// - `BERTH_ASCII`: set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: standard env var to disable colors (any value)
    /// - `BERTH_COLOR`: set to "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("BERTH_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "BERTH_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match env::var("BERTH_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "BERTH_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/), plus BERTH_COLOR for
        // explicit control.
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("BERTH_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
    /// Minimal output: record ids only, no decoration
    Quiet,
}

/// Get the current terminal width, falling back to default if detection fails.
fn content_width(config: &OutputConfig) -> usize {
    let terminal = terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH as usize, |(w, _)| w.0 as usize);
    terminal.min(config.max_width)
}

/// Wrap text to the given width, one output line per wrapped line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(20))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a JSON-formatted result for any serializable value
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let output = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(handle, "{output}")
}

/// Print a simple message
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a list of services in the given format
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_service_list(
    snapshot: &CatalogSnapshot,
    services: &[Service],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_service_list_text(&mut handle, snapshot, services, &config),
        OutputMode::Json => json::print_service_list_json(&mut handle, snapshot, services),
        OutputMode::Quiet => print_ids(&mut handle, services.iter().map(|s| s.id.as_str())),
    }
}

/// Print full details for one service
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_service_details(
    snapshot: &CatalogSnapshot,
    service: &Service,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_service_details_text(&mut handle, snapshot, service, &config),
        OutputMode::Json => json::print_service_details_json(&mut handle, snapshot, service),
        OutputMode::Quiet => writeln!(handle, "{}", service.id),
    }
}

/// Print a list of systems in the given format
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_system_list(
    snapshot: &CatalogSnapshot,
    systems: &[System],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_system_list_text(&mut handle, snapshot, systems, &config),
        OutputMode::Json => json::print_system_list_json(&mut handle, snapshot, systems),
        OutputMode::Quiet => print_ids(&mut handle, systems.iter().map(|s| s.id.as_str())),
    }
}

/// Print a list of owners in the given format
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_owner_list(
    snapshot: &CatalogSnapshot,
    owners: &[Owner],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_owner_list_text(&mut handle, snapshot, owners, &config),
        OutputMode::Json => json::print_owner_list_json(&mut handle, snapshot, owners),
        OutputMode::Quiet => print_ids(&mut handle, owners.iter().map(|o| o.id.as_str())),
    }
}

/// Print a dependency query result
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_deps_report(report: &DepsReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_deps_report_text(&mut handle, report, &config),
        OutputMode::Json => {
            let output = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
        OutputMode::Quiet => {
            // Direct neighbors only: enough to script over.
            print_ids(
                &mut handle,
                report
                    .dependencies
                    .iter()
                    .chain(report.dependents.iter())
                    .map(|node| node.id.as_str()),
            )
        }
    }
}

/// Print the orphan list
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_orphans(orphans: &[ServiceRef], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            if orphans.is_empty() {
                writeln!(handle, "No orphaned services.")?;
                return Ok(());
            }
            writeln!(
                handle,
                "{} ({}):",
                bold("Orphaned services", &config),
                orphans.len()
            )?;
            for orphan in orphans {
                writeln!(
                    handle,
                    "  {} {}",
                    colorize_id(&orphan.id, &config),
                    orphan.name
                )?;
            }
            Ok(())
        }
        OutputMode::Json => {
            let output = serde_json::to_string_pretty(orphans).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
        OutputMode::Quiet => print_ids(&mut handle, orphans.iter().map(|o| o.id.as_str())),
    }
}

/// Print a lint report
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_lint_report(report: &LintReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_lint_report_text(&mut handle, report, &config),
        OutputMode::Json => json::print_lint_report_json(&mut handle, report),
        OutputMode::Quiet => {
            // Exit code carries the verdict; print nothing but the counts.
            writeln!(
                handle,
                "{} {}",
                report.error_count(),
                report.warning_count()
            )
        }
    }
}

/// Print search results
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_search_hits(hits: &[SearchHit], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            if hits.is_empty() {
                writeln!(handle, "No matches.")?;
                return Ok(());
            }
            for hit in hits {
                writeln!(
                    handle,
                    "{:<8} {} {} {}",
                    dimmed(&format!("{}", hit.kind), &config),
                    hit.name,
                    colorize_id(&format!("({})", hit.id), &config),
                    dimmed(&format!("[{}]", hit.matched), &config)
                )?;
            }
            Ok(())
        }
        OutputMode::Json => {
            let output = serde_json::to_string_pretty(hits).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
        OutputMode::Quiet => print_ids(&mut handle, hits.iter().map(|h| h.id.as_str())),
    }
}

fn print_ids<'a, W: Write>(w: &mut W, ids: impl Iterator<Item = &'a str>) -> io::Result<()> {
    for id in ids {
        writeln!(w, "{id}")?;
    }
    Ok(())
}

// ============================================================================
// Text Formatting
// ============================================================================

fn service_line(
    snapshot: &CatalogSnapshot,
    service: &Service,
    config: &OutputConfig,
) -> String {
    let lifecycle = service
        .lifecycle
        .map(|l| format!(" [{}]", colorize_lifecycle(l, config)))
        .unwrap_or_default();
    let system = relations::system_of(snapshot, service)
        .map(|s| format!(" {}", dimmed(&format!("in {}", s.name), config)))
        .unwrap_or_default();
    let tags = if service.tags.is_empty() {
        String::new()
    } else {
        format!(" {}", colorize_tags(&service.tags, config))
    };

    format!(
        "{} {}{lifecycle}{system}{tags}",
        colorize_id(service.id.as_str(), config),
        service.name
    )
}

fn print_service_list_text<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    services: &[Service],
    config: &OutputConfig,
) -> io::Result<()> {
    if services.is_empty() {
        writeln!(w, "No services found.")?;
        return Ok(());
    }

    for service in services {
        writeln!(w, "{}", service_line(snapshot, service, config))?;
    }
    writeln!(w)?;
    writeln!(w, "{} service(s)", services.len())?;
    Ok(())
}

fn print_service_details_text<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    service: &Service,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = content_width(config);

    writeln!(
        w,
        "{} {}",
        bold(&service.name, config),
        dimmed(&format!("({})", service.id), config)
    )?;

    if let Some(lifecycle) = service.lifecycle {
        writeln!(
            w,
            "{} {}",
            dimmed("Lifecycle:", config),
            colorize_lifecycle(lifecycle, config)
        )?;
    }

    match (relations::system_of(snapshot, service), &service.system) {
        (Some(system), _) => writeln!(
            w,
            "{} {} {}",
            dimmed("System:", config),
            system.name,
            dimmed(&format!("({})", system.id), config)
        )?,
        (None, Some(id)) => writeln!(
            w,
            "{} {} {}",
            dimmed("System:", config),
            id,
            error("(unknown)", config)
        )?,
        (None, None) => {}
    }

    match (relations::owner_of(snapshot, service), &service.owner) {
        (Some(owner), _) => writeln!(
            w,
            "{} {} {}",
            dimmed("Owner:", config),
            owner.name,
            dimmed(&format!("({})", owner.id), config)
        )?,
        (None, Some(id)) => writeln!(
            w,
            "{} {} {}",
            dimmed("Owner:", config),
            id,
            error("(unknown)", config)
        )?,
        (None, None) => writeln!(
            w,
            "{} {}",
            dimmed("Owner:", config),
            warning("none", config)
        )?,
    }

    if !service.tags.is_empty() {
        writeln!(
            w,
            "{} {}",
            dimmed("Tags:", config),
            colorize_tags(&service.tags, config)
        )?;
    }

    if !service.description.is_empty() {
        writeln!(w)?;
        for line in wrap_text(&service.description, width) {
            writeln!(w, "{line}")?;
        }
    }

    if !service.apis.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("APIs", config))?;
        for api in &service.apis {
            let description = api
                .description
                .as_deref()
                .map(|d| format!(" {}", dimmed(d, config)))
                .unwrap_or_default();
            writeln!(w, "  {}{description}", api.name)?;
        }
    }

    if !service.depends_on.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{} ({}):",
            bold("Depends on", config),
            service.depends_on.len()
        )?;
        for dep in &service.depends_on {
            let api = dep
                .api
                .as_deref()
                .map(|a| format!(" {}", dimmed(&format!("(api: {a})"), config)))
                .unwrap_or_default();
            writeln!(w, "  {}{api}", colorize_id(dep.service.as_str(), config))?;
        }
    }

    Ok(())
}

fn print_system_list_text<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    systems: &[System],
    config: &OutputConfig,
) -> io::Result<()> {
    if systems.is_empty() {
        writeln!(w, "No systems found.")?;
        return Ok(());
    }

    for system in systems {
        let count = relations::services_in_system(snapshot, &system.id).len();
        writeln!(
            w,
            "{} {} {}",
            colorize_id(system.id.as_str(), config),
            system.name,
            dimmed(&format!("({count} services)"), config)
        )?;
    }
    Ok(())
}

fn print_owner_list_text<W: Write>(
    w: &mut W,
    snapshot: &CatalogSnapshot,
    owners: &[Owner],
    config: &OutputConfig,
) -> io::Result<()> {
    if owners.is_empty() {
        writeln!(w, "No owners found.")?;
        return Ok(());
    }

    for owner in owners {
        let count = relations::services_owned_by(snapshot, &owner.id).len();
        writeln!(
            w,
            "{} {} {}",
            colorize_id(owner.id.as_str(), config),
            owner.name,
            dimmed(&format!("({count} services)"), config)
        )?;
    }
    Ok(())
}

fn print_lint_report_text<W: Write>(
    w: &mut W,
    report: &LintReport,
    config: &OutputConfig,
) -> io::Result<()> {
    if report.findings.is_empty() {
        writeln!(w, "{}", success("Catalog is clean.", config))?;
        return Ok(());
    }

    for finding in &report.findings {
        writeln!(
            w,
            "{} {} {}",
            severity_icon(finding.severity, config),
            colorize_severity(finding.severity, config),
            finding.message
        )?;
        if let Some(fix) = &finding.fix {
            writeln!(w, "    {}", dimmed(&format!("fix: {fix}"), config))?;
        }
    }

    writeln!(w)?;
    let summary = format!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
    if report.passed() {
        writeln!(w, "{}", warning(&summary, config))?;
    } else {
        writeln!(w, "{}", error(&summary, config))?;
    }
    Ok(())
}
