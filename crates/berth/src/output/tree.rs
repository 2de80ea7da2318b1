//! Dependency tree rendering for `berth deps tree` output.

use std::io::{self, Write};

use colored::Colorize;

use super::color::{bold, colorize_id, dimmed};
use super::OutputConfig;
use crate::graph::{DepNode, DepsReport};

/// Print a full dependency report with ASCII/Unicode connectors.
///
/// Renders something like:
/// ```text
/// ◆ gateway (svc-a3f8)
///
/// Dependencies:
/// └── payments (api: charge)
///     ├── stripe-webhook
///     └── auth
///
/// Dependents:
/// └── edge-proxy
/// ```
///
/// Suppressed or empty sections are labeled `(none)`.
pub fn print_deps_report_text<W: Write>(
    w: &mut W,
    report: &DepsReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon_str = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };

    writeln!(
        w,
        "{} {} {}",
        root_icon_str,
        report.service.name,
        dimmed(&format!("({})", report.service.id), config)
    )?;

    writeln!(w)?;
    writeln!(w, "{}:", bold("Dependencies", config))?;
    if report.dependencies.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
    } else {
        print_forest(w, &report.dependencies, &[], config)?;
    }

    writeln!(w)?;
    writeln!(w, "{}:", bold("Dependents", config))?;
    if report.dependents.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
    } else {
        print_forest(w, &report.dependents, &[], config)?;
    }

    Ok(())
}

/// Recursively render tree nodes with proper connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below,
/// used to draw the vertical continuation lines (`│`).
fn print_forest<W: Write>(
    w: &mut W,
    nodes: &[DepNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            let segment = if has_more { pipe } else { space };
            prefix.push_str(&dimmed(segment, config));
        }

        let connector = if is_last { corner } else { branch };
        let connector_str = dimmed(connector, config);

        let label = if node.name == node.id {
            colorize_id(&node.id, config)
        } else {
            format!("{} {}", node.name, dimmed(&format!("({})", node.id), config))
        };

        let api_str = node
            .api
            .as_deref()
            .map(|api| format!(" {}", dimmed(&format!("(api: {api})"), config)))
            .unwrap_or_default();

        writeln!(w, "{prefix}{connector_str}{label}{api_str}")?;

        if !node.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_forest(w, &node.children, &next_segments, config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ServiceRef;

    fn node(id: &str, children: Vec<DepNode>) -> DepNode {
        DepNode {
            id: id.to_string(),
            name: id.to_string(),
            api: None,
            description: None,
            children,
        }
    }

    fn report(dependencies: Vec<DepNode>, dependents: Vec<DepNode>) -> DepsReport {
        DepsReport {
            service: ServiceRef {
                id: "svc-root".to_string(),
                name: "gateway".to_string(),
            },
            dependents,
            dependencies,
        }
    }

    fn render(report: &DepsReport, config: &OutputConfig) -> String {
        let mut buffer = Vec::new();
        print_deps_report_text(&mut buffer, report, config).expect("rendering should succeed");
        String::from_utf8(buffer).expect("output should be valid UTF-8")
    }

    #[test]
    fn root_line_shows_name_and_id() {
        let config = OutputConfig::new(80, false, false);
        let output = render(&report(vec![], vec![]), &config);
        assert!(output.contains("gateway"), "got: {output}");
        assert!(output.contains("(svc-root)"), "got: {output}");
    }

    #[test]
    fn empty_sections_say_none() {
        let config = OutputConfig::new(80, false, false);
        let output = render(&report(vec![], vec![]), &config);
        assert_eq!(
            output.matches("(none)").count(),
            2,
            "both sections empty, got: {output}"
        );
    }

    #[test]
    fn single_child_uses_corner_connector() {
        let config = OutputConfig::new(80, false, false);
        let output = render(&report(vec![node("payments", vec![])], vec![]), &config);
        assert!(output.contains("└── payments"), "got: {output}");
    }

    #[test]
    fn ascii_mode_uses_backtick_corner() {
        let config = OutputConfig::new(80, true, false);
        let output = render(&report(vec![node("payments", vec![])], vec![]), &config);
        assert!(output.contains("`-- payments"), "got: {output}");
        assert!(output.contains('*'), "ASCII root icon, got: {output}");
    }

    #[test]
    fn siblings_use_branch_then_corner() {
        let config = OutputConfig::new(80, false, false);
        let output = render(
            &report(vec![node("one", vec![]), node("two", vec![])], vec![]),
            &config,
        );
        assert!(output.contains("├── one"), "got: {output}");
        assert!(output.contains("└── two"), "got: {output}");
    }

    #[test]
    fn nested_children_get_continuation_lines() {
        let config = OutputConfig::new(80, false, false);
        let forest = vec![
            node("first", vec![node("grandchild", vec![])]),
            node("second", vec![]),
        ];
        let output = render(&report(forest, vec![]), &config);
        assert!(
            output.contains("│   └── grandchild"),
            "grandchild needs a continuation pipe, got: {output}"
        );
    }

    #[test]
    fn api_annotation_is_rendered() {
        let config = OutputConfig::new(80, false, false);
        let mut child = node("payments", vec![]);
        child.api = Some("charge".to_string());
        let output = render(&report(vec![child], vec![]), &config);
        assert!(output.contains("(api: charge)"), "got: {output}");
    }

    #[test]
    fn named_nodes_show_name_with_id() {
        let config = OutputConfig::new(80, false, false);
        let mut child = node("svc-pay1", vec![]);
        child.name = "payments".to_string();
        let output = render(&report(vec![child], vec![]), &config);
        assert!(output.contains("payments (svc-pay1)"), "got: {output}");
    }
}
