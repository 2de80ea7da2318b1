//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Pass:   green   (passing lint, production lifecycle)
//!   - Warning:        yellow  (lint warnings, deprecated lifecycle)
//!   - Error:          red     (lint errors, decommissioned lifecycle)
//!   - Info/Reference: cyan    (record ids, tree roots)
//!   - Accent:         magenta (tags)
//!   - Muted:          dimmed  (field labels, connectors)
//!   - Emphasis:       bold    (section headers)

use crate::domain::Lifecycle;
use crate::lint::Severity;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Colorize a record id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize a lifecycle stage.
pub(crate) fn colorize_lifecycle(lifecycle: Lifecycle, config: &OutputConfig) -> String {
    let text = format!("{lifecycle}");
    if !config.use_colors {
        return text;
    }
    match lifecycle {
        Lifecycle::Experimental => text.white().to_string(),
        Lifecycle::Production => text.green().to_string(),
        Lifecycle::Deprecated => text.yellow().to_string(),
        Lifecycle::Decommissioned => text.red().to_string(),
    }
}

/// Colorize a lint severity label.
pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let text = format!("{severity}");
    if !config.use_colors {
        return text;
    }
    match severity {
        Severity::Error => text.red().bold().to_string(),
        Severity::Warning => text.yellow().to_string(),
    }
}

/// Get a colored severity icon, with ASCII fallback support.
pub(crate) fn severity_icon(severity: Severity, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match severity {
            Severity::Error => "x",
            Severity::Warning => "!",
        }
    } else {
        match severity {
            Severity::Error => "✗",
            Severity::Warning => "▲",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match severity {
        Severity::Error => icon.red().to_string(),
        Severity::Warning => icon.yellow().to_string(),
    }
}

/// Colorize tags (magenta).
pub(crate) fn colorize_tags(tags: &[String], config: &OutputConfig) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let text = tags.join(", ");
    if !config.use_colors {
        return text;
    }
    text.magenta().to_string()
}

/// Apply dimmed style to text (for labels/connectors).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    #[test]
    fn colors_disabled_passes_text_through() {
        let config = plain();
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(colorize_id("svc-a3f8", &config), "svc-a3f8");
        assert_eq!(bold("header", &config), "header");
    }

    #[test]
    fn severity_icons_have_ascii_fallbacks() {
        let ascii = OutputConfig::new(80, true, false);
        assert_eq!(severity_icon(Severity::Error, &ascii), "x");
        assert_eq!(severity_icon(Severity::Warning, &ascii), "!");

        let unicode = plain();
        assert_eq!(severity_icon(Severity::Error, &unicode), "✗");
        assert_eq!(severity_icon(Severity::Warning, &unicode), "▲");
    }

    #[test]
    fn empty_tags_render_as_empty_string() {
        assert_eq!(colorize_tags(&[], &plain()), "");
    }
}
