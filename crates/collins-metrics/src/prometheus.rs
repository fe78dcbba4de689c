//! Prometheus text exposition format.
//!
//! Renders collector observations into the text exposition format (0.0.4)
//! for scraping by a Prometheus server or compatible agent.

use std::fmt::Write;

use crate::observation::{MetricKind, Observation};

/// Content type for the rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render observations into Prometheus text format.
///
/// Every family in [`MetricKind::ALL`] gets HELP and TYPE lines, followed by
/// its samples in observation order.
pub fn render_prometheus(observations: &[Observation]) -> String {
    let mut out = String::new();

    for kind in MetricKind::ALL {
        let _ = writeln!(out, "# HELP {} {}", kind.name(), escape_help(kind.help()));
        let _ = writeln!(out, "# TYPE {} {}", kind.name(), kind.metric_type());

        for obs in observations.iter().filter(|o| o.metric == kind) {
            out.push_str(kind.name());
            if !obs.labels.is_empty() {
                out.push('{');
                for (i, (name, value)) in obs.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{name}=\"{}\"", escape_label_value(value));
                }
                out.push('}');
            }
            let _ = writeln!(out, " {}", format_value(obs.value));
        }
    }

    out
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
