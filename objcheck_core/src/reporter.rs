//! Diagnostic formatting and dispatch to the sink (§4.3).
//!
//! `report` is the single choke point every validator calls through: it
//! resolves the effective severity, checks the skip-list, collapses the
//! catalog-only FATAL/INFO sentinels, frames the message, and invokes the
//! caller's sink.

use serde::Serialize;

use crate::config::Options;
use crate::types::{DeliverySeverity, DiagnosticId, Object, Severity};

/// `report(object, id, message)` (§4.3).
///
/// `message` is pre-formatted by the caller (the validator) — this
/// crate does not thread a variadic `(fmt, args…)` contract through
/// every call site, only the `"<name>: <text>"` framing is guaranteed.
///
/// Returns the sink's return value, or 0 if the diagnostic was
/// suppressed by policy (IGNORE severity or a skip-listed object).
pub fn report(opts: &mut Options<'_>, object: Option<&Object>, id: DiagnosticId, message: &str) -> i32 {
    let severity = opts.effective_severity(id);
    if severity == Severity::Ignore {
        return 0;
    }
    if let Some(object) = object {
        if opts.skip_list().contains(&object.id) {
            return 0;
        }
    }
    let delivered = collapse(severity);
    let framed = format!("{}: {}", kebabish(id.symbolic_name()), message);
    (opts.sink_mut())(object, delivered, &framed)
}

/// Collapse the catalog-only sentinel severities for delivery (§4.3 step 3,
/// §9 "Sentinel severities").
#[must_use]
pub fn collapse(severity: Severity) -> DeliverySeverity {
    match severity {
        Severity::Fatal | Severity::Error => DeliverySeverity::Error,
        Severity::Info | Severity::Warn => DeliverySeverity::Warn,
        Severity::Ignore => unreachable!("report() returns before collapsing an IGNORE severity"),
    }
}

/// The "kebab-ish" name transform of §4.3 step 4 / §9 third Open Question:
/// lowercase every letter except the one immediately following an
/// underscore, which is preserved as-is, and the underscore itself is
/// dropped. `BAD_DATE` → `badDate`, `MISSING_EMAIL` → `missingEmail`.
///
/// This is distinct from [`crate::types::resolve_diagnostic`]'s lookup-key
/// transform, which fully lowercases and is used only for id resolution,
/// never for display.
fn kebabish(symbolic_name: &str) -> String {
    let mut out = String::with_capacity(symbolic_name.len());
    let mut uppercase_next = false;
    for c in symbolic_name.chars() {
        if c == '_' {
            uppercase_next = true;
            continue;
        }
        if uppercase_next {
            out.push(c);
            uppercase_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// The stock sink of §6 "Default sink": logs via [`log::warn!`]/[`log::error!`]
/// instead of printing directly (logging *sinks* are an external concern,
/// §1, but the log *call* is ours to make), returning 0 for WARN and 1 for
/// ERROR so callers can sum return values into an error tally.
pub fn default_sink(object: Option<&Object>, severity: DeliverySeverity, message: &str) -> i32 {
    let hex = object.map(|o| o.id.to_hex()).unwrap_or_else(|| "-".to_owned());
    match severity {
        DeliverySeverity::Warn => {
            log::warn!("object {hex}: {message}");
            0
        }
        DeliverySeverity::Error => {
            log::error!("object {hex}: {message}");
            1
        }
    }
}

/// A structured, serializable record of one delivered diagnostic.
///
/// The distilled callback-sink contract has no structured-output story;
/// this supplements it the way a real consumer of a consistency checker
/// needs — JSON events it can collect, diff, or feed into a report —
/// without requiring callers to build one themselves.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    /// The symbolic diagnostic id, e.g. `"BAD_DATE"`.
    pub rule_id: &'static str,
    /// The framed message, e.g. `"badDate: zero-padded date"`.
    pub message: String,
    /// Hex object hash, if the diagnostic was attached to an object.
    pub object: Option<String>,
    /// The severity actually delivered to the sink.
    pub severity: DeliverySeverity,
}

impl DiagnosticEvent {
    /// Build an event for the given diagnostic, mirroring exactly what
    /// [`report`] would hand the sink.
    #[must_use]
    pub fn new(object: Option<&Object>, id: DiagnosticId, severity: DeliverySeverity, message: &str) -> Self {
        Self {
            rule_id: id.symbolic_name(),
            message: format!("{}: {}", kebabish(id.symbolic_name()), message),
            object: object.map(|o| o.id.to_hex()),
            severity,
        }
    }
}
