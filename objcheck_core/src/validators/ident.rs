//! Identity-line parser (§4.4.3 `fsck_ident`).
//!
//! Validates `<name> SP <LT><email><GT> SP <epoch> SP <tz>\n` and reports
//! the first diagnostic in scan order whose failure condition is met. Per
//! the Open Question this crate resolves in the affirmative: a zero
//! return from `report` (an IGNORE severity, or a sink that chooses to
//! swallow it) means "continue scanning the line", not "stop".

use crate::config::Options;
use crate::reporter::report;
use crate::store::Store;
use crate::types::{DiagnosticId, Object};

/// Result of parsing one identity line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentOutcome {
    /// Parsing reached the end of the line; `cursor` is the offset of the
    /// first byte after the trailing newline.
    Ok { cursor: usize },
    /// A diagnostic's sink return was non-zero; the parser stopped
    /// immediately and returns that value.
    Abort { code: i32, cursor: usize },
}

fn raise(opts: &mut Options<'_>, object: Option<&Object>, cursor: usize, id: DiagnosticId, msg: &str) -> Option<IdentOutcome> {
    let code = report(opts, object, id, msg);
    if code != 0 {
        Some(IdentOutcome::Abort { code, cursor })
    } else {
        None
    }
}

/// Parse `buf` as an identity line (the text following the `"author "` /
/// `"committer "` / `"tagger "` prefix, up to and including the trailing
/// `\n`).
pub fn fsck_ident(opts: &mut Options<'_>, object: Option<&Object>, store: &dyn Store, buf: &[u8]) -> IdentOutcome {
    let mut p = 0usize;

    if buf.first() == Some(&b'<') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::MissingNameBeforeEmail, "missing name before email") {
            return out;
        }
    }

    while p < buf.len() && buf[p] != b'<' && buf[p] != b'>' && buf[p] != b'\n' {
        p += 1;
    }

    if buf.get(p) == Some(&b'>') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::BadName, "'>' found before '<'") {
            return out;
        }
    } else if buf.get(p) != Some(&b'<') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::MissingEmail, "missing email") {
            return out;
        }
    }

    if p > 0 && buf.get(p - 1) != Some(&b' ') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::MissingSpaceBeforeEmail, "missing space before email") {
            return out;
        }
    }
    p = (p + 1).min(buf.len());

    while p < buf.len() && buf[p] != b'<' && buf[p] != b'>' && buf[p] != b'\n' {
        p += 1;
    }

    if buf.get(p) != Some(&b'>') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::BadEmail, "unterminated email") {
            return out;
        }
    }
    p = (p + 1).min(buf.len());

    if buf.get(p) != Some(&b' ') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::MissingSpaceBeforeDate, "missing space before date") {
            return out;
        }
    }
    p = (p + 1).min(buf.len());

    let epoch_start = p;
    while p < buf.len() && buf[p].is_ascii_digit() {
        p += 1;
    }
    let epoch_str = std::str::from_utf8(&buf[epoch_start..p]).unwrap_or("");

    if epoch_str.len() > 1 && epoch_str.starts_with('0') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::ZeroPaddedDate, "zero-padded date") {
            return out;
        }
    }

    let epoch_value: Option<u64> = if epoch_str.is_empty() { None } else { epoch_str.parse().ok() };
    if let Some(value) = epoch_value {
        if store.date_overflows(value) {
            if let Some(out) = raise(opts, object, p, DiagnosticId::BadDateOverflow, "date overflows") {
                return out;
            }
        }
    }
    if epoch_value.is_none() || buf.get(p) != Some(&b' ') {
        if let Some(out) = raise(opts, object, p, DiagnosticId::BadDate, "bad date") {
            return out;
        }
    }
    p = (p + 1).min(buf.len());

    let tz_ok = buf.len() >= p + 6
        && (buf[p] == b'+' || buf[p] == b'-')
        && buf[p + 1].is_ascii_digit()
        && buf[p + 2].is_ascii_digit()
        && buf[p + 3].is_ascii_digit()
        && buf[p + 4].is_ascii_digit()
        && buf[p + 5] == b'\n';
    if !tz_ok {
        if let Some(out) = raise(opts, object, p, DiagnosticId::BadTimezone, "bad timezone") {
            return out;
        }
        let rest = buf[p.min(buf.len())..].iter().position(|&b| b == b'\n');
        return IdentOutcome::Ok { cursor: rest.map(|r| p + r + 1).unwrap_or(buf.len()) };
    }
    p += 6;

    IdentOutcome::Ok { cursor: p }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixture::FixtureStore;

    fn opts_error() -> Options<'static> {
        let mut opts = Options::new(crate::reporter::default_sink);
        opts.apply_config_string("").unwrap();
        opts
    }

    #[test]
    fn accepts_well_formed_line() {
        let mut opts = opts_error();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"A U Thor <a@example.com> 1 +0000\n");
        assert_eq!(out, IdentOutcome::Ok { cursor: 33 });
    }

    #[test]
    fn empty_name_reports_missing_name_before_email() {
        let mut opts = opts_error();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"<a@example.com> 1 +0000\n");
        assert!(matches!(out, IdentOutcome::Abort { .. }));
    }

    #[test]
    fn missing_email_angle_bracket() {
        let mut opts = opts_error();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"A U Thor 1 +0000\n");
        assert!(matches!(out, IdentOutcome::Abort { .. }));
    }

    #[test]
    fn zero_padded_date_reported() {
        let mut opts = opts_error();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"A U Thor <a@x> 01 +0000\n");
        assert!(matches!(out, IdentOutcome::Abort { .. }));
    }

    #[test]
    fn timezone_without_newline_is_bad_timezone() {
        let mut opts = opts_error();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"A U Thor <a@x> 1 +0000");
        assert!(matches!(out, IdentOutcome::Abort { .. }));
    }

    #[test]
    fn ignored_diagnostic_continues_scanning() {
        let mut opts = Options::new(|_, _, _| 0);
        opts.set_severity("zero_padded_date", "ignore").unwrap();
        let store = FixtureStore::new();
        let out = fsck_ident(&mut opts, None, &store, b"A U Thor <a@x> 01 +0000\n");
        assert_eq!(out, IdentOutcome::Ok { cursor: 24 });
    }
}
