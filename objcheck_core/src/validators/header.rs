//! Header block verifier (§4.4.2), shared by the commit and tag validators.

use crate::config::Options;
use crate::reporter::report;
use crate::types::{DiagnosticId, Object};

/// The outcome of scanning a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// The header ended at a `\n\n` terminator; body bytes follow at `body_start`.
    Terminated { body_start: usize },
    /// The header was the entire payload (a header-only object, no body).
    HeaderOnly,
}

/// Scan `payload` byte-by-byte for a header block terminator (§4.4.2).
///
/// - A NUL before the terminator fails fatally with `NUL_IN_HEADER`.
/// - A `\n\n` sequence ends the header block successfully.
/// - End-of-input with the final byte being `\n` is accepted (header-only).
/// - Any other end-of-input fails fatally with `UNTERMINATED_HEADER`.
///
/// Returns `None` on fatal failure (after reporting); validators must
/// abort immediately per §4.4.4/§4.4.5 step 1 ("fail fast on fatal").
pub fn verify_header(opts: &mut Options<'_>, object: Option<&Object>, payload: &[u8]) -> Option<HeaderOutcome> {
    let mut i = 0;
    while i < payload.len() {
        if payload[i] == 0 {
            report(opts, object, DiagnosticId::NulInHeader, &format!("at offset {i}"));
            return None;
        }
        if payload[i] == b'\n' {
            if i + 1 < payload.len() && payload[i + 1] == b'\n' {
                return Some(HeaderOutcome::Terminated { body_start: i + 2 });
            }
            if i + 1 == payload.len() {
                return Some(HeaderOutcome::HeaderOnly);
            }
        }
        i += 1;
    }
    report(opts, object, DiagnosticId::UnterminatedHeader, "missing blank line terminator");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts_silent() -> Options<'static> {
        Options::new(|_, _, _| 0)
    }

    #[test]
    fn accepts_header_only_with_trailing_newline() {
        let mut opts = opts_silent();
        let outcome = verify_header(&mut opts, None, b"x: y\n");
        assert_eq!(outcome, Some(HeaderOutcome::HeaderOnly));
    }

    #[test]
    fn accepts_blank_line_terminator() {
        let mut opts = opts_silent();
        let outcome = verify_header(&mut opts, None, b"tree abc\n\nbody");
        assert_eq!(outcome, Some(HeaderOutcome::Terminated { body_start: 9 }));
    }

    #[test]
    fn rejects_nul_byte() {
        let mut count = 0;
        let mut opts = Options::new(|_, _, _| {
            count += 1;
            1
        });
        let outcome = verify_header(&mut opts, None, b"tree a\0bc\n\n");
        drop(opts);
        assert_eq!(outcome, None);
        assert_eq!(count, 1);
    }

    #[test]
    fn rejects_missing_terminator() {
        let mut opts = opts_silent();
        let outcome = verify_header(&mut opts, None, b"tree abc no newline");
        assert_eq!(outcome, None);
    }
}
