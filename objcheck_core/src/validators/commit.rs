//! Commit validator (§4.4.4).

use crate::config::Options;
use crate::reporter::report;
use crate::store::Store;
use crate::types::{DiagnosticId, Object, ObjectId};
use crate::validators::header::verify_header;
use crate::validators::ident::{fsck_ident, IdentOutcome};

/// Validate a commit object. Returns the sink-return sum, or a negative
/// value on a fatal header failure (§7 "fail fast on fatal").
pub fn validate_commit(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    let payload = object.payload;

    if verify_header(opts, Some(object), payload).is_none() {
        return -1;
    }

    let mut total = 0;
    let mut p = 0usize;

    if let Some(rest) = payload.strip_prefix(b"tree ") {
        if rest.len() >= 41 && rest[40] == b'\n' && ObjectId::from_hex(&String::from_utf8_lossy(&rest[..40])).is_ok() {
            p = 5 + 41;
        } else {
            total += report(opts, Some(object), DiagnosticId::BadTreeSha1, "invalid tree line");
            p = 5;
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingTree, "missing tree header");
    }

    let mut parsed_parent_count = 0usize;
    let mut declared_parent_count = 0usize;
    loop {
        let remaining = &payload[p.min(payload.len())..];
        let Some(rest) = remaining.strip_prefix(b"parent ") else {
            break;
        };
        declared_parent_count += 1;
        if rest.len() >= 41 && rest[40] == b'\n' && ObjectId::from_hex(&String::from_utf8_lossy(&rest[..40])).is_ok() {
            parsed_parent_count += 1;
            p += 7 + 41;
        } else {
            total += report(opts, Some(object), DiagnosticId::BadParentSha1, "invalid parent line");
            break;
        }
    }

    let graft = store.lookup_commit_graft(&object.id);
    match graft {
        Some(graft) if graft.nr_parent == -1 && parsed_parent_count == 0 => {
            // shallow commit, allowed
        }
        Some(graft) if graft.nr_parent as i64 != parsed_parent_count as i64 => {
            total += report(opts, Some(object), DiagnosticId::MissingGraft, "parent count does not match graft record");
        }
        None if parsed_parent_count != declared_parent_count => {
            total += report(opts, Some(object), DiagnosticId::MissingParent, "parent count mismatch");
        }
        _ => {}
    }

    let mut author_count = 0usize;
    loop {
        let remaining = &payload[p.min(payload.len())..];
        let Some(rest) = remaining.strip_prefix(b"author ") else {
            break;
        };
        author_count += 1;
        match fsck_ident(opts, Some(object), store, rest) {
            IdentOutcome::Ok { cursor } => p += 7 + cursor,
            IdentOutcome::Abort { code, .. } => {
                total += code;
                break;
            }
        }
    }
    if author_count == 0 {
        total += report(opts, Some(object), DiagnosticId::MissingAuthor, "missing author line");
    } else if author_count > 1 {
        total += report(opts, Some(object), DiagnosticId::MultipleAuthors, "multiple author lines");
    }

    let remaining = &payload[p.min(payload.len())..];
    if let Some(rest) = remaining.strip_prefix(b"committer ") {
        if let IdentOutcome::Abort { code, .. } = fsck_ident(opts, Some(object), store, rest) {
            total += code;
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingCommitter, "missing committer line");
    }

    let parsed = store.parse_commit(&object.id, payload).ok();
    if let Some(parsed) = parsed {
        if parsed.tree.is_none() {
            total += report(opts, Some(object), DiagnosticId::BadTree, "tree pointer did not resolve");
        }
    }

    total
}
