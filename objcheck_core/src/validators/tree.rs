//! Tree validator (§4.4.1).
//!
//! Accumulates ten booleans across the whole entry list and emits at most
//! one diagnostic per boolean, rather than one diagnostic per offending
//! entry — a single malformed tree produces at most one diagnostic per
//! class (§7 "Aggregate").

use crate::config::Options;
use crate::reporter::report;
use crate::store::{Store, TreeEntry};
use crate::types::{DiagnosticId, Object};

/// Modes allowed unconditionally (§4.4.1 "Allowed modes").
const ALLOWED_MODES: &[&str] = &["100755", "100644", "120000", "40000", "160000"];
/// Allowed only when `strict` is false.
const NON_STRICT_MODE: &str = "100664";

#[derive(Debug, Default)]
struct Accumulators {
    has_null_sha1: bool,
    has_full_path: bool,
    has_empty_name: bool,
    has_dot: bool,
    has_dotdot: bool,
    has_dotgit: bool,
    has_zero_pad: bool,
    has_bad_modes: bool,
    has_dup_entries: bool,
    not_properly_sorted: bool,
}

/// Validate a tree's entries. Returns the sink-return sum, or a negative
/// value if the store failed to parse the entries (§7 "Parse outcome").
pub fn validate_tree(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    let entries = match store.parse_tree_entries(object.payload) {
        Ok(entries) => entries,
        Err(_) => return -1,
    };

    let mut acc = Accumulators::default();
    let mut total = 0;

    for entry in &entries {
        if entry.hash.is_null() {
            acc.has_null_sha1 = true;
        }
        if entry.name.contains('/') {
            acc.has_full_path = true;
        }
        if entry.name.is_empty() {
            acc.has_empty_name = true;
        }
        if entry.name == "." {
            acc.has_dot = true;
        }
        if entry.name == ".." {
            acc.has_dotdot = true;
        }
        if entry.name == ".git" || store.is_hfs_dotgit(&entry.name) || store.is_ntfs_dotgit(&entry.name) {
            acc.has_dotgit = true;
        }
        if entry.raw_mode.starts_with('0') && entry.raw_mode.len() > 1 {
            acc.has_zero_pad = true;
        }
        let canonical_mode = entry.raw_mode.trim_start_matches('0');
        let canonical_mode = if canonical_mode.is_empty() { "0" } else { canonical_mode };
        let allowed = ALLOWED_MODES.contains(&canonical_mode)
            || (!opts.strict && canonical_mode == NON_STRICT_MODE.trim_start_matches('0'));
        if !allowed {
            acc.has_bad_modes = true;
        }
    }

    for window in entries.windows(2) {
        match compare_entries(&window[0], &window[1]) {
            std::cmp::Ordering::Greater => acc.not_properly_sorted = true,
            std::cmp::Ordering::Equal => acc.has_dup_entries = true,
            std::cmp::Ordering::Less => {}
        }
    }

    macro_rules! emit {
        ($flag:expr, $id:expr, $msg:expr) => {
            if $flag {
                total += report(opts, Some(object), $id, $msg);
            }
        };
    }

    emit!(acc.has_null_sha1, DiagnosticId::NullSha1, "contains entries pointing to null sha1");
    emit!(acc.has_full_path, DiagnosticId::FullPathname, "contains full pathnames");
    emit!(acc.has_empty_name, DiagnosticId::EmptyName, "contains empty filename");
    emit!(acc.has_dot, DiagnosticId::HasDot, "contains '.'");
    emit!(acc.has_dotdot, DiagnosticId::HasDotdot, "contains '..'");
    emit!(acc.has_dotgit, DiagnosticId::HasDotgit, "contains '.git'");
    emit!(acc.has_zero_pad, DiagnosticId::ZeroPaddedFilemode, "contains zero-padded file modes");
    emit!(acc.has_bad_modes, DiagnosticId::BadFilemode, "contains bad file modes");
    emit!(acc.has_dup_entries, DiagnosticId::DuplicateEntries, "contains duplicate file entries");
    emit!(acc.not_properly_sorted, DiagnosticId::TreeNotSorted, "not properly sorted");

    total
}

/// Compare two tree entries by the directory-slash ordering rule
/// (§4.4.1 "Ordering rule"): directory entries sort as if suffixed with `/`.
///
/// Same-named entries of different kinds (a blob `"a"` next to a tree
/// `"a"`) are NOT a tie under this rule: the blob's name ends with
/// nothing following it while the tree's effectively continues with
/// `/`, so the blob always sorts first. This resolves an ambiguity
/// between the ordering rule's own prose and one of its worked examples
/// in favor of the rule as stated (and matches long-standing real-world
/// `git fsck` behavior); see `same_named_blob_and_tree_are_not_a_tie` below.
pub fn compare_entries(a: &TreeEntry, b: &TreeEntry) -> std::cmp::Ordering {
    let a_bytes = a.name.as_bytes();
    let b_bytes = b.name.as_bytes();
    let min_len = a_bytes.len().min(b_bytes.len());

    for i in 0..min_len {
        if a_bytes[i] != b_bytes[i] {
            return a_bytes[i].cmp(&b_bytes[i]);
        }
    }

    let a_next = effective_byte(a_bytes, min_len, a.is_directory());
    let b_next = effective_byte(b_bytes, min_len, b.is_directory());
    match (a_next, b_next) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

/// The byte at `pos` in `name`, or `Some(b'/')` if `name` ended exactly at
/// `pos` and belongs to a directory entry, or `None` if it ended and is not
/// a directory (so the shorter name wins as smaller).
fn effective_byte(name: &[u8], pos: usize, is_directory: bool) -> Option<u8> {
    if pos < name.len() {
        Some(name[pos])
    } else if is_directory {
        Some(b'/')
    } else {
        None
    }
}
