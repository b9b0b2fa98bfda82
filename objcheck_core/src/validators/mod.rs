//! Format Validator (C4, §4.4): dispatches on object kind.
//!
//! Blobs always pass — the validator never inspects blob bytes (§4.4
//! "Blobs always pass (no byte inspection)").

pub mod commit;
pub mod header;
pub mod ident;
pub mod tag;
pub mod tree;

use crate::config::Options;
use crate::store::Store;
use crate::types::{Object, ObjectKind};

/// Validate `object` against its kind's format rules.
///
/// `raw` is only consulted for tags (§4.4.5 step 1); other kinds always
/// validate `object.payload`.
pub fn validate(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>, raw: Option<&[u8]>) -> i32 {
    match object.kind {
        ObjectKind::Blob => 0,
        ObjectKind::Tree => tree::validate_tree(opts, store, object),
        ObjectKind::Commit => commit::validate_commit(opts, store, object),
        ObjectKind::Tag => tag::validate_tag(opts, store, object, raw),
    }
}
