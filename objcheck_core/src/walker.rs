//! Reference Walker (C5, §4.5).
//!
//! `walk` enumerates the objects a given object directly references,
//! invoking the caller's walk callback once per reference. It never
//! recurses — traversal of the resulting references, including deciding
//! whether they exist in the store, is the caller's concern (§1 Non-goals).

use crate::config::Options;
use crate::reporter::report;
use crate::store::Store;
use crate::types::{DiagnosticId, ExpectedKind, Object, ObjectKind};

/// Walk the direct references of `object`, calling
/// `opts`'s walk callback once per reference in the kind-dependent order
/// of §4.5.
///
/// Returns 0 if there were no references, the first negative callback
/// return (short-circuiting immediately), or the first non-zero positive
/// return remembered across the full traversal.
pub fn walk(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    match object.kind {
        ObjectKind::Blob => 0,
        ObjectKind::Tree => walk_tree(opts, store, object),
        ObjectKind::Commit => walk_commit(opts, store, object),
        ObjectKind::Tag => walk_tag(opts, store, object),
    }
}

/// Invoke the callback and fold its return into the walker's
/// short-circuit/remember-first-positive accounting (§4.5 "Return value").
fn invoke(opts: &mut Options<'_>, remembered: &mut i32, reference: &Object<'_>, expected: ExpectedKind) -> bool {
    let Some(callback) = opts.walk_callback_mut() else {
        return false;
    };
    let code = callback(reference, expected);
    if code < 0 {
        *remembered = code;
        true
    } else {
        if code != 0 && *remembered == 0 {
            *remembered = code;
        }
        false
    }
}

fn walk_tree(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    let entries = match store.parse_tree_entries(object.payload) {
        Ok(entries) => entries,
        Err(_) => return -1,
    };

    let mut remembered = 0;
    for entry in entries {
        let canonical_mode = {
            let trimmed = entry.raw_mode.trim_start_matches('0');
            if trimmed.is_empty() { "0" } else { trimmed }
        };
        let (kind, expected) = match canonical_mode {
            "40000" => (ObjectKind::Tree, ExpectedKind::Tree),
            "100755" | "100644" | "120000" | "100664" => (ObjectKind::Blob, ExpectedKind::Blob),
            "160000" => continue, // submodule: skip silently
            _ => {
                report(opts, Some(object), DiagnosticId::UnknownType, "unrecognized tree entry mode");
                remembered = -1;
                break;
            }
        };
        let reference = Object::new(kind, entry.hash, &[]);
        if invoke(opts, &mut remembered, &reference, expected) {
            return remembered;
        }
    }
    remembered
}

fn walk_commit(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    let parsed = match store.parse_commit(&object.id, object.payload) {
        Ok(parsed) => parsed,
        Err(_) => return -1,
    };

    let mut remembered = 0;
    if let Some(tree_id) = parsed.tree {
        let reference = Object::new(ObjectKind::Tree, tree_id, &[]);
        if invoke(opts, &mut remembered, &reference, ExpectedKind::Tree) {
            return remembered;
        }
    }
    for parent_id in parsed.parents {
        let reference = Object::new(ObjectKind::Commit, parent_id, &[]);
        if invoke(opts, &mut remembered, &reference, ExpectedKind::Commit) {
            return remembered;
        }
    }
    remembered
}

fn walk_tag(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>) -> i32 {
    let parsed = match store.parse_tag(&object.id, object.payload) {
        Ok(parsed) => parsed,
        Err(_) => return -1,
    };

    let mut remembered = 0;
    if let Some(tagged_id) = parsed.tagged {
        let reference = Object::new(ObjectKind::Commit, tagged_id, &[]);
        invoke(opts, &mut remembered, &reference, ExpectedKind::Any);
    }
    remembered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixture::FixtureStore;
    use crate::types::ObjectId;

    fn tree_payload(entries: &[(&str, &str, [u8; 20])]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (mode, name, hash) in entries {
            buf.extend_from_slice(mode.as_bytes());
            buf.push(b' ');
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
            buf.extend_from_slice(hash);
        }
        buf
    }

    #[test]
    fn unknown_mode_reports_unknown_type_and_short_circuits() {
        let payload = tree_payload(&[("77000", "weird", [1; 20])]);
        let store = FixtureStore::new();
        let mut codes = Vec::new();
        let mut opts = Options::new(|_, _, msg| {
            codes.push(msg.to_owned());
            0
        });
        opts.set_walk_callback(|_, _| panic!("unknown mode entries are never walked"));
        let object = Object::new(ObjectKind::Tree, ObjectId::NULL, &payload);
        let result = walk(&mut opts, &store, &object);
        drop(opts);
        assert_eq!(result, -1);
        assert!(codes.iter().any(|m| m.starts_with("unknownType")));
    }

    #[test]
    fn blob_has_no_references() {
        let store = FixtureStore::new();
        let mut opts = Options::new(|_, _, _| 0);
        opts.set_walk_callback(|_, _| panic!("blob should not walk"));
        let object = Object::new(ObjectKind::Blob, ObjectId::NULL, b"data");
        assert_eq!(walk(&mut opts, &store, &object), 0);
    }

    #[test]
    fn tree_skips_submodules_and_visits_blobs_and_trees() {
        let payload = tree_payload(&[
            ("40000", "dir", [1; 20]),
            ("100644", "file.txt", [2; 20]),
            ("160000", "submodule", [3; 20]),
        ]);
        let store = FixtureStore::new();
        let mut seen = Vec::new();
        let mut opts = Options::new(|_, _, _| 0);
        opts.set_walk_callback(|obj, expected| {
            seen.push((obj.kind, expected));
            0
        });
        let object = Object::new(ObjectKind::Tree, ObjectId::NULL, &payload);
        let result = walk(&mut opts, &store, &object);
        drop(opts);
        assert_eq!(result, 0);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (ObjectKind::Tree, ExpectedKind::Tree));
        assert_eq!(seen[1], (ObjectKind::Blob, ExpectedKind::Blob));
    }

    #[test]
    fn negative_return_short_circuits() {
        let payload = tree_payload(&[("100644", "a", [1; 20]), ("100644", "b", [2; 20])]);
        let store = FixtureStore::new();
        let mut calls = 0;
        let mut opts = Options::new(|_, _, _| 0);
        opts.set_walk_callback(|_, _| {
            calls += 1;
            -1
        });
        let object = Object::new(ObjectKind::Tree, ObjectId::NULL, &payload);
        let result = walk(&mut opts, &store, &object);
        drop(opts);
        assert_eq!(result, -1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn commit_round_trip_walks_tree_then_parents_in_order() {
        use crate::store::{Graft, ParsedCommit, ParsedTag, StoreError, TreeEntry};
        use crate::validators::commit::validate_commit;

        struct RoundTripStore;
        impl Store for RoundTripStore {
            fn parse_tree_entries(&self, _payload: &[u8]) -> Result<Vec<TreeEntry>, StoreError> {
                Ok(Vec::new())
            }
            fn parse_commit(&self, _id: &ObjectId, payload: &[u8]) -> Result<ParsedCommit, StoreError> {
                let text = std::str::from_utf8(payload).unwrap();
                let mut tree = None;
                let mut parents = Vec::new();
                for line in text.lines() {
                    if let Some(hex) = line.strip_prefix("tree ") {
                        tree = ObjectId::from_hex(hex).ok();
                    } else if let Some(hex) = line.strip_prefix("parent ") {
                        if let Ok(id) = ObjectId::from_hex(hex) {
                            parents.push(id);
                        }
                    }
                }
                Ok(ParsedCommit { tree, parents })
            }
            fn parse_tag(&self, _id: &ObjectId, _payload: &[u8]) -> Result<ParsedTag, StoreError> {
                Ok(ParsedTag { tagged: None })
            }
            fn read_object(&self, id: &ObjectId) -> Result<(Vec<u8>, ObjectKind), StoreError> {
                Err(StoreError::ReadFailed(id.to_hex()))
            }
            fn lookup_tree(&self, _id: &ObjectId) -> Option<ObjectId> {
                None
            }
            fn lookup_blob(&self, _id: &ObjectId) -> Option<ObjectId> {
                None
            }
            fn lookup_commit_graft(&self, _id: &ObjectId) -> Option<Graft> {
                None
            }
            fn is_hfs_dotgit(&self, _name: &str) -> bool {
                false
            }
            fn is_ntfs_dotgit(&self, _name: &str) -> bool {
                false
            }
            fn check_refname_format(&self, _name: &str) -> bool {
                true
            }
            fn date_overflows(&self, _epoch: u64) -> bool {
                false
            }
            fn type_from_string_gently(&self, _name: &str) -> Option<ObjectKind> {
                None
            }
        }

        let tree_hash = "1".repeat(40);
        let parent_a = "a".repeat(40);
        let parent_b = "b".repeat(40);
        let payload = format!(
            "tree {tree_hash}\nparent {parent_a}\nparent {parent_b}\nauthor A <a@x> 1 +0000\ncommitter C <c@x> 2 +0000\n\n"
        );
        let store = RoundTripStore;
        let id = ObjectId::from_hex(&"0".repeat(40)).unwrap();
        let object = Object::new(ObjectKind::Commit, id, payload.as_bytes());

        let mut validate_opts = Options::new(|_, _, _| 1);
        assert_eq!(validate_commit(&mut validate_opts, &store, &object), 0);

        let mut seen = Vec::new();
        let mut walk_opts = Options::new(|_, _, _| 0);
        walk_opts.set_walk_callback(|reference, expected| {
            seen.push((reference.kind, expected, reference.id));
            0
        });
        assert_eq!(walk(&mut walk_opts, &store, &object), 0);
        drop(walk_opts);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (ObjectKind::Tree, ExpectedKind::Tree, ObjectId::from_hex(&tree_hash).unwrap()));
        assert_eq!(seen[1], (ObjectKind::Commit, ExpectedKind::Commit, ObjectId::from_hex(&parent_a).unwrap()));
        assert_eq!(seen[2], (ObjectKind::Commit, ExpectedKind::Commit, ObjectId::from_hex(&parent_b).unwrap()));
    }

    #[test]
    fn first_positive_return_is_remembered() {
        let payload = tree_payload(&[("100644", "a", [1; 20]), ("100644", "b", [2; 20])]);
        let store = FixtureStore::new();
        let mut call = 0;
        let mut opts = Options::new(|_, _, _| 0);
        opts.set_walk_callback(move |_, _| {
            call += 1;
            if call == 1 { 5 } else { 0 }
        });
        let object = Object::new(ObjectKind::Tree, ObjectId::NULL, &payload);
        assert_eq!(walk(&mut opts, &store, &object), 5);
    }
}
