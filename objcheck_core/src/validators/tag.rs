//! Tag validator (§4.4.5).

use crate::config::Options;
use crate::reporter::report;
use crate::store::Store;
use crate::types::{DiagnosticId, Object, ObjectId, ObjectKind};
use crate::validators::header::verify_header;
use crate::validators::ident::{fsck_ident, IdentOutcome};

/// Validate a tag object. `raw` is the caller-supplied payload, if any
/// (§4.4.5 step 1: "If raw bytes were not supplied, load the object
/// payload"). Returns the sink-return sum, or a negative value on a
/// fatal failure.
pub fn validate_tag(opts: &mut Options<'_>, store: &dyn Store, object: &Object<'_>, raw: Option<&[u8]>) -> i32 {
    let owned;
    let payload: &[u8] = match raw {
        Some(bytes) => bytes,
        None => match store.read_object(&object.id) {
            Ok((bytes, ObjectKind::Tag)) => {
                owned = bytes;
                &owned
            }
            Ok((_, _other)) => {
                report(opts, Some(object), DiagnosticId::TagObjectNotTag, "loaded object is not a tag");
                return -1;
            }
            Err(_) => {
                report(opts, Some(object), DiagnosticId::MissingTagObject, "failed to load tag payload");
                return -1;
            }
        },
    };

    if verify_header(opts, Some(object), payload).is_none() {
        return -1;
    }

    let mut total = 0;
    let mut p = 0usize;

    if let Some(rest) = payload.strip_prefix(b"object ") {
        if rest.len() >= 41 && rest[40] == b'\n' && ObjectId::from_hex(&String::from_utf8_lossy(&rest[..40])).is_ok() {
            p = 7 + 41;
        } else {
            total += report(opts, Some(object), DiagnosticId::BadObjectSha1, "invalid object line");
            p = 7;
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingObject, "missing object line");
    }

    let remaining = &payload[p.min(payload.len())..];
    if let Some(rest) = remaining.strip_prefix(b"type ") {
        match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => {
                let type_name = String::from_utf8_lossy(&rest[..nl]);
                if store.type_from_string_gently(&type_name).is_none() {
                    total += report(opts, Some(object), DiagnosticId::BadType, "unrecognized type name");
                }
                p += 5 + nl + 1;
            }
            None => {
                total += report(opts, Some(object), DiagnosticId::MissingType, "missing newline after type");
            }
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingTypeEntry, "missing type line");
    }

    let remaining = &payload[p.min(payload.len())..];
    if let Some(rest) = remaining.strip_prefix(b"tag ") {
        match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => {
                let tag_name = String::from_utf8_lossy(&rest[..nl]);
                let full_ref = format!("refs/tags/{tag_name}");
                if !store.check_refname_format(&full_ref) {
                    total += report(opts, Some(object), DiagnosticId::BadTagName, "malformed tag name");
                }
                p += 4 + nl + 1;
            }
            None => {
                total += report(opts, Some(object), DiagnosticId::MissingTag, "missing newline after tag name");
            }
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingTagEntry, "missing tag line");
    }

    let remaining = &payload[p.min(payload.len())..];
    if let Some(rest) = remaining.strip_prefix(b"tagger ") {
        if let IdentOutcome::Abort { code, .. } = fsck_ident(opts, Some(object), store, rest) {
            total += code;
        }
    } else {
        total += report(opts, Some(object), DiagnosticId::MissingTaggerEntry, "missing tagger line");
    }

    let parsed = store.parse_tag(&object.id, payload).ok();
    if let Some(parsed) = parsed {
        if parsed.tagged.is_none() {
            total += report(opts, Some(object), DiagnosticId::BadTagObject, "tagged pointer did not resolve");
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixture::FixtureStore;

    fn zero_hash() -> String {
        "0".repeat(40)
    }

    #[test]
    fn missing_tagger_is_info_and_suppressed_by_default() {
        let payload = format!("object {}\ntype commit\ntag v1\n\n", zero_hash());
        let store = FixtureStore::new();
        let mut invoked = false;
        let mut opts = Options::new(|_, _, _| {
            invoked = true;
            0
        });
        let object = Object::new(ObjectKind::Tag, ObjectId::from_hex(&zero_hash()).unwrap(), payload.as_bytes());
        validate_tag(&mut opts, &store, &object, Some(payload.as_bytes()));
        drop(opts);
        assert!(!invoked);
    }

    #[test]
    fn missing_tagger_reported_when_elevated() {
        let payload = format!("object {}\ntype commit\ntag v1\n\n", zero_hash());
        let store = FixtureStore::new();
        let mut codes = Vec::new();
        let mut opts = Options::new(|_, _, msg| {
            codes.push(msg.to_owned());
            0
        });
        opts.set_severity("missing_tagger_entry", "warn").unwrap();
        let object = Object::new(ObjectKind::Tag, ObjectId::from_hex(&zero_hash()).unwrap(), payload.as_bytes());
        validate_tag(&mut opts, &store, &object, Some(payload.as_bytes()));
        drop(opts);
        assert!(codes.iter().any(|m| m.starts_with("missingTaggerEntry")));
    }

    #[test]
    fn bad_type_name_reported() {
        let payload = format!("object {}\ntype bogus\ntag v1\ntagger T <t@x> 1 +0000\n\n", zero_hash());
        let store = FixtureStore::new();
        let mut codes = Vec::new();
        let mut opts = Options::new(|_, _, msg| {
            codes.push(msg.to_owned());
            0
        });
        let object = Object::new(ObjectKind::Tag, ObjectId::from_hex(&zero_hash()).unwrap(), payload.as_bytes());
        validate_tag(&mut opts, &store, &object, Some(payload.as_bytes()));
        drop(opts);
        assert!(codes.iter().any(|m| m.starts_with("badType")));
    }

    #[test]
    fn missing_object_line_reported() {
        let payload = "type commit\ntag v1\ntagger T <t@x> 1 +0000\n\n".to_owned();
        let store = FixtureStore::new();
        let mut codes = Vec::new();
        let mut opts = Options::new(|_, _, msg| {
            codes.push(msg.to_owned());
            0
        });
        let object = Object::new(ObjectKind::Tag, ObjectId::from_hex(&zero_hash()).unwrap(), payload.as_bytes());
        validate_tag(&mut opts, &store, &object, Some(payload.as_bytes()));
        drop(opts);
        assert!(codes.iter().any(|m| m.starts_with("missingObject")));
    }
}
