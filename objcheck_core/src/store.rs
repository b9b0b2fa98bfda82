//! The backing-store collaborator boundary (§6 "Store collaborators").
//!
//! Object retrieval, parsing, graft lookup, platform filename-alias
//! predicates, reference-name syntax, and the epoch-domain predicate are
//! all explicitly out of scope for this crate (§1). [`Store`] collects
//! them into one trait so the validators and walker can call through it
//! without this crate ever touching decompression, the on-disk format, or
//! a reference-name grammar.

use crate::types::{ObjectId, ObjectKind};

/// A parsed tree entry: `(mode, name, hash)` (§"Tree entry" in the Glossary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// The raw octal mode text as it appeared in the payload, e.g. `"100644"`.
    pub raw_mode: String,
    /// The entry name.
    pub name: String,
    /// The entry's target hash.
    pub hash: ObjectId,
}

impl TreeEntry {
    /// Whether the mode denotes a directory (§4.4.1 ordering rule).
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.raw_mode.trim_start_matches('0') == "40000"
    }
}

/// An external record overriding a commit's declared parent set
/// (§"Graft" in the Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graft {
    /// The number of parents the graft declares, or `-1` for "unknown/shallow".
    pub nr_parent: i64,
}

/// A commit's parsed fields (§3 "Commits additionally expose parsed fields").
#[derive(Debug, Clone)]
pub struct ParsedCommit {
    /// The commit's resolved tree pointer, or `None` if the tree hash did
    /// not resolve (§4.4.4 step 7, `BAD_TREE`).
    pub tree: Option<ObjectId>,
    /// Parent hashes in declaration order.
    pub parents: Vec<ObjectId>,
}

/// A tag's parsed fields (§3 "tags expose the tagged-object handle").
#[derive(Debug, Clone)]
pub struct ParsedTag {
    /// The tagged object, or `None` if it failed to resolve (§4.4.5 step 7,
    /// `BAD_TAG_OBJECT`).
    pub tagged: Option<ObjectId>,
}

/// External collaborators the core calls into but does not implement (§6).
pub trait Store {
    /// Parse a tree payload into its entries. Error surfaces as `-1` from the walker.
    fn parse_tree_entries(&self, payload: &[u8]) -> Result<Vec<TreeEntry>, StoreError>;

    /// Populate a commit's cached fields.
    fn parse_commit(&self, id: &ObjectId, payload: &[u8]) -> Result<ParsedCommit, StoreError>;

    /// Populate a tag's cached fields.
    fn parse_tag(&self, id: &ObjectId, payload: &[u8]) -> Result<ParsedTag, StoreError>;

    /// `read_sha1_file(hash) -> (bytes, kind)`, used only by the tag
    /// validator when raw bytes were not supplied (§4.4.5 step 1).
    fn read_object(&self, id: &ObjectId) -> Result<(Vec<u8>, ObjectKind), StoreError>;

    /// Intern a handle for `id`, if it is known to resolve to a tree.
    fn lookup_tree(&self, id: &ObjectId) -> Option<ObjectId>;

    /// Intern a handle for `id`, if it is known to resolve to a blob.
    fn lookup_blob(&self, id: &ObjectId) -> Option<ObjectId>;

    /// `lookup_commit_graft(hash) -> graft | null` (§4.4.4 step 4).
    fn lookup_commit_graft(&self, id: &ObjectId) -> Option<Graft>;

    /// HFS filename-alias predicate for `.git` (§4.4.1 `HAS_DOTGIT`).
    fn is_hfs_dotgit(&self, name: &str) -> bool;

    /// NTFS filename-alias predicate for `.git` (§4.4.1 `HAS_DOTGIT`).
    fn is_ntfs_dotgit(&self, name: &str) -> bool;

    /// Reference-name well-formedness predicate (§4.4.5 step 5, `BAD_TAG_NAME`).
    fn check_refname_format(&self, name: &str) -> bool;

    /// Epoch-domain predicate (§4.4.3 step 8, `BAD_DATE_OVERFLOW`).
    fn date_overflows(&self, epoch: u64) -> bool;

    /// Tag-type name table lookup (§4.4.5 step 4, `BAD_TYPE`).
    fn type_from_string_gently(&self, name: &str) -> Option<ObjectKind>;
}

/// A collaborator call failed (§7: "surfaces as -1").
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The object could not be parsed as its declared kind.
    #[error("failed to parse object as {0}")]
    ParseFailed(&'static str),
    /// The object could not be read from the backing store.
    #[error("failed to read object {0}")]
    ReadFailed(String),
}
