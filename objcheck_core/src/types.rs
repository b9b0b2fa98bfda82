//! Core type definitions for the object consistency checker.
//!
//! These types form the data model of §3 and the diagnostic catalog of
//! §4.1: an [`ObjectId`] identifies an object, [`ObjectKind`] says what
//! kind it is, [`Object`] is the borrowed handle the core validates, and
//! [`DiagnosticId`] is the closed enumeration of every diagnostic the
//! validators can raise, each with a stable default [`Severity`].

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A 20-byte object identity hash.
///
/// The core never computes this value — it is handed in by the backing
/// store (§1 "Out of scope": cryptographic hash verification is a
/// separate concern) — but it does parse and compare hashes: the
/// skip-list file format (§4.2.1) and the tree entry format (§4.4.1)
/// both carry hashes as raw bytes or hex text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(#[serde(with = "hex_bytes")] pub [u8; 20]);

impl ObjectId {
    /// The all-zero hash (§4.4.1 `NULL_SHA1`).
    pub const NULL: ObjectId = ObjectId([0u8; 20]);

    /// Build an `ObjectId` from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse 40 hex characters into an `ObjectId`.
    ///
    /// # Errors
    ///
    /// Returns [`HashParseError`] if `s` is not exactly 40 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        if s.len() != 40 {
            return Err(HashParseError::WrongLength(s.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| HashParseError::NotHex)?;
        Ok(Self(bytes))
    }

    /// Render as 40 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether every byte is zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The raw 20 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 20], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 20], D::Error> {
        let text = String::deserialize(d)?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(&text, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(bytes)
    }
}

/// Errors from parsing a hex-encoded object hash.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashParseError {
    /// The string was not exactly 40 characters long.
    #[error("hash must be exactly 40 hex characters, got {0}")]
    WrongLength(usize),
    /// The string contained non-hex-digit bytes.
    #[error("hash contains non-hex characters")]
    NotHex,
}

/// The four object kinds the store can hold (§1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Opaque byte blob — never inspected by the format validator.
    Blob,
    /// Directory listing: a sequence of `(mode, name, hash)` entries.
    Tree,
    /// A commit: header fields, identity lines, tree and parent links.
    Commit,
    /// A tag: header fields, one identity line, one tagged object.
    Tag,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// The "expected kind" a [`crate::walker`] callback is told about a
/// reference (§4.5).
///
/// Distinct from [`ObjectKind`] because `Any` is never the *actual*
/// kind of an object — it only ever appears as a hint passed to the
/// walk callback for a tag's tagged object, whose kind the walker has
/// not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedKind {
    /// The reference is expected to be a blob.
    Blob,
    /// The reference is expected to be a tree.
    Tree,
    /// The reference is expected to be a commit.
    Commit,
    /// No expectation — the walker did not resolve the referenced kind.
    Any,
}

/// A borrowed handle to an object being checked (§3 "Object").
///
/// The core holds this only for the duration of a single validation or
/// walk call; it never owns or caches object bytes.
#[derive(Debug, Clone, Copy)]
pub struct Object<'a> {
    /// Which of the four kinds this object is.
    pub kind: ObjectKind,
    /// The object's identity hash.
    pub id: ObjectId,
    /// The canonical byte payload, if resolved by the caller.
    pub payload: &'a [u8],
}

impl<'a> Object<'a> {
    /// Construct a borrowed object handle.
    #[must_use]
    pub fn new(kind: ObjectKind, id: ObjectId, payload: &'a [u8]) -> Self {
        Self { kind, id, payload }
    }
}

/// Severity as tracked inside the catalog and policy engine (§3).
///
/// `Fatal` and `Info` are sentinel states that only exist at this layer
/// — they are never part of the override alphabet a caller can set
/// (that's [`UserSeverity`]) and never reach the sink directly (that's
/// [`DeliverySeverity`], produced by [`crate::reporter::collapse`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suppressed entirely; the sink is never invoked.
    Ignore,
    /// Collapses to `Warn` at delivery, suppressed unless explicitly
    /// elevated by an override (§3).
    Info,
    /// Delivered as-is.
    Warn,
    /// Delivered as-is.
    Error,
    /// Collapses to `Error` at delivery; may not be demoted below
    /// `Error` by an override (§3 invariant).
    Fatal,
}

/// The severity alphabet a caller may assign via [`crate::config::Options::set_severity`]
/// or a config-string token (§4.2).
///
/// `Fatal` and `Info` are catalog-only sentinels and therefore excluded
/// from this type (§9 Design Notes, fourth point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSeverity {
    /// Suppress the diagnostic.
    Ignore,
    /// Deliver as a warning.
    Warn,
    /// Deliver as an error.
    Error,
}

impl UserSeverity {
    /// Parse the case-insensitive severity word used in config strings
    /// and [`crate::config::Options::set_severity`] (§4.2: `"error"`,
    /// `"warn"`, `"ignore"`).
    #[must_use]
    pub fn parse_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

impl From<UserSeverity> for Severity {
    fn from(value: UserSeverity) -> Self {
        match value {
            UserSeverity::Ignore => Severity::Ignore,
            UserSeverity::Warn => Severity::Warn,
            UserSeverity::Error => Severity::Error,
        }
    }
}

/// What actually reaches the sink, after FATAL→Error and INFO→Warn
/// collapse (§4.3 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySeverity {
    /// Delivered warning (also used for collapsed `Info`).
    Warn,
    /// Delivered error (also used for collapsed `Fatal`).
    Error,
}

/// The closed diagnostic enumeration of §6.
///
/// Every validator raises diagnostics exclusively through these
/// symbols; there is no open-ended string-id mechanism, matching the
/// spec's insistence on bit-exact, stable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticId {
    // --- FATAL (2) ---
    NulInHeader,
    UnterminatedHeader,
    // --- ERROR (~30) ---
    BadDate,
    BadDateOverflow,
    BadEmail,
    BadName,
    BadObjectSha1,
    BadParentSha1,
    BadTagObject,
    BadTimezone,
    BadTree,
    BadTreeSha1,
    BadType,
    DuplicateEntries,
    MissingAuthor,
    MissingCommitter,
    MissingEmail,
    MissingGraft,
    MissingNameBeforeEmail,
    MissingObject,
    MissingParent,
    MissingSpaceBeforeDate,
    MissingSpaceBeforeEmail,
    MissingTag,
    MissingTagEntry,
    MissingTagObject,
    MissingTree,
    MissingType,
    MissingTypeEntry,
    MultipleAuthors,
    TagObjectNotTag,
    TreeNotSorted,
    UnknownType,
    ZeroPaddedDate,
    // --- WARN (~7) ---
    BadFilemode,
    EmptyName,
    FullPathname,
    HasDot,
    HasDotdot,
    HasDotgit,
    NullSha1,
    ZeroPaddedFilemode,
    // --- INFO (2) ---
    BadTagName,
    MissingTaggerEntry,
}

impl DiagnosticId {
    /// All diagnostic ids, for catalog construction and tests.
    pub const ALL: &'static [DiagnosticId] = &[
        Self::NulInHeader,
        Self::UnterminatedHeader,
        Self::BadDate,
        Self::BadDateOverflow,
        Self::BadEmail,
        Self::BadName,
        Self::BadObjectSha1,
        Self::BadParentSha1,
        Self::BadTagObject,
        Self::BadTimezone,
        Self::BadTree,
        Self::BadTreeSha1,
        Self::BadType,
        Self::DuplicateEntries,
        Self::MissingAuthor,
        Self::MissingCommitter,
        Self::MissingEmail,
        Self::MissingGraft,
        Self::MissingNameBeforeEmail,
        Self::MissingObject,
        Self::MissingParent,
        Self::MissingSpaceBeforeDate,
        Self::MissingSpaceBeforeEmail,
        Self::MissingTag,
        Self::MissingTagEntry,
        Self::MissingTagObject,
        Self::MissingTree,
        Self::MissingType,
        Self::MissingTypeEntry,
        Self::MultipleAuthors,
        Self::TagObjectNotTag,
        Self::TreeNotSorted,
        Self::UnknownType,
        Self::ZeroPaddedDate,
        Self::BadFilemode,
        Self::EmptyName,
        Self::FullPathname,
        Self::HasDot,
        Self::HasDotdot,
        Self::HasDotgit,
        Self::NullSha1,
        Self::ZeroPaddedFilemode,
        Self::BadTagName,
        Self::MissingTaggerEntry,
    ];

    /// The stable UPPER_SNAKE symbolic identifier (§3).
    #[must_use]
    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Self::NulInHeader => "NUL_IN_HEADER",
            Self::UnterminatedHeader => "UNTERMINATED_HEADER",
            Self::BadDate => "BAD_DATE",
            Self::BadDateOverflow => "BAD_DATE_OVERFLOW",
            Self::BadEmail => "BAD_EMAIL",
            Self::BadName => "BAD_NAME",
            Self::BadObjectSha1 => "BAD_OBJECT_SHA1",
            Self::BadParentSha1 => "BAD_PARENT_SHA1",
            Self::BadTagObject => "BAD_TAG_OBJECT",
            Self::BadTimezone => "BAD_TIMEZONE",
            Self::BadTree => "BAD_TREE",
            Self::BadTreeSha1 => "BAD_TREE_SHA1",
            Self::BadType => "BAD_TYPE",
            Self::DuplicateEntries => "DUPLICATE_ENTRIES",
            Self::MissingAuthor => "MISSING_AUTHOR",
            Self::MissingCommitter => "MISSING_COMMITTER",
            Self::MissingEmail => "MISSING_EMAIL",
            Self::MissingGraft => "MISSING_GRAFT",
            Self::MissingNameBeforeEmail => "MISSING_NAME_BEFORE_EMAIL",
            Self::MissingObject => "MISSING_OBJECT",
            Self::MissingParent => "MISSING_PARENT",
            Self::MissingSpaceBeforeDate => "MISSING_SPACE_BEFORE_DATE",
            Self::MissingSpaceBeforeEmail => "MISSING_SPACE_BEFORE_EMAIL",
            Self::MissingTag => "MISSING_TAG",
            Self::MissingTagEntry => "MISSING_TAG_ENTRY",
            Self::MissingTagObject => "MISSING_TAG_OBJECT",
            Self::MissingTree => "MISSING_TREE",
            Self::MissingType => "MISSING_TYPE",
            Self::MissingTypeEntry => "MISSING_TYPE_ENTRY",
            Self::MultipleAuthors => "MULTIPLE_AUTHORS",
            Self::TagObjectNotTag => "TAG_OBJECT_NOT_TAG",
            Self::TreeNotSorted => "TREE_NOT_SORTED",
            Self::UnknownType => "UNKNOWN_TYPE",
            Self::ZeroPaddedDate => "ZERO_PADDED_DATE",
            Self::BadFilemode => "BAD_FILEMODE",
            Self::EmptyName => "EMPTY_NAME",
            Self::FullPathname => "FULL_PATHNAME",
            Self::HasDot => "HAS_DOT",
            Self::HasDotdot => "HAS_DOTDOT",
            Self::HasDotgit => "HAS_DOTGIT",
            Self::NullSha1 => "NULL_SHA1",
            Self::ZeroPaddedFilemode => "ZERO_PADDED_FILEMODE",
            Self::BadTagName => "BAD_TAG_NAME",
            Self::MissingTaggerEntry => "MISSING_TAGGER_ENTRY",
        }
    }

    /// The default severity from §6's catalog table.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::NulInHeader | Self::UnterminatedHeader => Severity::Fatal,
            Self::BadTagName | Self::MissingTaggerEntry => Severity::Info,
            Self::BadFilemode
            | Self::EmptyName
            | Self::FullPathname
            | Self::HasDot
            | Self::HasDotdot
            | Self::HasDotgit
            | Self::NullSha1
            | Self::ZeroPaddedFilemode => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbolic_name())
    }
}

/// Lowercase, underscore-stripped lookup key for a symbolic name, e.g.
/// `MISSING_EMAIL` → `missingemail` (§4.1).
fn lookup_key(symbolic_name: &str) -> String {
    symbolic_name
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The process-wide lowercase-key cache (§4.1 "built lazily on first
/// override request", §5 "must be initialized at most once").
///
/// `OnceLock` makes first-use idempotent across concurrent callers
/// without requiring external synchronization, satisfying §5's shared
/// state requirement directly in the type rather than pushing the
/// obligation onto every caller.
static LOOKUP_TABLE: OnceLock<HashMap<String, DiagnosticId>> = OnceLock::new();

/// Resolve a case-insensitive, underscore-optional symbolic name to its
/// [`DiagnosticId`] (§4.2 `set_severity`'s `id_key` parameter).
///
/// Builds the lowercase lookup table on first call; every call after
/// that is a single hash lookup.
#[must_use]
pub fn resolve_diagnostic(id_key: &str) -> Option<DiagnosticId> {
    let table = LOOKUP_TABLE.get_or_init(|| {
        log::debug!("building diagnostic catalog lowercase-key cache");
        DiagnosticId::ALL
            .iter()
            .map(|id| (lookup_key(id.symbolic_name()), *id))
            .collect()
    });
    table.get(&lookup_key(id_key)).copied()
}
