//! Object consistency checker for a content-addressed object store.
//!
//! Validates the canonical byte shape of blob, tree, commit, and tag
//! objects, classifies findings through a user-configurable severity
//! policy, and walks the direct references of an object. Object
//! retrieval, decompression, and cryptographic hash verification are the
//! backing store's concern — see [`store::Store`].
//!
//! ```no_run
//! use objcheck_core::config::Options;
//! use objcheck_core::reporter::default_sink;
//! use objcheck_core::types::{Object, ObjectId, ObjectKind};
//! use objcheck_core::validators;
//!
//! # fn example(store: &dyn objcheck_core::store::Store) {
//! let mut opts = Options::new(default_sink);
//! let object = Object::new(ObjectKind::Blob, ObjectId::NULL, b"");
//! let errors = validators::validate(&mut opts, store, &object, None);
//! # let _ = errors;
//! # }
//! ```

pub mod config;
pub mod reporter;
pub mod store;
pub mod types;
pub mod validators;
pub mod walker;

pub use config::{ConfigError, Options, SkipList};
pub use reporter::{report, DiagnosticEvent};
pub use store::{Store, StoreError};
pub use types::{
    DeliverySeverity, DiagnosticId, ExpectedKind, HashParseError, Object, ObjectId, ObjectKind, Severity,
    UserSeverity,
};
