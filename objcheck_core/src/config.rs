//! Policy engine: severity overrides, the compact config-string grammar,
//! and the skip-list (§4.2).
//!
//! `Options` is the single mutable piece of state a caller threads
//! through every validator and walker call. It owns the severity
//! override table, the `strict` flag, the skip-list, and the two
//! caller-supplied callbacks (sink and walk callback).

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::types::{DiagnosticId, ExpectedKind, Object, ObjectId, Severity, UserSeverity};

/// The ordered set of hashes whose diagnostics are suppressed (§"Skip-list"
/// in the Glossary, §4.2.1).
///
/// Lookup is a binary search while the list is known to be in ascending
/// order, and a linear scan after an out-of-order insertion has
/// downgraded it — exactly the two-mode behavior §5 requires.
#[derive(Debug, Clone, Default)]
pub struct SkipList {
    hashes: Vec<ObjectId>,
    sorted: bool,
}

impl SkipList {
    /// An empty, vacuously-sorted skip-list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hashes: Vec::new(),
            sorted: true,
        }
    }

    /// Append a hash, downgrading to unsorted if it breaks ascending order.
    pub fn push(&mut self, id: ObjectId) {
        if self.sorted {
            if let Some(last) = self.hashes.last() {
                if id < *last {
                    self.sorted = false;
                    log::debug!("skip-list insertion out of order, downgrading to linear scan");
                }
            }
        }
        self.hashes.push(id);
    }

    /// Whether `id` is suppressed.
    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        if self.sorted {
            self.hashes.binary_search(id).is_ok()
        } else {
            self.hashes.contains(id)
        }
    }

    /// Number of hashes currently in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Load a skip-list from a file of fixed-stride `HEX40 '\n'` records
    /// (§4.2.1).
    ///
    /// # Errors
    ///
    /// Fails fatally (per §4.2.1) on I/O failure, a malformed hash, or a
    /// short final record.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)
            .map_err(|e| ConfigError::SkipListIo(path.display().to_string(), e.to_string()))?;
        let mut reader = BufReader::new(file);
        let mut list = Self::new();
        loop {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| ConfigError::SkipListIo(path.display().to_string(), e.to_string()))?;
            if read == 0 {
                break;
            }
            if read != 41 || !line.ends_with('\n') {
                return Err(ConfigError::SkipListRecord(line.trim_end().to_owned()));
            }
            let hex = &line[..40];
            let id = ObjectId::from_hex(hex).map_err(|_| ConfigError::SkipListRecord(hex.to_owned()))?;
            list.push(id);
        }
        Ok(list)
    }
}

/// Policy state threaded through validator and walker calls (§3 "Options").
pub struct Options<'cb> {
    severity_override: HashMap<DiagnosticId, UserSeverity>,
    /// When true, WARN defaults with no explicit override are promoted to ERROR.
    pub strict: bool,
    skip_list: SkipList,
    sink: Box<dyn FnMut(Option<&Object>, crate::types::DeliverySeverity, &str) -> i32 + 'cb>,
    walk_callback: Option<Box<dyn FnMut(&Object, ExpectedKind) -> i32 + 'cb>>,
}

impl<'cb> Options<'cb> {
    /// Build `Options` around a sink callback.
    ///
    /// `user_data` from the callback signatures of §3 is modeled as
    /// ordinary Rust closure capture rather than an explicit parameter.
    pub fn new<F>(sink: F) -> Self
    where
        F: FnMut(Option<&Object>, crate::types::DeliverySeverity, &str) -> i32 + 'cb,
    {
        Self {
            severity_override: HashMap::new(),
            strict: false,
            skip_list: SkipList::new(),
            sink: Box::new(sink),
            walk_callback: None,
        }
    }

    /// Install the walk callback used by [`crate::walker::walk`].
    pub fn set_walk_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Object, ExpectedKind) -> i32 + 'cb,
    {
        self.walk_callback = Some(Box::new(callback));
    }

    pub(crate) fn walk_callback_mut(
        &mut self,
    ) -> Option<&mut (dyn FnMut(&Object, ExpectedKind) -> i32 + 'cb)> {
        self.walk_callback.as_deref_mut()
    }

    pub(crate) fn sink_mut(
        &mut self,
    ) -> &mut (dyn FnMut(Option<&Object>, crate::types::DeliverySeverity, &str) -> i32 + 'cb) {
        &mut *self.sink
    }

    /// The skip-list (read access for tests and callers wanting to inspect it).
    #[must_use]
    pub fn skip_list(&self) -> &SkipList {
        &self.skip_list
    }

    /// `set_severity(id_key, severity_word)` (§4.2).
    ///
    /// # Errors
    ///
    /// Fails if `id_key` does not resolve to a known diagnostic, if
    /// `severity_word` is not one of `error`/`warn`/`ignore`, or if the
    /// change would demote a FATAL-default diagnostic below ERROR.
    pub fn set_severity(&mut self, id_key: &str, severity_word: &str) -> Result<(), ConfigError> {
        let id = crate::types::resolve_diagnostic(id_key)
            .ok_or_else(|| ConfigError::UnknownDiagnostic(id_key.to_owned()))?;
        let severity = UserSeverity::parse_word(severity_word)
            .ok_or_else(|| ConfigError::MalformedToken(severity_word.to_owned()))?;
        if id.default_severity() == Severity::Fatal && severity != UserSeverity::Error {
            return Err(ConfigError::IllegalFatalDemotion(id));
        }
        self.severity_override.insert(id, severity);
        Ok(())
    }

    /// `apply_config_string(s)` (§4.2, grammar in §6).
    ///
    /// # Errors
    ///
    /// Fails on a malformed token (missing `=`/`:` on a non-`skiplist`
    /// token), an unknown diagnostic id, an illegal FATAL demotion, or a
    /// skip-list that fails to load.
    pub fn apply_config_string(&mut self, s: &str) -> Result<(), ConfigError> {
        for token in s.split([' ', ',', '|']).filter(|t| !t.is_empty()) {
            let split_at = token.find(['=', ':']);
            let Some(split_at) = split_at else {
                return Err(ConfigError::MalformedToken(token.to_owned()));
            };
            let (key, value) = (&token[..split_at], &token[split_at + 1..]);
            if key.eq_ignore_ascii_case("skiplist") {
                let loaded = SkipList::load_from_file(Path::new(value))?;
                self.skip_list = loaded;
            } else {
                self.set_severity(key, value)?;
            }
        }
        Ok(())
    }

    /// `effective_severity(id)` (§4.2): override if present, else the
    /// default with WARN→ERROR promotion under `strict`. FATAL passes
    /// through unresolved; only [`crate::reporter::report`] collapses it
    /// for delivery. INFO with no override resolves to `Ignore` — it is
    /// suppressed unless a caller explicitly elevates it (§3: "INFO
    /// always emits as WARN to the sink but is suppressed unless
    /// explicitly elevated").
    #[must_use]
    pub fn effective_severity(&self, id: DiagnosticId) -> Severity {
        if let Some(user) = self.severity_override.get(&id) {
            return Severity::from(*user);
        }
        let default = id.default_severity();
        if default == Severity::Info {
            return Severity::Ignore;
        }
        if self.strict && default == Severity::Warn {
            Severity::Error
        } else {
            default
        }
    }
}

/// Fatal configuration mistakes (§7: "not data errors").
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `set_severity`'s `id_key` did not resolve to a known diagnostic.
    #[error("unknown diagnostic id: {0}")]
    UnknownDiagnostic(String),
    /// A token was missing its `=`/`:` separator, or its value was not a
    /// recognized severity word.
    #[error("malformed config token: {0}")]
    MalformedToken(String),
    /// An override attempted to demote a FATAL-default diagnostic below ERROR.
    #[error("{0} defaults to FATAL and cannot be demoted below ERROR")]
    IllegalFatalDemotion(DiagnosticId),
    /// The skip-list file could not be opened or read.
    #[error("failed to read skip-list file '{0}': {1}")]
    SkipListIo(String, String),
    /// A skip-list record was not a valid 41-byte `HEX40\n` record.
    #[error("malformed skip-list record: {0:?}")]
    SkipListRecord(String),
}
