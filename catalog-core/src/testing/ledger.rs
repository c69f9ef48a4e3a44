use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Kind of call recorded by the mock client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Add,
    Update,
    Remove,
    AllocRegistrations,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Update => "update",
            OpKind::Remove => "remove",
            OpKind::AllocRegistrations => "alloc_registrations",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid catalog op: {0}")]
pub struct UnknownOpKind(pub String);

impl FromStr for OpKind {
    type Err = UnknownOpKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OpKind::Add),
            "update" => Ok(OpKind::Update),
            "remove" => Ok(OpKind::Remove),
            "alloc_registrations" | "query" => Ok(OpKind::AllocRegistrations),
            other => Err(UnknownOpKind(other.to_string())),
        }
    }
}

/// One call made against the mock client.
///
/// Immutable once built: fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockCatalogOp {
    op: OpKind,
    alloc_id: String,
    /// Empty for allocation-level queries.
    task: String,
}

impl MockCatalogOp {
    /// Builds an op from its string kind.
    ///
    /// # Panics
    ///
    /// Panics if `op` is not one of `add`, `update`, `remove` or
    /// `alloc_registrations`. An unknown kind is a bug in the test harness,
    /// not a condition to recover from. Use [`OpKind::from_str`] to validate
    /// without panicking.
    pub fn new(op: &str, alloc_id: impl Into<String>, task: impl Into<String>) -> Self {
        match op.parse::<OpKind>() {
            Ok(kind) => Self::from_kind(kind, alloc_id, task),
            Err(e) => panic!("{}", e),
        }
    }

    pub fn from_kind(op: OpKind, alloc_id: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            op,
            alloc_id: alloc_id.into(),
            task: task.into(),
        }
    }

    pub fn op(&self) -> OpKind {
        self.op
    }

    pub fn alloc_id(&self) -> &str {
        &self.alloc_id
    }

    pub fn task(&self) -> &str {
        &self.task
    }
}

/// Append-only, lock-protected log of [`MockCatalogOp`]s.
///
/// Entries are never reordered or removed; the order is the order in which
/// callers acquired the lock.
#[derive(Debug)]
pub struct OpLedger {
    ops: Mutex<Vec<MockCatalogOp>>,
}

impl Default for OpLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl OpLedger {
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::with_capacity(20)),
        }
    }

    /// Appends one entry.
    pub fn record(&self, op: MockCatalogOp) {
        self.lock().push(op);
    }

    /// Appends one entry and runs `then` before releasing the lock.
    ///
    /// `then` is serialized with every other append and snapshot. It must not
    /// touch this ledger again: the lock is not reentrant.
    pub fn record_then<R>(&self, op: MockCatalogOp, then: impl FnOnce() -> R) -> R {
        let mut ops = self.lock();
        ops.push(op);
        then()
    }

    /// Returns a copy of every entry recorded so far, in order.
    pub fn snapshot(&self) -> Vec<MockCatalogOp> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic inside `record_then` poisons the mutex; the entries already
    // appended are still complete, so keep serving them.
    fn lock(&self) -> MutexGuard<'_, Vec<MockCatalogOp>> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
