//! Execution identity
//!
//! Staging directories are scoped by two identifiers that come from
//! outside the allocator: a fresh execution id minted per materialized
//! directory, and the id of the execution unit (worker thread, task
//! runner) making the request.

use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Supplies execution and execution-unit identifiers
pub trait ExecutionContext: Send + Sync {
    /// A fresh identifier, unique per call
    fn execution_id(&self) -> String;

    /// Stable identifier of the execution unit running this call
    fn unit_id(&self) -> String;
}

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // context id -> unit id assigned to this thread
    static ASSIGNED: RefCell<HashMap<u64, String>> = RefCell::new(HashMap::new());
    // pinned unit ids from `with_unit`, innermost last
    static PINNED: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
}

/// Thread-scoped execution context
///
/// Each OS thread gets its own unit id the first time it asks, numbered
/// per context. `with_unit` pins a caller-chosen id for a closure, which
/// is how a task runner reports its own identity.
#[derive(Debug)]
pub struct ThreadExecutionContext {
    id: u64,
    prefix: String,
    next_unit: AtomicU64,
}

impl ThreadExecutionContext {
    /// Create a context minting execution ids with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            id: NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed),
            prefix: prefix.into(),
            next_unit: AtomicU64::new(1),
        }
    }

    /// Run `f` with this thread's unit id pinned to `unit`
    pub fn with_unit<R>(&self, unit: impl Into<String>, f: impl FnOnce() -> R) -> R {
        struct PinGuard;
        impl Drop for PinGuard {
            fn drop(&mut self) {
                PINNED.with(|p| p.borrow_mut().pop());
            }
        }

        PINNED.with(|p| p.borrow_mut().push((self.id, unit.into())));
        let _guard = PinGuard;
        f()
    }
}

impl Default for ThreadExecutionContext {
    fn default() -> Self {
        Self::new("stagepath")
    }
}

impl ExecutionContext for ThreadExecutionContext {
    fn execution_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.prefix,
            Utc::now().format("%Y-%m-%d_%H-%M-%S_%3f"),
            Uuid::new_v4().simple()
        )
    }

    fn unit_id(&self) -> String {
        let pinned = PINNED.with(|p| {
            p.borrow()
                .iter()
                .rev()
                .find(|(ctx, _)| *ctx == self.id)
                .map(|(_, unit)| unit.clone())
        });
        if let Some(unit) = pinned {
            return unit;
        }

        ASSIGNED.with(|a| {
            a.borrow_mut()
                .entry(self.id)
                .or_insert_with(|| self.next_unit.fetch_add(1, Ordering::Relaxed).to_string())
                .clone()
        })
    }
}
