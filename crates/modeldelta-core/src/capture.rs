//! Snapshot capture boundary.
//!
//! The host environment implements [`SnapshotSource`]; the core never reaches
//! into the host itself. Capture must be serialized against edits by the host
//! (e.g. by capturing on the thread that performs the edit).

#![allow(clippy::result_large_err)]

use crate::diff::{diff_with_options, ChangeSet, DiffOptions};
use crate::errors::Result;
use crate::snapshot::Snapshot;
use std::fmt::Display;

/// Source of point-in-time snapshots.
///
/// Returns `None` when there is no active document.
///
/// Any `Fn() -> Option<Snapshot>` is a source:
///
/// ```
/// use modeldelta_core::capture::SnapshotSource;
/// use modeldelta_core::snapshot::{DocumentInfo, Snapshot};
///
/// let source = || Some(Snapshot::new(DocumentInfo::named("Doc"), vec![]));
/// assert!(source.capture_snapshot().is_some());
/// ```
pub trait SnapshotSource {
    fn capture_snapshot(&self) -> Option<Snapshot>;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> Option<Snapshot>,
{
    fn capture_snapshot(&self) -> Option<Snapshot> {
        self()
    }
}

/// Source with no active document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocument;

impl SnapshotSource for NoDocument {
    fn capture_snapshot(&self) -> Option<Snapshot> {
        None
    }
}

/// Outcome of a tracked run: the closure's own result plus what it changed.
#[derive(Debug)]
pub struct TrackedRun<T, E> {
    pub outcome: std::result::Result<T, E>,
    pub changes: ChangeSet,
}

/// Capture before, run `run`, capture after, diff.
///
/// The ChangeSet is computed whether or not `run` fails; a failure is
/// recorded in `execution_success` / `execution_message`.
///
/// # Errors
///
/// Returns `ERR_DUPLICATE_IDENTITY` if either capture contains a duplicate
/// entity id.
pub fn track_changes<S, T, E, F>(
    source: &S,
    code: &str,
    options: &DiffOptions,
    run: F,
) -> Result<TrackedRun<T, E>>
where
    S: SnapshotSource + ?Sized,
    E: Display,
    F: FnOnce() -> std::result::Result<T, E>,
{
    let before = source.capture_snapshot();
    let outcome = run();
    let after = source.capture_snapshot();

    let changes = diff_with_options(before.as_ref(), after.as_ref(), code, options)?;
    let changes = match &outcome {
        Ok(_) => changes.with_execution_outcome(true, ""),
        Err(err) => {
            tracing::warn!(error = %err, "tracked run failed");
            changes.with_execution_outcome(false, err.to_string())
        }
    };

    Ok(TrackedRun { outcome, changes })
}
