//! Canonical logging macros
//!
//! Every operation boundary logs through these so that `component`, `op` and
//! `event` are always present.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use modeldelta_core::log_op_start;
/// log_op_start!("diff_snapshots");
/// log_op_start!("diff_snapshots", document = "Assembly");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use modeldelta_core::log_op_end;
/// log_op_end!("diff_snapshots", duration_ms = 3);
/// log_op_end!("diff_snapshots", duration_ms = 3, created = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into [`ExError`](crate::errors::ExError).
///
/// # Example
///
/// ```
/// # use modeldelta_core::log_op_error;
/// # use modeldelta_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::DuplicateIdentity).with_entity_id("Box");
/// log_op_error!("diff_snapshots", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($field)*
        );
    }};
}
