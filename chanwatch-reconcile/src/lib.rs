//! # chanwatch-reconcile
//!
//! Channel drift detection and correction.
//!
//! Call [`reconcile`] for a single access point, or [`Reconciler::run_pass`]
//! to authorize and sweep the whole fleet once.

pub mod error;
pub mod pass;
pub mod reconciler;

pub use error::{ErrorKind, ReconcileError, ReconcileStep};
pub use pass::{DeviceReport, PassReport, PassSummary, Reconciler};
pub use reconciler::{reconcile, ReconcileOutcome};
