//! Diagnostics for the Vex compiler.
//!
//! Every phase reports problems as structured [`Diagnostic`] values (level,
//! category, span, message) pushed into a [`DiagnosticQueue`] instead of
//! returning early. A phase boundary asks the queue for
//! [`DiagnosticQueue::has_errors`]; only a non-empty error set halts the
//! downstream phases.
//!
//! Internal compiler errors use [`Severity::Bug`]. They count as errors at a
//! phase boundary but never abort the process on their own.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::{ErrorCode, Phase};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
