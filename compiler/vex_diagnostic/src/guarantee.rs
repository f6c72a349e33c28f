//! Proof that at least one error was emitted.

use std::fmt;

/// Zero-sized token that can only be obtained when an error was recorded.
///
/// Phases return `Result<T, ErrorGuaranteed>` so a failing phase cannot
/// forget to report why it failed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// `Some` iff `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

#[cfg(test)]
mod tests;
