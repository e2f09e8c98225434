//! Error type for detector operations.

use thiserror::Error;

/// Errors raised by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `start()` was called before any interaction source was registered.
    #[error("there is no interaction to watch")]
    NoInteractions,
}

pub type Result<T> = std::result::Result<T, Error>;
