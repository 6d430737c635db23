//! Result alias for tree construction and edits

use crate::error::SpliceError;

pub type Result<T> = std::result::Result<T, SpliceError>;

pub trait ResultExt<T> {
    /// Turn a contract error into `Ok(None)`.
    ///
    /// A rejected edit (`WrongShape`, `LineUnavailable`, ...) leaves the tree
    /// untouched, so callers walking many containers can skip the ones that
    /// refuse the request. Construction and I/O errors still propagate.
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(kind = ?err.kind(), "skipping rejected request: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
