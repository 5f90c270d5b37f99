use thiserror::Error;

pub type Result<T, E = QuadtreeError> = std::result::Result<T, E>;

/// Caller contract violations detected by the checked operations.
///
/// A rejected call leaves the tree untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuadtreeError {
    #[error("value bounds are not contained in the tree region")]
    OutOfRegion,

    #[error("no stored value is equal to the value to remove")]
    NotFound,
}
