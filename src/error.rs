use allocator_api2::alloc::Layout;
use std::alloc::handle_alloc_error;
use std::fmt::{self, Display, Formatter};

/// The error type for the fallible (`try_*`) operations of an
/// [`UnrolledList`](crate::UnrolledList).
///
/// When an operation returns this error, the list is left exactly as it was
/// before the call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TryReserveError {
    /// The size of a node's storage would overflow `isize::MAX` bytes.
    CapacityOverflow,
    /// The allocator refused to hand out memory for a node record or for
    /// a node's element storage.
    #[non_exhaustive]
    AllocError {
        /// The layout of the refused request.
        layout: Layout,
    },
}

impl TryReserveError {
    /// Panic the way std collections do when they run out of memory.
    pub(crate) fn panic(self) -> ! {
        match self {
            TryReserveError::CapacityOverflow => panic!("{}", self),
            TryReserveError::AllocError { layout } => handle_alloc_error(layout),
        }
    }
}

impl Display for TryReserveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;

        let reason = match self {
            Self::CapacityOverflow => " because the node storage would exceed the maximum size",
            Self::AllocError { .. } => " because the memory allocator returned an error",
        };

        f.write_str(reason)
    }
}

impl std::error::Error for TryReserveError {}

/// Unwrap the result of a fallible operation for its infallible counterpart.
pub(crate) fn infallible<R>(result: Result<R, TryReserveError>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => err.panic(),
    }
}
