use thiserror::Error;

/// Errors reported by the cell. The interpreter itself is infallible by
/// construction; only the program loader can refuse input, and doing so is
/// non-fatal for the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellError {
    /// Program does not fit into the cell's memory. The load is skipped and
    /// memory is left in its prior state.
    #[error("program is {len} bytes but cell memory holds only {capacity}")]
    ProgramTooLarge { len: usize, capacity: usize },
}
