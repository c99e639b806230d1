/// Errors raised by the grid, the maze contract and the solvers.
///
/// An unsolvable maze is not an error: it shows up as an empty [`crate::Path`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    /// A coordinate lookup fell outside the grid.
    #[error("position ({row}, {col}) is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The maze is in a state no solver can work with, e.g. a blocked start.
    #[error("invalid state: {0}")]
    InvalidState(String),
}
