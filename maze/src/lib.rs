//! Shortest paths through walled mazes read from images.
//!
//! A [`Grid`] of open and blocked cells is wrapped into a [`WalledMaze`] together with a start and
//! a goal. Solving is delegated to anything implementing [`Solver`]; [`BfsSolver`] runs a
//! breadth-first search with 8-directional unit steps and returns one shortest [`Path`], or an
//! empty one when the goal can not be reached.
//!
//! ```
//! use maze::{BfsSolver, Grid, Point, WalledMaze};
//!
//! let grid: Grid = "...\n.#.\n...".parse().unwrap();
//! let maze = WalledMaze::new(grid, Point::new(0, 0), Point::new(2, 2)).unwrap();
//!
//! let path = maze.solve(&BfsSolver).unwrap();
//! // one step around the wall in the middle
//! assert_eq!(path.edges(), 3);
//! ```

pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod maze;
pub mod util;

pub use config::{Palette, Rgba};
pub use error::MazeError;
pub use find::{
    BfsSolver, NodeState, NodeStorage, PathFinder, PathFinderState, PathResult, SearchNode,
    Solver, UNREACHABLE,
};
pub use grid::{Cell, CellState, Grid, Point};
pub use maze::{Goal, Maze, Path, WalledMaze};
