use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::MazeError;
use crate::find::Solver;
use crate::grid::{Cell, Grid, Point};

/// Everything a [`Solver`] needs to know about a maze. Solvers only talk to this trait, so any
/// other representation of a walled maze can be searched as well.
pub trait Maze {
    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// The cell the search starts from
    fn start(&self) -> Cell;

    /// The cell the search tries to reach
    fn finish(&self) -> Cell;

    /// Used by a solver to determine if it has arrived at the destination
    fn is_goal(&self, cell: &Cell) -> bool;

    fn cell_at(&self, point: Point) -> Result<Cell, MazeError>;

    /// Every cell of the maze in row-major order
    fn cells(&self) -> impl Iterator<Item = Cell>;

    /// Return an iterator over all cells surrounding the given one, walls included
    fn adjacent_cells(&self, cell: &Cell) -> impl Iterator<Item = Cell>;
}

/// When a cell counts as the end of the search
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    /// Any cell at this position
    Position(Point),
    /// Only this exact cell, position and state
    Exact(Cell),
}

impl Goal {
    pub fn point(&self) -> Point {
        match self {
            Goal::Position(point) => *point,
            Goal::Exact(cell) => cell.point,
        }
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Goal::Position(point) => cell.point == *point,
            Goal::Exact(goal) => cell == goal,
        }
    }
}

/// An ordered list of cells from the start to the goal, both included.
/// An empty path means the goal can not be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path(Vec<Cell>);

impl Path {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// Number of steps taken along the path
    pub fn edges(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.0.iter().map(|c| c.point)
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }
}

impl Deref for Path {
    type Target = [Cell];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A grid with walls, a start and a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalledMaze {
    grid: Grid,
    start: Cell,
    finish: Cell,
    goal: Goal,
}

impl WalledMaze {
    pub fn new(grid: Grid, start: Point, finish: Point) -> Result<Self, MazeError> {
        Self::with_goal(grid, start, Goal::Position(finish))
    }

    /// Both the start and the goal have to be open cells inside the grid. An exact goal must also
    /// agree with the grid on the state of its cell.
    pub fn with_goal(grid: Grid, start: Point, goal: Goal) -> Result<Self, MazeError> {
        let start_cell = grid.cell_at(start.row, start.col)?;
        if !start_cell.is_open() {
            return Err(MazeError::InvalidState(format!(
                "start {} is a blocked cell",
                start
            )));
        }

        let finish = goal.point();
        let finish_cell = grid.cell_at(finish.row, finish.col)?;
        if !finish_cell.is_open() {
            return Err(MazeError::InvalidState(format!(
                "finish {} is a blocked cell",
                finish
            )));
        }
        if !goal.matches(&finish_cell) {
            return Err(MazeError::InvalidArgument(format!(
                "goal {:?} does not match the grid cell {:?}",
                goal, finish_cell
            )));
        }

        Ok(Self {
            grid,
            start: start_cell,
            finish: finish_cell,
            goal,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Solve the maze with the given solver. Returns an empty path if the goal can not be reached.
    pub fn solve<S: Solver>(&self, solver: &S) -> Result<Path, MazeError> {
        Ok(solver.solve(self)?.unwrap_or_default())
    }
}

impl Maze for WalledMaze {
    fn rows(&self) -> usize {
        self.grid.rows()
    }

    fn columns(&self) -> usize {
        self.grid.columns()
    }

    fn start(&self) -> Cell {
        self.start
    }

    fn finish(&self) -> Cell {
        self.finish
    }

    fn is_goal(&self, cell: &Cell) -> bool {
        self.goal.matches(cell)
    }

    fn cell_at(&self, point: Point) -> Result<Cell, MazeError> {
        self.grid.cell_at(point.row, point.col)
    }

    fn cells(&self) -> impl Iterator<Item = Cell> {
        self.grid.cells()
    }

    fn adjacent_cells(&self, cell: &Cell) -> impl Iterator<Item = Cell> {
        self.grid.neighbors_of(cell.point)
    }
}
