use crate::error::MazeError;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Whether a cell can be walked through
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Open,
    Blocked,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Number of 8-directional unit steps between two points
    pub fn chebyshev(&self, other: Point) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// True if `other` is one of the 8 surrounding points
    pub fn is_adjacent(&self, other: Point) -> bool {
        self.chebyshev(other) == 1
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One position of the grid together with its passability
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub point: Point,
    pub state: CellState,
}

impl Cell {
    pub fn is_open(&self) -> bool {
        self.state == CellState::Open
    }

    pub fn row(&self) -> usize {
        self.point.row
    }

    pub fn col(&self) -> usize {
        self.point.col
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self.state {
                CellState::Open => ".",
                CellState::Blocked => "#",
            }
        )
    }
}

/// A dense rectangular grid of cells, stored row-major in a single vec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid where every cell is open
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::filled(rows, columns, CellState::Open)
    }

    pub fn filled(rows: usize, columns: usize, state: CellState) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| (row, col)))
            .map(|(row, col)| Cell {
                point: Point { row, col },
                state,
            })
            .collect();

        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Build a grid from row-major cell states
    pub fn from_states(
        rows: usize,
        columns: usize,
        states: Vec<CellState>,
    ) -> Result<Self, MazeError> {
        if states.len() != rows * columns {
            return Err(MazeError::InvalidArgument(format!(
                "expected {} cell states for a {}x{} grid, got {}",
                rows * columns,
                rows,
                columns,
                states.len()
            )));
        }

        let cells = states
            .into_iter()
            .enumerate()
            .map(|(i, state)| Cell {
                point: Point {
                    row: i / columns,
                    col: i % columns,
                },
                state,
            })
            .collect();

        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if the provided point lies inside the grid
    pub fn is_valid(&self, point: Point) -> bool {
        point.row < self.rows && point.col < self.columns
    }

    /// Row-major index of a point, if it is inside the grid
    pub fn index_of(&self, point: Point) -> Option<usize> {
        self.is_valid(point)
            .then(|| point.row * self.columns + point.col)
    }

    pub fn get(&self, point: Point) -> Option<Cell> {
        self.index_of(point).map(|i| self.cells[i])
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<Cell, MazeError> {
        self.get(Point { row, col })
            .ok_or(MazeError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                columns: self.columns,
            })
    }

    /// Change the state of a cell while the grid is being built
    pub fn set_state(&mut self, point: Point, state: CellState) -> Result<(), MazeError> {
        let i = self.index_of(point).ok_or(MazeError::OutOfBounds {
            row: point.row,
            col: point.col,
            rows: self.rows,
            columns: self.columns,
        })?;
        self.cells[i].state = state;
        Ok(())
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + Clone + '_ {
        self.cells.iter().copied()
    }

    /// Returns the up to 8 cells surrounding the given point.
    /// Only cells inside the grid are returned, blocked ones included. The scan goes row by row
    /// from the top-left neighbour to the bottom-right one.
    pub fn neighbors_of(&self, point: Point) -> impl Iterator<Item = Cell> {
        let mut cells = Vec::with_capacity(8);

        if !self.is_valid(point) {
            return cells.into_iter();
        }

        let last_row = (point.row + 1).min(self.rows - 1);
        let last_col = (point.col + 1).min(self.columns - 1);

        for row in point.row.saturating_sub(1)..=last_row {
            for col in point.col.saturating_sub(1)..=last_col {
                if row == point.row && col == point.col {
                    continue;
                }
                cells.push(self.cells[row * self.columns + col]);
            }
        }

        cells.into_iter()
    }

    /// Scales the grid by the given factor, i.e. to make it twice as large, pass 2.
    /// Every cell is repeated `factor` times in both directions.
    pub fn scale_up(&mut self, factor: usize) {
        let rows = self.rows * factor;
        let columns = self.columns * factor;

        let mut scaled = Grid::new(rows, columns);
        for cell in self.cells.iter() {
            for r in 0..factor {
                for c in 0..factor {
                    let i = (cell.row() * factor + r) * columns + cell.col() * factor + c;
                    scaled.cells[i].state = cell.state;
                }
            }
        }

        *self = scaled;
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Parses the textual form produced by `Display`: one line per row, `#` for blocked and `.` for
/// open cells. Blank lines and surrounding whitespace are ignored.
impl FromStr for Grid {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        let rows = lines.len();
        let columns = lines.first().map_or(0, |l| l.chars().count());

        let mut states = Vec::with_capacity(rows * columns);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != columns {
                return Err(MazeError::InvalidArgument(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    columns
                )));
            }
            for c in line.chars() {
                states.push(match c {
                    '.' => CellState::Open,
                    '#' => CellState::Blocked,
                    other => {
                        return Err(MazeError::InvalidArgument(format!(
                            "unknown cell character {:?} in row {}",
                            other, row
                        )))
                    }
                });
            }
        }

        Grid::from_states(rows, columns, states)
    }
}
