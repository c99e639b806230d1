use std::{collections::VecDeque, fmt::Display};

use log::{debug, log_enabled, trace, Level};

use crate::error::MazeError;
use crate::grid::{Cell, Point};
use crate::maze::{Maze, Path};

/// A strategy for finding a path through a [`Maze`]
pub trait Solver {
    /// Returns `Ok(None)` if the goal can not be reached from the start
    fn solve<M: Maze>(&self, maze: &M) -> Result<Option<Path>, MazeError>;
}

/// Distance of every node that has not been reached (yet)
pub const UNREACHABLE: usize = usize::MAX;

/// Where a node is in the breadth-first traversal. Nodes only ever move forward through these
/// states.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum NodeState {
    #[default]
    Unvisited,
    Frontier,
    Settled,
}

/// The search state kept for every cell of the maze
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SearchNode {
    pub cell: Cell,
    pub state: NodeState,
    pub distance: usize,
    /// Index of the node this one was reached from
    pub predecessor: Option<usize>,
}

impl SearchNode {
    fn new(cell: Cell) -> Self {
        Self {
            cell,
            // walls are treated as already explored dead ends
            state: if cell.is_open() {
                NodeState::Unvisited
            } else {
                NodeState::Settled
            },
            distance: UNREACHABLE,
            predecessor: None,
        }
    }
}

/// Flat row-major arena holding one [`SearchNode`] per cell
#[derive(Debug, Clone)]
pub struct NodeStorage {
    rows: usize,
    columns: usize,
    nodes: Vec<SearchNode>,
}

impl NodeStorage {
    pub fn new<M: Maze>(maze: &M) -> Self {
        let rows = maze.rows();
        let columns = maze.columns();

        let mut nodes: Vec<SearchNode> = (0..rows * columns)
            .map(|i| {
                SearchNode::new(Cell {
                    point: Point::new(i / columns, i % columns),
                    state: Default::default(),
                })
            })
            .collect();

        for cell in maze.cells() {
            if cell.point.row < rows && cell.point.col < columns {
                nodes[cell.point.row * columns + cell.point.col] = SearchNode::new(cell);
            }
        }

        Self {
            rows,
            columns,
            nodes,
        }
    }

    pub fn index_of(&self, point: Point) -> Option<usize> {
        (point.row < self.rows && point.col < self.columns)
            .then(|| point.row * self.columns + point.col)
    }

    pub fn get(&self, index: usize) -> Option<&SearchNode> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SearchNode> {
        self.nodes.get_mut(index)
    }

    pub fn node_at(&self, point: Point) -> Option<&SearchNode> {
        self.index_of(point).map(|i| &self.nodes[i])
    }

    /// Follow the predecessor links back from `end` and return the cells in walking order.
    /// An index outside the arena gives an empty path.
    pub fn trace_back(&self, end: usize) -> Path {
        let mut cells = Vec::new();
        let mut current = self.get(end);

        while let Some(node) = current {
            cells.push(node.cell);
            current = node.predecessor.and_then(|i| self.get(i));
        }

        cells.reverse();
        Path::new(cells)
    }
}

impl Display for NodeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.nodes.chunks(self.columns.max(1)) {
            for node in row {
                match (node.cell.is_open(), node.distance) {
                    (false, _) => write!(f, "### ")?,
                    (true, UNREACHABLE) => write!(f, "{:>3} ", "")?,
                    (true, distance) => write!(f, "{:03} ", distance)?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult {
    pub path: Path,
    pub start: Point,
    pub goal: Point,
    pub distance: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState {
    Computing,
    NoPathFound,
    PathFound(PathResult),
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// Breadth-first search over a maze. Every call to [`PathFinder::step`] expands a single node,
/// [`PathFinder::finish`] runs the search to the end.
#[derive(Debug)]
pub struct PathFinder<'m, M: Maze> {
    maze: &'m M,
    start: Cell,
    nodes: NodeStorage,
    frontier: VecDeque<usize>,
    state: PathFinderState,
}

impl<'m, M: Maze> PathFinder<'m, M> {
    /// Sets up a fresh search. Fails if the start lies outside the maze or is blocked.
    pub fn new(maze: &'m M) -> Result<Self, MazeError> {
        let start = maze.cell_at(maze.start().point)?;
        if !start.is_open() {
            return Err(MazeError::InvalidState(format!(
                "can not search from the blocked cell {}",
                start.point
            )));
        }

        let mut nodes = NodeStorage::new(maze);
        let index = nodes
            .index_of(start.point)
            .ok_or(MazeError::OutOfBounds {
                row: start.point.row,
                col: start.point.col,
                rows: maze.rows(),
                columns: maze.columns(),
            })?;

        if let Some(node) = nodes.get_mut(index) {
            node.state = NodeState::Frontier;
            node.distance = 0;
            node.predecessor = None;
        }

        Ok(Self {
            maze,
            start,
            nodes,
            frontier: VecDeque::from([index]),
            state: PathFinderState::Computing,
        })
    }

    pub fn finish(mut self) -> (PathFinderState, NodeStorage) {
        while !self.step().is_done() {}

        if log_enabled!(Level::Trace) {
            trace!("distances:\n{}", self.nodes);
        }

        (self.state, self.nodes)
    }

    pub fn step(&mut self) -> &PathFinderState {
        if self.state.is_done() {
            return &self.state;
        }

        let maze = self.maze;

        let Some(current) = self.frontier.pop_front() else {
            debug!("no path from {}, frontier exhausted", self.start.point);
            self.state = PathFinderState::NoPathFound;
            return &self.state;
        };

        let Some(&node) = self.nodes.get(current) else {
            return &self.state;
        };

        if maze.is_goal(&node.cell) {
            debug!(
                "found goal {} from {}: distance={}",
                node.cell.point, self.start.point, node.distance
            );

            self.state = PathFinderState::PathFound(PathResult {
                path: self.nodes.trace_back(current),
                start: self.start.point,
                goal: node.cell.point,
                distance: node.distance,
            });
            return &self.state;
        }

        for neighbor in maze.adjacent_cells(&node.cell) {
            let Some(index) = self.nodes.index_of(neighbor.point) else {
                continue;
            };

            let Some(next) = self.nodes.get_mut(index) else {
                continue;
            };
            if next.state == NodeState::Unvisited {
                next.state = NodeState::Frontier;
                next.distance = node.distance + 1;
                next.predecessor = Some(current);
                self.frontier.push_back(index);
            }
        }

        if let Some(node) = self.nodes.get_mut(current) {
            node.state = NodeState::Settled;
        }

        &self.state
    }

    pub fn state(&self) -> &PathFinderState {
        &self.state
    }

    pub fn get_visited(&self) -> &NodeStorage {
        &self.nodes
    }

    pub fn start(&self) -> Point {
        self.start.point
    }
}

/// Finds a shortest path with an exhaustive breadth-first search
#[derive(Debug, Default, Clone, Copy)]
pub struct BfsSolver;

impl Solver for BfsSolver {
    fn solve<M: Maze>(&self, maze: &M) -> Result<Option<Path>, MazeError> {
        let (state, _) = PathFinder::new(maze)?.finish();

        Ok(match state {
            PathFinderState::PathFound(result) => Some(result.path),
            PathFinderState::NoPathFound | PathFinderState::Computing => None,
        })
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::grid::{CellState, Grid};
    use crate::maze::WalledMaze;

    fn create_maze(map: &str, start: (usize, usize), finish: (usize, usize)) -> WalledMaze {
        let grid: Grid = map.parse().unwrap();
        WalledMaze::new(
            grid,
            Point::new(start.0, start.1),
            Point::new(finish.0, finish.1),
        )
        .unwrap()
    }

    fn create_basic_maze() -> WalledMaze {
        create_maze(
            "#######
             #.###.#
             #.###.#
             #.#...#
             #.#.###
             #......
             #######",
            (1, 1),
            (1, 5),
        )
    }

    fn points(path: &Path) -> Vec<(usize, usize)> {
        path.points().map(|p| (p.row, p.col)).collect()
    }

    fn assert_valid_path<M: Maze>(maze: &M, path: &Path) {
        assert_eq!(path.first().map(|c| c.point), Some(maze.start().point));
        assert_eq!(path.last().map(|c| c.point), Some(maze.finish().point));
        for cell in path.iter() {
            assert!(cell.is_open(), "path goes through wall at {}", cell.point);
        }
        for pair in path.windows(2) {
            assert!(
                pair[0].point.is_adjacent(pair[1].point),
                "{} and {} are not adjacent",
                pair[0].point,
                pair[1].point
            );
        }
    }

    /// A maze that skips the checks `WalledMaze` does on construction
    struct UncheckedMaze {
        grid: Grid,
        start: Point,
        finish: Point,
    }

    impl Maze for UncheckedMaze {
        fn rows(&self) -> usize {
            self.grid.rows()
        }

        fn columns(&self) -> usize {
            self.grid.columns()
        }

        fn start(&self) -> Cell {
            self.grid.get(self.start).unwrap_or(Cell {
                point: self.start,
                state: CellState::Open,
            })
        }

        fn finish(&self) -> Cell {
            self.grid.get(self.finish).unwrap_or(Cell {
                point: self.finish,
                state: CellState::Open,
            })
        }

        fn is_goal(&self, cell: &Cell) -> bool {
            cell.point == self.finish
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

    #[test]
    fn test_basic_route() {
        let maze = create_basic_maze();

        let path = maze.solve(&BfsSolver).unwrap();

        assert_eq!(path.edges(), 8);
        assert_valid_path(&maze, &path);
    }

    #[test]
    fn test_single_cell() {
        let maze = create_maze(".", (0, 0), (0, 0));

        let path = maze.solve(&BfsSolver).unwrap();
        assert_eq!(points(&path), vec![(0, 0)]);
        assert_eq!(path.edges(), 0);
    }

    #[test]
    fn test_diagonal_shortcut() {
        let maze = create_maze("...\n...\n...", (0, 0), (2, 2));

        let path = maze.solve(&BfsSolver).unwrap();
        assert_eq!(points(&path), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_route_around_center() {
        let maze = create_maze("...\n.#.\n...", (0, 0), (2, 2));

        let path = maze.solve(&BfsSolver).unwrap();
        // the blocked centre forces a detour of one extra step
        assert_eq!(path.edges(), 3);
        assert_eq!(path.len(), 4);
        assert!(!path.points().any(|p| p == Point::new(1, 1)));
        assert_valid_path(&maze, &path);

        // first neighbour in scan order wins
        assert_eq!(points(&path), vec![(0, 0), (0, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_basic_no_route() {
        let maze = create_maze(
            "...
             ...
             ...
             ###
             ...
             ...
             ...",
            (0, 0),
            (6, 2),
        );

        let path = maze.solve(&BfsSolver).unwrap();
        assert!(path.is_empty());

        let (state, nodes) = PathFinder::new(&maze).unwrap().finish();
        assert_eq!(state, PathFinderState::NoPathFound);
        // everything above the wall was reached, nothing below it
        assert_eq!(nodes.node_at(Point::new(2, 2)).unwrap().distance, 2);
        assert_eq!(nodes.node_at(Point::new(4, 0)).unwrap().distance, UNREACHABLE);
        assert_eq!(
            nodes.node_at(Point::new(4, 0)).unwrap().state,
            NodeState::Unvisited
        );
    }

    #[test]
    fn test_open_grid_uses_chebyshev_distance() {
        for (rows, columns) in [(1, 5), (4, 4), (3, 7), (6, 2)] {
            let grid = Grid::new(rows, columns);
            for start in grid.cells() {
                for finish in grid.cells() {
                    let maze = WalledMaze::new(grid.clone(), start.point, finish.point).unwrap();
                    let path = maze.solve(&BfsSolver).unwrap();

                    assert_eq!(
                        path.edges(),
                        start.point.chebyshev(finish.point),
                        "{} -> {} in a {}x{} grid",
                        start.point,
                        finish.point,
                        rows,
                        columns
                    );
                    assert_valid_path(&maze, &path);
                }
            }
        }
    }

    #[test]
    fn test_winding_route() {
        let maze = create_maze(
            ".#......
             .#.####.
             .#.#..#.
             .#.#.##.
             ...#....",
            (0, 0),
            (2, 4),
        );

        let path = maze.solve(&BfsSolver).unwrap();
        assert_valid_path(&maze, &path);
        assert_eq!(path.edges(), 18);
    }

    #[test]
    fn test_solving_twice_is_identical() {
        let maze = create_basic_maze();

        let first = maze.solve(&BfsSolver).unwrap();
        let second = maze.solve(&BfsSolver).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_by_step() {
        let maze = create_maze("...\n...\n...", (0, 0), (2, 2));
        let mut finder = PathFinder::new(&maze).unwrap();

        assert_eq!(finder.start(), Point::new(0, 0));
        assert_eq!(finder.state(), &PathFinderState::Computing);
        assert_eq!(
            finder.get_visited().node_at(Point::new(0, 0)).unwrap().state,
            NodeState::Frontier
        );

        // expanding the start discovers its three neighbours
        assert!(!finder.step().is_done());
        let visited = finder.get_visited();
        assert_eq!(
            visited.node_at(Point::new(0, 0)).unwrap().state,
            NodeState::Settled
        );
        for point in [Point::new(0, 1), Point::new(1, 0), Point::new(1, 1)] {
            let node = visited.node_at(point).unwrap();
            assert_eq!(node.state, NodeState::Frontier);
            assert_eq!(node.distance, 1);
            assert_eq!(node.predecessor, visited.index_of(Point::new(0, 0)));
        }
        assert_eq!(
            visited.node_at(Point::new(2, 2)).unwrap().state,
            NodeState::Unvisited
        );

        let (state, _) = finder.finish();
        assert!(matches!(
            state,
            PathFinderState::PathFound(PathResult { distance: 2, .. })
        ));
    }

    #[test]
    fn test_walls_start_settled() {
        let maze = create_maze("..\n#.", (0, 0), (1, 1));
        let finder = PathFinder::new(&maze).unwrap();

        let wall = finder.get_visited().node_at(Point::new(1, 0)).unwrap();
        assert_eq!(wall.state, NodeState::Settled);
        assert_eq!(wall.distance, UNREACHABLE);
    }

    #[test]
    fn test_finished_state_is_sticky() {
        let maze = create_maze("..", (0, 0), (0, 1));
        let mut finder = PathFinder::new(&maze).unwrap();

        while !finder.step().is_done() {}
        let done = finder.state().clone();
        assert_eq!(finder.step(), &done);
    }

    #[test]
    fn test_blocked_start() {
        let maze = UncheckedMaze {
            grid: "#.\n..".parse().unwrap(),
            start: Point::new(0, 0),
            finish: Point::new(1, 1),
        };

        assert!(matches!(
            BfsSolver.solve(&maze),
            Err(MazeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_start_outside() {
        let maze = UncheckedMaze {
            grid: Grid::new(2, 2),
            start: Point::new(4, 0),
            finish: Point::new(1, 1),
        };

        assert!(matches!(
            BfsSolver.solve(&maze),
            Err(MazeError::OutOfBounds { row: 4, .. })
        ));
    }

    #[test]
    fn test_blocked_finish_is_never_reached() {
        let maze = UncheckedMaze {
            grid: "..\n.#".parse().unwrap(),
            start: Point::new(0, 0),
            finish: Point::new(1, 1),
        };

        assert_eq!(BfsSolver.solve(&maze), Ok(None));
    }

    #[test]
    fn test_node_lookup_out_of_range() {
        let maze = create_maze("..\n..", (0, 0), (1, 1));
        let (_, mut nodes) = PathFinder::new(&maze).unwrap().finish();

        assert_eq!(nodes.get(0).map(|n| n.distance), Some(0));
        assert!(nodes.get(4).is_none());
        assert!(nodes.get_mut(4).is_none());
        assert!(nodes.node_at(Point::new(2, 0)).is_none());
        assert!(nodes.trace_back(4).is_empty());

        let end = nodes.index_of(Point::new(1, 1)).unwrap();
        assert_eq!(points(&nodes.trace_back(end)), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_distance_map_display() {
        let maze = create_maze("..#", (0, 0), (0, 1));
        let (_, nodes) = PathFinder::new(&maze).unwrap().finish();

        assert_eq!(nodes.to_string(), "000 001 ### \n");
    }

    #[test]
    fn test_concurrent_solves() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WalledMaze>();
        assert_send_sync::<BfsSolver>();

        let maze = create_basic_maze();
        let expected = maze.solve(&BfsSolver).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| maze.solve(&BfsSolver).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
