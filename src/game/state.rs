use super::action::Action;

/// A cell coordinate on the grid, row first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Move position by delta
    pub fn moved_by(&self, d_row: i32, d_column: i32) -> Self {
        Self {
            row: self.row + d_row,
            column: self.column + d_column,
        }
    }

    /// Move position one cell in the direction of `action`
    pub fn moved_in_direction(&self, action: Action) -> Self {
        let (d_row, d_column) = action.delta();
        self.moved_by(d_row, d_column)
    }
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Body,
    Tail,
    Head,
    Apple,
    Empty,
}

/// Rectangular board of cells stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`
    pub fn new(rows: usize, columns: usize, fill: CellKind) -> Self {
        Self {
            rows,
            columns,
            cells: vec![fill; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.row < self.rows as i32
            && pos.column >= 0
            && pos.column < self.columns as i32
    }

    /// True for cells on the outer ring
    pub fn is_border(&self, pos: Position) -> bool {
        pos.row == 0
            || pos.column == 0
            || pos.row == self.rows as i32 - 1
            || pos.column == self.columns as i32 - 1
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_in_bounds(pos) {
            Some(pos.row as usize * self.columns + pos.column as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<CellKind> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell; out-of-bounds writes are ignored
    pub fn set(&mut self, pos: Position, kind: CellKind) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = kind;
        }
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Iterate one row of the grid
    pub fn row(&self, row: usize) -> &[CellKind] {
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    /// Iterate every position with its cell kind, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(idx, kind)| {
            (
                Position::new((idx / columns) as i32, (idx % columns) as i32),
                *kind,
            )
        })
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }
}

/// The snake, head at index 0 and tail last
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    pub body: Vec<Position>,
}

impl Snake {
    /// Lay out a straight snake whose segments trail `heading`
    pub fn new(head: Position, heading: Action, length: usize) -> Self {
        let (d_row, d_column) = heading.delta();
        let mut body = vec![head];

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(-d_row, -d_column));
        }

        Self { body }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Second segment, the one the head may never reverse into
    pub fn neck(&self) -> Option<Position> {
        self.body.get(1).copied()
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
