//! Bounded theater map and the straight routes flown across it.

use pacific_command_core::{GridCell, ReferenceError, RouteBuilder};

/// Rectangular map the missions fly over.
///
/// Cells outside `rows` × `columns` are treated as off the map and cannot be
/// used as route endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TheaterMap {
    rows: u32,
    columns: u32,
}

impl TheaterMap {
    /// Creates a theater map with the provided dimensions.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows on the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns on the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the cell lies on the map.
    #[must_use]
    pub fn contains(&self, cell: &GridCell) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    fn resolve(&self, reference: &str) -> Result<GridCell, ReferenceError> {
        let cell = GridCell::parse(reference)?;
        if !self.contains(&cell) {
            return Err(ReferenceError::OffMap {
                reference: cell.reference().to_owned(),
            });
        }
        Ok(cell)
    }
}

impl RouteBuilder for TheaterMap {
    fn straight_path(&self, origin: &str, target: &str) -> Result<Vec<GridCell>, ReferenceError> {
        let from = self.resolve(origin)?;
        let to = self.resolve(target)?;
        Ok(straight_line(&from, &to))
    }

    fn cell_by_reference(&self, reference: &str) -> Option<GridCell> {
        self.resolve(reference).ok()
    }
}

/// Cells crossed by a straight line between two cells, both inclusive.
///
/// Uses Bresenham stepping, so diagonal moves cost a single cell and the
/// line always holds `max(|Δrow|, |Δcolumn|) + 1` cells.
#[must_use]
pub fn straight_line(from: &GridCell, to: &GridCell) -> Vec<GridCell> {
    let (mut row, mut column) = (i64::from(from.row()), i64::from(from.column()));
    let (end_row, end_column) = (i64::from(to.row()), i64::from(to.column()));

    let delta_row = (end_row - row).abs();
    let delta_column = (end_column - column).abs();
    let step_row = if end_row >= row { 1 } else { -1 };
    let step_column = if end_column >= column { 1 } else { -1 };

    let capacity = usize::try_from(delta_row.max(delta_column) + 1).unwrap_or(0);
    let mut cells = Vec::with_capacity(capacity);
    let mut error = delta_column - delta_row;

    loop {
        cells.extend(cell_at(row, column));
        if row == end_row && column == end_column {
            break;
        }

        let doubled = 2 * error;
        if doubled > -delta_row {
            error -= delta_row;
            column += step_column;
        }
        if doubled < delta_column {
            error += delta_column;
            row += step_row;
        }
    }

    cells
}

fn cell_at(row: i64, column: i64) -> Option<GridCell> {
    Some(GridCell::new(
        u32::try_from(row).ok()?,
        u32::try_from(column).ok()?,
    ))
}
