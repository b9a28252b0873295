//! Tabular results with single-traversal locking.
//!
//! A [`Rows`] value is either *live*, wrapping a [`QueryCursor`] returned by
//! the database, or a *table* parsed once from text. Either way only one
//! traversal may be active at a time: `For` loops and rows comparisons
//! acquire the lock through [`RowsHandle::traverse`], and the returned
//! [`RowsTraversal`] guard frees it when dropped, on every exit path.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::host::HostError;

/// One row of cells; `None` is SQL `NULL`.
pub type Row = Vec<Option<String>>;

/// A scrollable cursor over a query result.
///
/// Positions follow the JDBC convention: row `0` is before the first row,
/// rows are numbered from `1`.
pub trait QueryCursor {
    fn column_count(&self) -> usize;

    /// Move before the first row.
    fn before_first(&mut self) -> Result<(), HostError>;

    /// Move to the next row; returns `false` once past the last row.
    fn advance(&mut self) -> Result<bool, HostError>;

    /// Cell `column` (0-based) of the current row.
    fn get(&self, column: usize) -> Result<Option<String>, HostError>;

    /// Current row number, or `0` when not on a row.
    fn row(&self) -> Result<usize, HostError>;

    /// Move to the last row; returns `false` if there are no rows.
    fn last(&mut self) -> Result<bool, HostError>;

    /// Move to row `row`; returns whether that row exists.
    fn absolute(&mut self, row: usize) -> Result<bool, HostError>;
}

/// A [`QueryCursor`] over rows already held in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecCursor {
    columns: usize,
    rows: Vec<Row>,
    /// `0` before the first row, `rows.len() + 1` after the last.
    position: usize,
}

impl VecCursor {
    pub fn new(columns: usize, rows: Vec<Row>) -> Self {
        VecCursor {
            columns,
            rows,
            position: 0,
        }
    }

    fn current(&self) -> Option<&Row> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }
}

impl QueryCursor for VecCursor {
    fn column_count(&self) -> usize {
        self.columns
    }

    fn before_first(&mut self) -> Result<(), HostError> {
        self.position = 0;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool, HostError> {
        if self.position <= self.rows.len() {
            self.position += 1;
        }
        Ok(self.position <= self.rows.len())
    }

    fn get(&self, column: usize) -> Result<Option<String>, HostError> {
        let row = self
            .current()
            .ok_or_else(|| HostError::new("the cursor is not on a row"))?;
        if column >= self.columns {
            return Err(HostError::new(format!("no column {}", column + 1)));
        }
        Ok(row.get(column).cloned().flatten())
    }

    fn row(&self) -> Result<usize, HostError> {
        Ok(if self.current().is_some() {
            self.position
        } else {
            0
        })
    }

    fn last(&mut self) -> Result<bool, HostError> {
        self.position = self.rows.len();
        Ok(!self.rows.is_empty())
    }

    fn absolute(&mut self, row: usize) -> Result<bool, HostError> {
        self.position = row.min(self.rows.len() + 1);
        Ok(self.current().is_some())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LockState {
    Unlocked,
    Locked,
}

enum Source {
    Live(Box<dyn QueryCursor>),
    Table {
        columns: usize,
        rows: Vec<Row>,
        /// Index of the next row to yield.
        position: usize,
    },
}

/// A single-pass sequence of rows with a fixed column count.
pub struct Rows {
    state: LockState,
    source: Source,
    size: Option<usize>,
}

impl Rows {
    /// Wrap a live query cursor.
    pub fn live(cursor: Box<dyn QueryCursor>) -> Self {
        Rows {
            state: LockState::Unlocked,
            source: Source::Live(cursor),
            size: None,
        }
    }

    /// Parse a table from text: one row per line, cells separated by tabs.
    ///
    /// A final line terminator does not start another row, so `""` has no
    /// rows and `"a\n"` has one. Lines with fewer cells than the widest line
    /// are padded with NULL cells.
    pub fn from_text(text: &str) -> Self {
        let mut rows: Vec<Row> = text
            .lines()
            .map(|line| line.split('\t').map(|cell| Some(cell.to_owned())).collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(columns, None);
        }
        Rows {
            state: LockState::Unlocked,
            size: Some(rows.len()),
            source: Source::Table {
                columns,
                rows,
                position: 0,
            },
        }
    }

    pub fn column_count(&self) -> usize {
        match &self.source {
            Source::Live(cursor) => cursor.column_count(),
            Source::Table { columns, .. } => *columns,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Rewind and lock; returns `false` without touching the position if a
    /// traversal is already active.
    pub fn try_lock_and_rewind(&mut self) -> Result<bool, HostError> {
        if self.is_locked() {
            return Ok(false);
        }
        match &mut self.source {
            Source::Live(cursor) => cursor.before_first()?,
            Source::Table { position, .. } => *position = 0,
        }
        self.state = LockState::Locked;
        Ok(true)
    }

    /// The next row, or `None` at the end. Keeps returning `None` once the
    /// end has been reached.
    pub fn next_row(&mut self) -> Result<Option<Row>, HostError> {
        match &mut self.source {
            Source::Live(cursor) => {
                if !cursor.advance()? {
                    return Ok(None);
                }
                let row = (0..cursor.column_count())
                    .map(|column| cursor.get(column))
                    .collect::<Result<Row, _>>()?;
                Ok(Some(row))
            }
            Source::Table { rows, position, .. } => {
                let row = rows.get(*position).cloned();
                if row.is_some() {
                    *position += 1;
                }
                Ok(row)
            }
        }
    }

    /// Release the traversal lock. Idempotent.
    pub fn free(&mut self) {
        self.state = LockState::Unlocked;
    }

    /// Number of rows, computed once.
    ///
    /// For a live cursor this seeks to the last row and back, so it must not
    /// run while another caller depends on the position mid-row; the
    /// evaluator is single-threaded and only asks between statements.
    pub fn size(&mut self) -> Result<usize, HostError> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let size = match &mut self.source {
            Source::Live(cursor) => {
                let current = cursor.row()?;
                let size = if cursor.last()? { cursor.row()? } else { 0 };
                if current == 0 {
                    cursor.before_first()?;
                } else {
                    cursor.absolute(current)?;
                }
                size
            }
            Source::Table { rows, .. } => rows.len(),
        };
        self.size = Some(size);
        Ok(size)
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Live(_) => "live",
            Source::Table { .. } => "table",
        };
        f.debug_struct("Rows")
            .field("source", &source)
            .field("state", &self.state)
            .field("size", &self.size)
            .finish()
    }
}

/// Why a traversal could not start or continue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RowsError {
    #[error("the rows are already being traversed")]
    Locked,
    #[error(transparent)]
    Cursor(#[from] HostError),
}

/// Shared handle to a [`Rows`] value.
#[derive(Clone, Debug)]
pub struct RowsHandle(Rc<RefCell<Rows>>);

impl RowsHandle {
    pub fn new(rows: Rows) -> Self {
        RowsHandle(Rc::new(RefCell::new(rows)))
    }

    pub fn same_handle(&self, other: &RowsHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Lock and rewind, returning a guard that frees the lock on drop.
    pub fn traverse(&self) -> Result<RowsTraversal, RowsError> {
        let mut rows = self.0.try_borrow_mut().map_err(|_| RowsError::Locked)?;
        if rows.try_lock_and_rewind()? {
            Ok(RowsTraversal {
                rows: Rc::clone(&self.0),
            })
        } else {
            Err(RowsError::Locked)
        }
    }

    pub fn size(&self) -> Result<usize, RowsError> {
        let mut rows = self.0.try_borrow_mut().map_err(|_| RowsError::Locked)?;
        Ok(rows.size()?)
    }

    pub fn column_count(&self) -> usize {
        self.0.try_borrow().map_or(0, |rows| rows.column_count())
    }

    pub fn is_locked(&self) -> bool {
        self.0.try_borrow().map_or(true, |rows| rows.is_locked())
    }
}

/// An active traversal; frees the rows when dropped.
pub struct RowsTraversal {
    rows: Rc<RefCell<Rows>>,
}

impl RowsTraversal {
    pub fn next_row(&mut self) -> Result<Option<Row>, RowsError> {
        let mut rows = self.rows.try_borrow_mut().map_err(|_| RowsError::Locked)?;
        Ok(rows.next_row()?)
    }
}

impl Drop for RowsTraversal {
    fn drop(&mut self) {
        if let Ok(mut rows) = self.rows.try_borrow_mut() {
            rows.free();
        }
    }
}

/// Structural equality of two rows values.
///
/// The same handle is equal to itself without traversing. Otherwise both
/// are locked and walked in lockstep; they are equal when every pair of
/// rows matches and both end together.
pub fn rows_equal(left: &RowsHandle, right: &RowsHandle) -> Result<bool, RowsError> {
    if left.same_handle(right) {
        return Ok(true);
    }
    let mut left = left.traverse()?;
    let mut right = right.traverse()?;
    loop {
        match (left.next_row()?, right.next_row()?) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) if a == b => {}
            _ => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests;
