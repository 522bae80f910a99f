//! Display grid: cells, cursor, active attributes and pending changes.
//!
//! The grid owns a flat row-major vector of cells. Writes go through the
//! cursor; every write that changes a cell's current content or attributes
//! queues a [`PendingChange`] keyed by position. The pending set is the cells
//! written with a different value since the last flush; a cell changed and
//! then changed back stays queued.

use crate::attrs::AttrWord;
use crate::cell::{Cell, EMPTY_CHAR};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A queued, not-yet-rendered cell mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingChange {
    pub row: u16,
    pub col: u16,
    pub ch: char,
    pub attrs: AttrWord,
}

/// How the cursor moved after a character write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// One column to the right.
    Moved,
    /// To column 0 of the next row.
    Wrapped,
    /// Stayed on the bottom-right cell (no scrolling).
    Held,
}

/// 2D character-cell grid.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: u16,
    cols: u16,
    cursor_row: u16,
    cursor_col: u16,
    attrs: AttrWord,
    empty_char: char,
    pending: Vec<PendingChange>,
    // (row, col) -> index into `pending`
    pending_index: HashMap<(u16, u16), usize>,
}

impl Grid {
    /// Create a grid of `rows` x `cols` empty cells.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self::with_empty_char(rows, cols, EMPTY_CHAR)
    }

    /// Create a grid whose blank cells show `empty_char`.
    pub fn with_empty_char(rows: u16, cols: u16, empty_char: char) -> Self {
        let len = (rows as usize) * (cols as usize);
        Self {
            cells: vec![Cell::blank(empty_char); len],
            rows,
            cols,
            cursor_row: 0,
            cursor_col: 0,
            attrs: AttrWord::NORMAL,
            empty_char,
            pending: Vec::new(),
            pending_index: HashMap::new(),
        }
    }

    /// Number of rows (height).
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns (width).
    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn empty_char(&self) -> char {
        self.empty_char
    }

    /// Cursor position as `(row, col)`.
    ///
    /// May lie outside the grid after a shrinking resize.
    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor_row, self.cursor_col)
    }

    /// Get the cell at `(row, col)`, or `None` if out of bounds.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if self.contains(row, col) {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// The characters of one row as a string.
    pub fn row_text(&self, row: u16) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        let start = (row as usize) * (self.cols as usize);
        let end = start + (self.cols as usize);
        Some(self.cells[start..end].iter().map(Cell::content).collect())
    }

    // ── Active attributes ───────────────────────────────────────────

    /// Attribute word applied by cursor writes that don't pass their own.
    pub fn attrs(&self) -> AttrWord {
        self.attrs
    }

    pub fn set_attrs(&mut self, attrs: AttrWord) {
        self.attrs.set(attrs);
    }

    pub fn enable_attrs(&mut self, attrs: AttrWord) {
        self.attrs.enable(attrs);
    }

    pub fn disable_attrs(&mut self, attrs: AttrWord) {
        self.attrs.disable(attrs);
    }

    // ── Cursor ──────────────────────────────────────────────────────

    /// Move the cursor. Cell content is untouched.
    pub fn move_to(&mut self, row: u16, col: u16) -> Result<()> {
        if !self.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        self.cursor_row = row;
        self.cursor_col = col;
        Ok(())
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Write `ch` at the cursor with `attrs` and advance the cursor.
    ///
    /// Tab, newline and carriage return are stored as the empty character.
    /// Nothing is queued when the cell already shows `(ch, attrs)`.
    pub fn write_char(&mut self, ch: char, attrs: AttrWord) -> Result<Advance> {
        let (row, col) = self.cursor();
        if !self.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        let ch = match ch {
            '\t' | '\n' | '\r' => self.empty_char,
            other => other,
        };
        let idx = self.index(row, col);
        if self.cells[idx].differs(ch, attrs) {
            self.cells[idx] = Cell::new(ch, attrs);
            self.queue(PendingChange {
                row,
                col,
                ch,
                attrs,
            });
        }
        Ok(self.advance())
    }

    /// Write a one-character string, as delivered by text-producing hosts.
    pub fn write_symbol(&mut self, symbol: &str, attrs: AttrWord) -> Result<Advance> {
        let mut chars = symbol.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.write_char(ch, attrs),
            _ => Err(Error::InvalidCharacter {
                len: symbol.chars().count(),
            }),
        }
    }

    /// Write every character of `s`, wrapping at the right edge.
    ///
    /// Once the cursor has been held on the bottom-right cell, the remaining
    /// characters fail with [`Error::Overflow`]; the prefix stays written.
    pub fn write_str(&mut self, s: &str, attrs: AttrWord) -> Result<usize> {
        let requested = s.chars().count();
        let mut written = 0;
        let mut held = false;
        for ch in s.chars() {
            if held {
                return Err(Error::Overflow { written, requested });
            }
            held = self.write_char(ch, attrs)? == Advance::Held;
            written += 1;
        }
        Ok(written)
    }

    /// Move to `(row, col)`, then [`write_str`](Self::write_str).
    pub fn write_str_at(&mut self, row: u16, col: u16, s: &str, attrs: AttrWord) -> Result<usize> {
        self.move_to(row, col)?;
        self.write_str(s, attrs)
    }

    fn advance(&mut self) -> Advance {
        if self.cursor_col + 1 < self.cols {
            self.cursor_col += 1;
            Advance::Moved
        } else if self.cursor_row + 1 < self.rows {
            self.cursor_row += 1;
            self.cursor_col = 0;
            Advance::Wrapped
        } else {
            Advance::Held
        }
    }

    // ── Fill / clear / resize ───────────────────────────────────────

    /// Reset every cell to empty and drop all pending changes.
    ///
    /// Callers that own a surface repaint it immediately; nothing is queued.
    pub fn clear(&mut self) {
        let blank = Cell::blank(self.empty_char);
        self.cells.fill(blank);
        self.pending.clear();
        self.pending_index.clear();

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = self.rows, cols = self.cols, "grid cleared");
    }

    /// Resize in place.
    ///
    /// Cells in the overlap keep their content; new cells are empty. Cells and
    /// pending changes outside the new bounds are discarded silently. The
    /// cursor is left where it is, even when it falls outside.
    pub fn resize(&mut self, new_rows: u16, new_cols: u16) {
        if new_rows == self.rows && new_cols == self.cols {
            return;
        }
        let mut new_cells =
            vec![Cell::blank(self.empty_char); new_cols as usize * new_rows as usize];
        let copy_rows = self.rows.min(new_rows);
        let copy_cols = self.cols.min(new_cols);

        for r in 0..copy_rows {
            let old_start = (r as usize) * (self.cols as usize);
            let new_start = (r as usize) * (new_cols as usize);
            new_cells[new_start..new_start + copy_cols as usize]
                .copy_from_slice(&self.cells[old_start..old_start + copy_cols as usize]);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from_rows = self.rows,
            from_cols = self.cols,
            to_rows = new_rows,
            to_cols = new_cols,
            "grid resized"
        );

        self.cells = new_cells;
        self.rows = new_rows;
        self.cols = new_cols;

        let kept: Vec<PendingChange> = std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|c| c.row < new_rows && c.col < new_cols)
            .collect();
        self.pending_index.clear();
        for change in kept {
            self.queue(change);
        }
    }

    // ── Pending changes ─────────────────────────────────────────────

    /// Number of queued changes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queued changes in insertion order, without draining them.
    pub fn pending(&self) -> &[PendingChange] {
        &self.pending
    }

    /// Drain queued changes in insertion order (not row-major).
    pub fn take_pending_changes(&mut self) -> Vec<PendingChange> {
        self.pending_index.clear();
        std::mem::take(&mut self.pending)
    }

    /// Re-queue changes that were taken but not delivered.
    ///
    /// A cell that was written again since the changes were taken keeps its
    /// newer change; changes outside the grid are dropped.
    pub fn restore_pending<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = PendingChange>,
    {
        for change in changes {
            if !self.contains(change.row, change.col)
                || self.pending_index.contains_key(&(change.row, change.col))
            {
                continue;
            }
            self.queue(change);
        }
    }

    /// Queue every written cell for redraw, for when the surface lost its
    /// pixels (font change). Empty cells are left to the background fill.
    pub fn invalidate(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = self.cells[self.index(row, col)];
                if !cell.is_empty() {
                    self.queue(PendingChange {
                        row,
                        col,
                        ch: cell.content(),
                        attrs: cell.attrs(),
                    });
                }
            }
        }
    }

    fn queue(&mut self, change: PendingChange) {
        match self.pending_index.entry((change.row, change.col)) {
            Entry::Occupied(slot) => self.pending[*slot.get()] = change,
            Entry::Vacant(slot) => {
                slot.insert(self.pending.len());
                self.pending.push(change);
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn contains(&self, row: u16, col: u16) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline]
    fn index(&self, row: u16, col: u16) -> usize {
        (row as usize) * (self.cols as usize) + (col as usize)
    }

    fn out_of_bounds(&self, row: u16, col: u16) -> Error {
        Error::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }
}
