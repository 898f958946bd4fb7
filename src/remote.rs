//! The remote document as seen by the sync driver, plus an in-memory stand-in.
//!
//! Offsets follow Google Docs: the body starts at 1, every document ends with
//! a newline that can never be deleted, and a table occupies one offset for
//! itself, one per row, one per cell and one to close it, around the text of
//! its cells. A cell's text always ends with its own newline.

use crate::edit::{EditOp, Range};
use crate::error::RemoteError;
use crate::flow::utf16_len;

/// Offset of the first character of the body.
pub const BODY_START: usize = 1;

/// Where one table cell's content lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHandle {
    pub start_offset: usize,
    pub end_offset: usize,
}

/// A table as reported by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub start_offset: usize,
    pub end_offset: usize,
    pub rows: Vec<Vec<CellHandle>>,
}

impl TableHandle {
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellHandle> {
        self.rows.get(row)?.get(column)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// One past the mandatory trailing newline.
    pub end_offset: usize,
    pub tables: Vec<TableHandle>,
}

impl DocumentSnapshot {
    /// Offset where new content is appended: just before the trailing newline.
    pub fn insertion_point(&self) -> usize {
        self.end_offset.saturating_sub(1).max(BODY_START)
    }

    /// The last table starting at or after `offset`.
    pub fn table_from(&self, offset: usize) -> Option<&TableHandle> {
        self.tables.iter().rev().find(|t| t.start_offset >= offset)
    }
}

/// The collaborator owning the live document.
pub trait RemoteDocument {
    fn fetch_document(&self) -> Result<DocumentSnapshot, RemoteError>;

    /// Apply `edits` atomically and in order. Offsets in later edits assume
    /// the earlier edits of the same call have already been applied.
    fn apply_edits(&mut self, edits: &[EditOp]) -> Result<(), RemoteError>;

    fn max_edits_per_call(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Text(String),
    Table(Vec<Vec<String>>),
}

impl Element {
    fn len(&self) -> usize {
        match self {
            Element::Text(text) => utf16_len(text),
            Element::Table(rows) => {
                2 + rows
                    .iter()
                    .map(|row| 1 + row.iter().map(|cell| 1 + utf16_len(cell)).sum::<usize>())
                    .sum::<usize>()
            }
        }
    }
}

/// Where an insertion offset lands.
enum Position {
    Text {
        element: usize,
        offset: usize,
    },
    Cell {
        element: usize,
        row: usize,
        column: usize,
        offset: usize,
    },
}

/// A remote document held in memory, validating every edit the way the
/// real service would and recording each accepted call.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    max_edits_per_call: usize,
    calls: Vec<Vec<EditOp>>,
}

impl MemoryDocument {
    /// An empty document: just the trailing newline.
    pub fn new(max_edits_per_call: usize) -> Self {
        Self::with_text("", max_edits_per_call)
    }

    /// A document whose body is `text` followed by the trailing newline.
    pub fn with_text(text: &str, max_edits_per_call: usize) -> Self {
        Self {
            elements: vec![Element::Text(format!("{text}\n"))],
            max_edits_per_call: max_edits_per_call.max(1),
            calls: Vec::new(),
        }
    }

    /// Every accepted `apply_edits` call, in order.
    pub fn calls(&self) -> &[Vec<EditOp>] {
        &self.calls
    }

    pub fn end_offset(&self) -> usize {
        BODY_START + self.elements.iter().map(Element::len).sum::<usize>()
    }

    /// The text under `range`, skipping table structure.
    pub fn text_in(&self, range: Range) -> String {
        let units = self.linearize();
        let lo = range.start_index.saturating_sub(BODY_START).min(units.len());
        let hi = range.end_index.saturating_sub(BODY_START).min(units.len());
        let text: Vec<u16> = units[lo..hi.max(lo)].iter().flatten().copied().collect();
        String::from_utf16_lossy(&text)
    }

    /// Cell texts of the `index`-th table, without their trailing newlines.
    pub fn table_cells(&self, index: usize) -> Option<Vec<Vec<String>>> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                Element::Table(rows) => Some(rows),
                Element::Text(_) => None,
            })
            .nth(index)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.iter().map(|cell| cell_text(cell)).collect())
                    .collect()
            })
    }

    /// Plain-text rendering, tables drawn as pipe rows.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                Element::Text(text) => out.push_str(text),
                Element::Table(rows) => {
                    for row in rows {
                        out.push('|');
                        for cell in row {
                            out.push(' ');
                            out.push_str(&cell_text(cell));
                            out.push_str(" |");
                        }
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    fn snapshot(&self) -> DocumentSnapshot {
        let mut tables = Vec::new();
        let mut pos = BODY_START;
        for element in &self.elements {
            if let Element::Table(rows) = element {
                let start_offset = pos;
                let mut p = start_offset + 1;
                let mut handles = Vec::with_capacity(rows.len());
                for row in rows {
                    p += 1;
                    let mut cells = Vec::with_capacity(row.len());
                    for cell in row {
                        let start = p + 1;
                        let end = start + utf16_len(cell);
                        cells.push(CellHandle {
                            start_offset: start,
                            end_offset: end,
                        });
                        p = end;
                    }
                    handles.push(cells);
                }
                tables.push(TableHandle {
                    start_offset,
                    end_offset: p + 1,
                    rows: handles,
                });
            }
            pos += element.len();
        }
        DocumentSnapshot {
            end_offset: pos,
            tables,
        }
    }

    /// One slot per offset: text units, or `None` for table structure.
    fn linearize(&self) -> Vec<Option<u16>> {
        let mut units = Vec::new();
        for element in &self.elements {
            match element {
                Element::Text(text) => units.extend(text.encode_utf16().map(Some)),
                Element::Table(rows) => {
                    units.push(None);
                    for row in rows {
                        units.push(None);
                        for cell in row {
                            units.push(None);
                            units.extend(cell.encode_utf16().map(Some));
                        }
                    }
                    units.push(None);
                }
            }
        }
        units
    }

    fn locate(&self, index: usize) -> Option<Position> {
        let mut pos = BODY_START;
        for (element_index, element) in self.elements.iter().enumerate() {
            let len = element.len();
            if index >= pos + len {
                pos += len;
                continue;
            }
            return match element {
                Element::Text(_) => Some(Position::Text {
                    element: element_index,
                    offset: index - pos,
                }),
                Element::Table(rows) => {
                    let mut p = pos + 1;
                    for (r, row) in rows.iter().enumerate() {
                        p += 1;
                        for (c, cell) in row.iter().enumerate() {
                            let start = p + 1;
                            let end = start + utf16_len(cell);
                            if (start..end).contains(&index) {
                                return Some(Position::Cell {
                                    element: element_index,
                                    row: r,
                                    column: c,
                                    offset: index - start,
                                });
                            }
                            p = end;
                        }
                    }
                    None
                }
            };
        }
        None
    }

    fn apply(&mut self, edit: &EditOp) -> Result<(), String> {
        match edit {
            EditOp::InsertText { location, text } => self.insert_text(location.index, text),
            EditOp::DeleteContentRange { range } => self.delete(*range),
            EditOp::InsertTable {
                rows,
                columns,
                location,
            } => self.insert_table(*rows, *columns, location.index),
            EditOp::UpdateParagraphStyle { range, .. }
            | EditOp::UpdateTextStyle { range, .. }
            | EditOp::CreateParagraphBullets { range, .. } => self.check_range(*range),
            EditOp::UpdateTableCellStyle { table_range, .. } => {
                let location = table_range.table_cell_location;
                let snapshot = self.snapshot();
                let table = snapshot
                    .tables
                    .iter()
                    .find(|t| t.start_offset == location.table_start_location.index)
                    .ok_or_else(|| {
                        format!("no table starts at {}", location.table_start_location.index)
                    })?;
                let rows_ok = table_range.row_span > 0
                    && location.row_index + table_range.row_span <= table.row_count();
                let columns_ok = table_range.column_span > 0
                    && location.column_index + table_range.column_span <= table.column_count();
                if rows_ok && columns_ok {
                    Ok(())
                } else {
                    Err("cell range outside the table".to_string())
                }
            }
        }
    }

    fn check_range(&self, range: Range) -> Result<(), String> {
        if range.is_empty() {
            return Err(format!("empty range {range:?}"));
        }
        if range.start_index < BODY_START || range.end_index > self.end_offset() {
            return Err(format!(
                "range {range:?} outside document ending at {}",
                self.end_offset()
            ));
        }
        Ok(())
    }

    fn insert_text(&mut self, index: usize, text: &str) -> Result<(), String> {
        if text.is_empty() {
            return Err("empty insertion".to_string());
        }
        let target = match self.locate(index) {
            Some(Position::Text { element, offset }) => match &mut self.elements[element] {
                Element::Text(content) => Some((content, offset)),
                Element::Table(_) => None,
            },
            Some(Position::Cell {
                element,
                row,
                column,
                offset,
            }) => match &mut self.elements[element] {
                Element::Table(rows) => Some((&mut rows[row][column], offset)),
                Element::Text(_) => None,
            },
            None => None,
        };
        let (content, offset) =
            target.ok_or_else(|| format!("offset {index} is not inside text"))?;
        let at = byte_index(content, offset)
            .ok_or_else(|| format!("offset {index} splits a character"))?;
        content.insert_str(at, text);
        Ok(())
    }

    fn insert_table(&mut self, rows: usize, columns: usize, index: usize) -> Result<(), String> {
        if rows == 0 || columns == 0 {
            return Err(format!("cannot insert a {rows}x{columns} table"));
        }
        let Some(Position::Text { element, offset }) = self.locate(index) else {
            return Err(format!("offset {index} is not inside a paragraph"));
        };
        let Element::Text(content) = &self.elements[element] else {
            return Err(format!("offset {index} is not inside a paragraph"));
        };
        let at = byte_index(content, offset)
            .ok_or_else(|| format!("offset {index} splits a character"))?;
        let before = format!("{}\n", &content[..at]);
        let after = content[at..].to_string();
        let table = Element::Table(vec![vec!["\n".to_string(); columns]; rows]);
        self.elements.splice(
            element..=element,
            [Element::Text(before), table, Element::Text(after)],
        );
        Ok(())
    }

    fn delete(&mut self, range: Range) -> Result<(), String> {
        self.check_range(range)?;
        if range.end_index >= self.end_offset() {
            return Err("cannot delete the trailing newline".to_string());
        }

        let (a, b) = (range.start_index, range.end_index);
        let mut kept = Vec::with_capacity(self.elements.len());
        let mut pos = BODY_START;
        for element in std::mem::take(&mut self.elements) {
            let (s, e) = (pos, pos + element.len());
            pos = e;
            if e <= a || s >= b {
                kept.push(element);
                continue;
            }
            match element {
                Element::Text(text) => {
                    let rest = remove_units(&text, a.max(s) - s, b.min(e) - s)
                        .ok_or_else(|| "range splits a character".to_string())?;
                    if !rest.is_empty() {
                        kept.push(Element::Text(rest));
                    }
                }
                Element::Table(mut rows) => {
                    if a <= s && e <= b {
                        continue;
                    }
                    delete_in_cell(&mut rows, s, a, b)?;
                    kept.push(Element::Table(rows));
                }
            }
        }

        // Merge text runs that the deletion made adjacent.
        let mut merged: Vec<Element> = Vec::with_capacity(kept.len());
        for element in kept {
            match (merged.last_mut(), element) {
                (Some(Element::Text(prev)), Element::Text(next)) => prev.push_str(&next),
                (_, element) => merged.push(element),
            }
        }
        let orphaned_table = merged.windows(2).any(|pair| match pair {
            [Element::Text(text), Element::Table(_)] => !text.ends_with('\n'),
            _ => false,
        });
        if orphaned_table || matches!(merged.first(), Some(Element::Table(_))) {
            return Err("cannot delete the newline before a table".to_string());
        }
        self.elements = merged;
        Ok(())
    }
}

impl RemoteDocument for MemoryDocument {
    fn fetch_document(&self) -> Result<DocumentSnapshot, RemoteError> {
        Ok(self.snapshot())
    }

    fn apply_edits(&mut self, edits: &[EditOp]) -> Result<(), RemoteError> {
        let backup = self.elements.clone();
        for (index, edit) in edits.iter().enumerate() {
            if let Err(reason) = self.apply(edit) {
                self.elements = backup;
                return Err(RemoteError::Rejected { index, reason });
            }
        }
        self.calls.push(edits.to_vec());
        Ok(())
    }

    fn max_edits_per_call(&self) -> usize {
        self.max_edits_per_call
    }
}

fn cell_text(cell: &str) -> String {
    cell.strip_suffix('\n').unwrap_or(cell).replace('\n', " ")
}

/// Delete `[a, b)` when it falls inside one cell of the table starting at `s`,
/// leaving the cell's own newline in place.
fn delete_in_cell(rows: &mut [Vec<String>], s: usize, a: usize, b: usize) -> Result<(), String> {
    let mut p = s + 1;
    for row in rows.iter_mut() {
        p += 1;
        for cell in row.iter_mut() {
            let start = p + 1;
            let end = start + utf16_len(cell);
            if start <= a && b < end {
                *cell = remove_units(cell, a - start, b - start)
                    .ok_or_else(|| "range splits a character".to_string())?;
                return Ok(());
            }
            p = end;
        }
    }
    Err("range cuts through a table".to_string())
}

/// Byte index of the `units`-th UTF-16 unit, if it falls on a char boundary.
fn byte_index(text: &str, units: usize) -> Option<usize> {
    let mut count = 0;
    for (i, ch) in text.char_indices() {
        if count == units {
            return Some(i);
        }
        count += ch.len_utf16();
        if count > units {
            return None;
        }
    }
    (count == units).then_some(text.len())
}

fn remove_units(text: &str, lo: usize, hi: usize) -> Option<String> {
    let (lo, hi) = (byte_index(text, lo)?, byte_index(text, hi)?);
    Some(format!("{}{}", &text[..lo], &text[hi..]))
}
