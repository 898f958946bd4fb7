use crate::block::{Segment, Table};
use crate::config::Config;
use crate::edit::{EditOp, Range};
use crate::error::SyncError;
use crate::flow::compile_flow;
use crate::offsets::{flow_edits, table_fill, table_style_edits};
use crate::remote::{BODY_START, DocumentSnapshot, RemoteDocument};

/// What happened to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    Text { edits: usize },
    Table { rows: usize, columns: usize },
    /// The table was inserted but could not be found again; left unfilled.
    TableNotFound,
    /// Nothing to insert.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub segments: Vec<SegmentOutcome>,
    /// Whether existing content had to be deleted first.
    pub cleared: bool,
    /// Reads and batch updates issued against the remote.
    pub api_calls: usize,
}

/// Replace the content of `remote` with `segments`.
///
/// Segments are written strictly in order, each one reading the document's
/// current length first, because every segment's offsets depend on what the
/// previous segments left behind. Any remote failure aborts the run; a table
/// that cannot be found after insertion only abandons that segment.
pub fn sync_document<R: RemoteDocument>(
    remote: &mut R,
    segments: &[Segment],
    config: &Config,
) -> Result<SyncReport, SyncError> {
    let mut driver = Driver {
        remote,
        config,
        api_calls: 0,
    };

    let cleared = driver.clear()?;
    let total = segments.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, segment) in segments.iter().enumerate() {
        let outcome = match segment {
            Segment::Text(blocks) => {
                let payload = compile_flow(blocks, &config.rule.text);
                if payload.is_empty() {
                    SegmentOutcome::Skipped
                } else {
                    let insert_at = driver.fetch()?.insertion_point();
                    let edits = flow_edits(&payload, insert_at, config);
                    // Style offsets assume the insert is the only edit moving text.
                    debug_assert!(edits.iter().skip(1).all(|edit| !edit.is_structural()));
                    driver.apply(&edits)?;
                    SegmentOutcome::Text { edits: edits.len() }
                }
            }
            Segment::Table(table) => driver.table(table)?,
        };

        match &outcome {
            SegmentOutcome::Text { edits } => {
                log::info!("[{}/{total}] text: {edits} edits", index + 1)
            }
            SegmentOutcome::Table { rows, columns } => {
                log::info!("[{}/{total}] table: {rows}x{columns}", index + 1)
            }
            SegmentOutcome::TableNotFound => {
                log::warn!("[{}/{total}] table not found after insertion", index + 1)
            }
            SegmentOutcome::Skipped => log::info!("[{}/{total}] skipped: empty", index + 1),
        }
        outcomes.push(outcome);
    }

    Ok(SyncReport {
        segments: outcomes,
        cleared,
        api_calls: driver.api_calls,
    })
}

struct Driver<'a, R> {
    remote: &'a mut R,
    config: &'a Config,
    api_calls: usize,
}

impl<R: RemoteDocument> Driver<'_, R> {
    fn fetch(&mut self) -> Result<DocumentSnapshot, SyncError> {
        self.api_calls += 1;
        Ok(self.remote.fetch_document()?)
    }

    /// Send `edits` in order, split into calls no larger than the remote allows.
    fn apply(&mut self, edits: &[EditOp]) -> Result<(), SyncError> {
        let chunk_size = self.remote.max_edits_per_call().max(1);
        for chunk in edits.chunks(chunk_size) {
            self.api_calls += 1;
            log::debug!("applying {} edits", chunk.len());
            self.remote.apply_edits(chunk)?;
        }
        Ok(())
    }

    /// Delete everything except the trailing newline.
    fn clear(&mut self) -> Result<bool, SyncError> {
        let snapshot = self.fetch()?;
        let end = snapshot.insertion_point();
        if end <= BODY_START {
            return Ok(false);
        }
        self.apply(&[EditOp::delete_range(Range::new(BODY_START, end))])?;
        log::info!("cleared {} existing units", end - BODY_START);
        Ok(true)
    }

    fn table(&mut self, table: &Table) -> Result<SegmentOutcome, SyncError> {
        if table.column_count() == 0 {
            return Ok(SegmentOutcome::Skipped);
        }
        let insert_at = self.fetch()?.insertion_point();
        self.apply(&[EditOp::insert_table(
            table.row_count(),
            table.column_count(),
            insert_at,
        )])?;

        // Cell offsets are assigned by the remote, so read them back.
        let Some(empty) = self.fetch()?.table_from(insert_at).cloned() else {
            return Ok(SegmentOutcome::TableNotFound);
        };
        let fill = table_fill(&empty, table);
        if !fill.edits.is_empty() {
            self.apply(&fill.edits)?;
        }

        let Some(filled) = self.fetch()?.table_from(insert_at).cloned() else {
            return Ok(SegmentOutcome::TableNotFound);
        };
        let styles = table_style_edits(&filled, table, &fill.cell_lengths, self.config);
        self.apply(&styles)?;

        Ok(SegmentOutcome::Table {
            rows: table.row_count(),
            columns: table.column_count(),
        })
    }
}
