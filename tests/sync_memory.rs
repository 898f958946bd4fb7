//! End-to-end runs against the in-memory document.

use mdgdoc::edit::{BatchUpdate, EditOp, Range};
use mdgdoc::{
    Alignment, Config, DocumentSnapshot, MemoryDocument, RemoteDocument, RemoteError, Segment,
    SegmentOutcome, SyncError, Table, publish, sync_document,
};
use pretty_assertions::assert_eq;

fn edits(doc: &MemoryDocument) -> Vec<EditOp> {
    doc.calls().iter().flatten().cloned().collect()
}

/// Text under every text-style edit matching `pick`.
fn styled_text(doc: &MemoryDocument, pick: impl Fn(&mdgdoc::edit::TextStyle) -> bool) -> Vec<String> {
    edits(doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::UpdateTextStyle {
                range, text_style, ..
            } if pick(text_style) => Some(doc.text_in(*range)),
            _ => None,
        })
        .collect()
}

#[test]
fn styles_land_on_their_text() {
    let markdown = "# Café 😀\n\nSome **bold** and `code`.\n\n- item\n  - nested\n";
    let mut doc = MemoryDocument::new(500);
    let report = publish(markdown, &mut doc, &Config::default()).unwrap();

    assert!(!report.cleared);
    assert_eq!(
        doc.render(),
        "Café 😀\nSome bold and code.\nitem\nnested\n\n"
    );
    assert_eq!(styled_text(&doc, |s| s.bold == Some(true)), vec!["bold"]);
    assert_eq!(
        styled_text(&doc, |s| s.weighted_font_family.is_some()),
        vec!["code"]
    );

    let headings: Vec<String> = edits(&doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::UpdateParagraphStyle {
                range,
                paragraph_style,
                ..
            } if paragraph_style.named_style_type.as_deref() == Some("HEADING_1") => {
                Some(doc.text_in(*range))
            }
            _ => None,
        })
        .collect();
    assert_eq!(headings, vec!["Café 😀\n"]);

    let bullets: Vec<String> = edits(&doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::CreateParagraphBullets { range, .. } => Some(doc.text_in(*range)),
            _ => None,
        })
        .collect();
    assert_eq!(bullets, vec!["item\n", "nested\n"]);
}

#[test]
fn code_block_shading_covers_label_and_body() {
    let markdown = "```rust\nfn main() {}\n```\n\n---\n";
    let mut doc = MemoryDocument::new(500);
    publish(markdown, &mut doc, &Config::default()).unwrap();

    let shaded: Vec<String> = edits(&doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::UpdateParagraphStyle {
                range,
                paragraph_style,
                ..
            } if paragraph_style.shading.is_some() => Some(doc.text_in(*range)),
            _ => None,
        })
        .collect();
    assert_eq!(shaded, vec!["[rust]\nfn main() {}\n"]);

    let rule = Config::default().rule.text;
    assert_eq!(
        doc.render(),
        format!("[rust]\nfn main() {{}}\n\n{rule}\n\n")
    );
}

#[test]
fn tables_are_filled_between_text() {
    let markdown = "Intro\n\n| A | B |\n|---|:-:|\n| 1 | **2** |\n| 3 |\n\nOutro\n";
    let mut doc = MemoryDocument::new(500);
    let report = publish(markdown, &mut doc, &Config::default()).unwrap();

    assert_eq!(
        report.segments,
        vec![
            SegmentOutcome::Text { edits: 1 },
            SegmentOutcome::Table {
                rows: 3,
                columns: 2
            },
            SegmentOutcome::Text { edits: 1 },
        ]
    );
    assert_eq!(
        doc.table_cells(0).unwrap(),
        vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["1".to_string(), "2".to_string()],
            vec!["3".to_string(), String::new()],
        ]
    );
    assert_eq!(
        doc.render(),
        "Intro\n\n| A | B |\n| 1 | 2 |\n| 3 |  |\nOutro\n\n"
    );

    // Fill inserts run from the last cell back to the first.
    let fill: Vec<usize> = doc.calls()[2]
        .iter()
        .map(|edit| match edit {
            EditOp::InsertText { location, .. } => location.index,
            other => panic!("unexpected edit in fill: {other:?}"),
        })
        .collect();
    assert_eq!(fill.len(), 5);
    assert!(fill.windows(2).all(|pair| pair[0] > pair[1]));

    assert_eq!(
        styled_text(&doc, |s| s.bold == Some(true)),
        vec!["A", "B", "2"]
    );

    let centered: Vec<String> = edits(&doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::UpdateParagraphStyle {
                range,
                paragraph_style,
                ..
            } if paragraph_style.alignment == Some(Alignment::Center) => {
                Some(doc.text_in(*range))
            }
            _ => None,
        })
        .collect();
    assert_eq!(centered, vec!["B", "2"]);

    // clear read, 2 per text segment, 6 for the table
    assert_eq!(report.api_calls, 11);
}

#[test]
fn styles_after_tables_land_on_their_text() {
    let markdown = "| h |\n|---|\n\nx **bold** `c`\n\n| k |\n|---|\n\n## q\n";
    let mut doc = MemoryDocument::new(500);
    publish(markdown, &mut doc, &Config::default()).unwrap();

    assert_eq!(
        styled_text(&doc, |s| s.bold == Some(true)),
        vec!["h", "bold", "k"]
    );
    assert_eq!(
        styled_text(&doc, |s| s.weighted_font_family.is_some()),
        vec!["c"]
    );

    let headings: Vec<String> = edits(&doc)
        .iter()
        .filter_map(|edit| match edit {
            EditOp::UpdateParagraphStyle {
                range,
                paragraph_style,
                ..
            } if paragraph_style.named_style_type.as_deref() == Some("HEADING_2") => {
                Some(doc.text_in(*range))
            }
            _ => None,
        })
        .collect();
    assert_eq!(headings, vec!["q\n"]);
}

#[test]
fn table_only_document() {
    let mut doc = MemoryDocument::new(500);
    let report = publish("| x |\n|---|\n", &mut doc, &Config::default()).unwrap();

    assert_eq!(
        report.segments,
        vec![SegmentOutcome::Table {
            rows: 1,
            columns: 1
        }]
    );
    assert_eq!(doc.table_cells(0).unwrap(), vec![vec!["x".to_string()]]);
}

#[test]
fn empty_markdown_leaves_an_empty_document() {
    let mut doc = MemoryDocument::with_text("old", 500);
    let report = publish("", &mut doc, &Config::default()).unwrap();

    assert!(report.cleared);
    assert!(report.segments.is_empty());
    assert_eq!(doc.render(), "\n");
}

#[test]
fn existing_content_is_cleared_first() {
    let mut doc = MemoryDocument::with_text("stale\ncontent", 500);
    let report = publish("Fresh\n", &mut doc, &Config::default()).unwrap();

    assert!(report.cleared);
    assert_eq!(
        doc.calls()[0],
        vec![EditOp::delete_range(Range::new(1, 14))]
    );
    assert_eq!(doc.render(), "Fresh\n\n");
}

#[test]
fn second_publish_replaces_the_first() {
    let config = Config::default();
    let mut doc = MemoryDocument::new(500);
    publish("# One\n\n| a |\n|---|\n| b |\n", &mut doc, &config).unwrap();
    publish("Two\n", &mut doc, &config).unwrap();

    assert_eq!(doc.render(), "Two\n\n");
    assert!(doc.table_cells(0).is_none());
}

#[test]
fn batches_respect_the_call_limit() {
    let mut doc = MemoryDocument::new(3);
    publish("**a** **b** **c** **d** **e**\n", &mut doc, &Config::default()).unwrap();

    let sizes: Vec<usize> = doc.calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3]);
    assert!(matches!(doc.calls()[0][0], EditOp::InsertText { .. }));
    assert_eq!(doc.render(), "a b c d e\n\n");
}

#[test]
fn zero_column_table_is_skipped_without_reads() {
    let table = Table {
        header_cells: Vec::new(),
        data_rows: vec![Vec::new()],
        column_alignment: Vec::new(),
    };
    let mut doc = MemoryDocument::new(500);
    let report = sync_document(&mut doc, &[Segment::Table(table)], &Config::default()).unwrap();

    assert_eq!(report.segments, vec![SegmentOutcome::Skipped]);
    assert_eq!(report.api_calls, 1);
    assert!(doc.calls().is_empty());
}

/// Reports no tables, as if the inserted table could not be located.
struct HidingTables(MemoryDocument);

impl RemoteDocument for HidingTables {
    fn fetch_document(&self) -> Result<DocumentSnapshot, RemoteError> {
        let mut snapshot = self.0.fetch_document()?;
        snapshot.tables.clear();
        Ok(snapshot)
    }

    fn apply_edits(&mut self, edits: &[EditOp]) -> Result<(), RemoteError> {
        self.0.apply_edits(edits)
    }

    fn max_edits_per_call(&self) -> usize {
        self.0.max_edits_per_call()
    }
}

#[test]
fn missing_table_abandons_only_that_segment() {
    let mut remote = HidingTables(MemoryDocument::new(500));
    let report = publish("| a |\n|---|\n\nafter\n", &mut remote, &Config::default()).unwrap();

    assert_eq!(
        report.segments,
        vec![
            SegmentOutcome::TableNotFound,
            SegmentOutcome::Text { edits: 1 }
        ]
    );
    assert_eq!(remote.0.table_cells(0).unwrap(), vec![vec![String::new()]]);
    assert!(remote.0.render().ends_with("after\n\n"));
}

struct Offline;

impl RemoteDocument for Offline {
    fn fetch_document(&self) -> Result<DocumentSnapshot, RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }

    fn apply_edits(&mut self, _edits: &[EditOp]) -> Result<(), RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }

    fn max_edits_per_call(&self) -> usize {
        10
    }
}

#[test]
fn remote_failure_aborts_the_run() {
    let err = publish("text\n", &mut Offline, &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Remote(RemoteError::Transport(_))
    ));
    assert_eq!(
        err.to_string(),
        "remote document error: transport failure: connection refused"
    );
}

#[test]
fn recorded_calls_serialize_as_batch_updates() {
    let mut doc = MemoryDocument::new(500);
    publish("Hi **there**\n", &mut doc, &Config::default()).unwrap();

    let batch = BatchUpdate {
        requests: doc.calls()[0].clone(),
    };
    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(
        json["requests"][0],
        serde_json::json!({"insertText": {"location": {"index": 1}, "text": "Hi there\n"}})
    );
    assert_eq!(
        json["requests"][1]["updateTextStyle"]["range"],
        serde_json::json!({"startIndex": 4, "endIndex": 9})
    );
    assert_eq!(json["requests"][1]["updateTextStyle"]["fields"], "bold");
}
