//! Edit operations against the remote document, shaped as Google Docs
//! `batchUpdate` requests.
//!
//! Every `EditOp` serializes to exactly one request object, e.g.
//! `{"insertText": {"location": {"index": 1}, "text": "..."}}`. Style
//! requests carry a `fields` mask naming the populated style fields; the
//! constructors derive it so it cannot drift from the style itself.

use serde::Serialize;

use crate::block::Alignment;
use crate::config::Rgb;

/// A half-open `[start_index, end_index)` range of absolute offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

impl Range {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Pt,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f32,
    pub unit: Unit,
}

impl Dimension {
    pub fn pt(magnitude: f32) -> Self {
        Self {
            magnitude,
            unit: Unit::Pt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub rgb_color: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionalColor {
    pub color: Color,
}

impl From<Rgb> for OptionalColor {
    fn from([red, green, blue]: Rgb) -> Self {
        Self {
            color: Color {
                rgb_color: RgbColor { red, green, blue },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedFontFamily {
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_font_family: Option<WeightedFontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

impl TextStyle {
    pub fn fields(&self) -> String {
        [
            (self.bold.is_some(), "bold"),
            (self.italic.is_some(), "italic"),
            (self.link.is_some(), "link"),
            (self.weighted_font_family.is_some(), "weightedFontFamily"),
            (self.font_size.is_some(), "fontSize"),
            (self.foreground_color.is_some(), "foregroundColor"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shading {
    pub background_color: OptionalColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_style_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_start: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_first_line: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_above: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_below: Option<Dimension>,
}

impl ParagraphStyle {
    pub fn fields(&self) -> String {
        [
            (self.named_style_type.is_some(), "namedStyleType"),
            (self.alignment.is_some(), "alignment"),
            (self.indent_start.is_some(), "indentStart"),
            (self.indent_first_line.is_some(), "indentFirstLine"),
            (self.shading.is_some(), "shading.backgroundColor"),
            (self.space_above.is_some(), "spaceAbove"),
            (self.space_below.is_some(), "spaceBelow"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub table_start_location: Location,
    pub row_index: usize,
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRange {
    pub table_cell_location: TableCellLocation,
    pub row_span: usize,
    pub column_span: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellStyle {
    pub background_color: OptionalColor,
}

/// One positional edit against the remote document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    InsertText {
        location: Location,
        text: String,
    },
    DeleteContentRange {
        range: Range,
    },
    UpdateParagraphStyle {
        range: Range,
        paragraph_style: ParagraphStyle,
        fields: String,
    },
    UpdateTextStyle {
        range: Range,
        text_style: TextStyle,
        fields: String,
    },
    CreateParagraphBullets {
        range: Range,
        bullet_preset: String,
    },
    InsertTable {
        rows: usize,
        columns: usize,
        location: Location,
    },
    UpdateTableCellStyle {
        table_range: TableRange,
        table_cell_style: TableCellStyle,
        fields: String,
    },
}

impl EditOp {
    pub fn insert_text(index: usize, text: impl Into<String>) -> Self {
        EditOp::InsertText {
            location: Location { index },
            text: text.into(),
        }
    }

    pub fn delete_range(range: Range) -> Self {
        EditOp::DeleteContentRange { range }
    }

    pub fn text_style(range: Range, text_style: TextStyle) -> Self {
        let fields = text_style.fields();
        EditOp::UpdateTextStyle {
            range,
            text_style,
            fields,
        }
    }

    pub fn paragraph_style(range: Range, paragraph_style: ParagraphStyle) -> Self {
        let fields = paragraph_style.fields();
        EditOp::UpdateParagraphStyle {
            range,
            paragraph_style,
            fields,
        }
    }

    pub fn bullets(range: Range, preset: impl Into<String>) -> Self {
        EditOp::CreateParagraphBullets {
            range,
            bullet_preset: preset.into(),
        }
    }

    pub fn insert_table(rows: usize, columns: usize, index: usize) -> Self {
        EditOp::InsertTable {
            rows,
            columns,
            location: Location { index },
        }
    }

    /// Background for the cells of one table row, starting at `column`.
    pub fn row_background(
        table_start: usize,
        row: usize,
        column: usize,
        column_span: usize,
        color: Rgb,
    ) -> Self {
        EditOp::UpdateTableCellStyle {
            table_range: TableRange {
                table_cell_location: TableCellLocation {
                    table_start_location: Location { index: table_start },
                    row_index: row,
                    column_index: column,
                },
                row_span: 1,
                column_span,
            },
            table_cell_style: TableCellStyle {
                background_color: color.into(),
            },
            fields: "backgroundColor".to_string(),
        }
    }

    /// Whether applying this edit shifts the offsets of later content.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EditOp::InsertText { .. } | EditOp::DeleteContentRange { .. } | EditOp::InsertTable { .. }
        )
    }

    /// The range a styling or delete edit covers.
    pub fn range(&self) -> Option<Range> {
        match self {
            EditOp::DeleteContentRange { range }
            | EditOp::UpdateParagraphStyle { range, .. }
            | EditOp::UpdateTextStyle { range, .. }
            | EditOp::CreateParagraphBullets { range, .. } => Some(*range),
            EditOp::InsertText { .. }
            | EditOp::InsertTable { .. }
            | EditOp::UpdateTableCellStyle { .. } => None,
        }
    }
}

/// Body of one `documents.batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<EditOp>,
}
