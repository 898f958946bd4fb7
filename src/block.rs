use serde::Serialize;

/// A run of text with flat, span-local formatting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl TextSpan {
    /// Unstyled text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self {
            code: true,
            ..Self::plain(text)
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::plain(text)
        }
    }
}

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

/// A Markdown table. Cells hold raw inline markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header_cells: Vec<String>,
    pub data_rows: Vec<Vec<String>>,
    pub column_alignment: Vec<Alignment>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.header_cells.len()
    }

    /// Header row plus data rows.
    pub fn row_count(&self) -> usize {
        1 + self.data_rows.len()
    }

    /// Header row then data rows, each exactly `column_count()` cells wide.
    /// Ragged rows are padded with empty cells on the right and long rows are
    /// cut to the header width.
    pub fn padded_rows(&self) -> Vec<Vec<&str>> {
        let columns = self.column_count();
        std::iter::once(&self.header_cells)
            .chain(&self.data_rows)
            .map(|row| {
                (0..columns)
                    .map(|c| row.get(c).map(String::as_str).unwrap_or(""))
                    .collect()
            })
            .collect()
    }

    pub fn alignment(&self, column: usize) -> Alignment {
        self.column_alignment
            .get(column)
            .copied()
            .unwrap_or_default()
    }
}

/// Block-level elements parsed from Markdown. Blocks never contain other blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        spans: Vec<TextSpan>,
    },
    BulletItem {
        spans: Vec<TextSpan>,
        indent_level: usize,
    },
    CodeBlock {
        text: String,
        language: String,
    },
    Table(Table),
    HorizontalRule,
}

/// A run of blocks sharing one insertion strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Flowing content, never containing a table
    Text(Vec<Block>),
    Table(Table),
}
