use crate::block::{Block, Segment};

/// Split blocks into alternating runs of flowing content and single tables.
///
/// Tables become a segment of their own; everything between them is grouped
/// into one text segment. Empty text segments are never produced.
pub fn split_into_segments(blocks: Vec<Block>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current_text = Vec::new();

    for block in blocks {
        match block {
            Block::Table(table) => {
                if !current_text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut current_text)));
                }
                segments.push(Segment::Table(table));
            }
            other => current_text.push(other),
        }
    }

    if !current_text.is_empty() {
        segments.push(Segment::Text(current_text));
    }

    segments
}

/// Undo [`split_into_segments`].
pub fn flatten_segments(segments: Vec<Segment>) -> Vec<Block> {
    segments
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Text(blocks) => blocks,
            Segment::Table(table) => vec![Block::Table(table)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_blocks;

    #[test]
    fn table_only_document_is_one_table_segment() {
        let segments = split_into_segments(parse_blocks("| A | B |\n|---|---|\n| x | y |\n"));
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], Segment::Table(_)));
    }

    #[test]
    fn text_and_tables_alternate() {
        let md = "# One\n\ntext\n\n| A |\n|---|\n\n| B |\n|---|\n\n---\n";
        let segments = split_into_segments(parse_blocks(md));

        let kinds: Vec<&str> = segments
            .iter()
            .map(|s| match s {
                Segment::Text(_) => "text",
                Segment::Table(_) => "table",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "table", "table", "text"]);

        let Segment::Text(first) = &segments[0] else {
            unreachable!()
        };
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn flattening_restores_blocks() {
        let blocks = parse_blocks("a\n\n| A |\n|---|\n| 1 |\n\n- b\n\n```\nc\n```\n");
        let segments = split_into_segments(blocks.clone());
        assert_eq!(flatten_segments(segments), blocks);
    }

    #[test]
    fn no_blocks_no_segments() {
        assert!(split_into_segments(Vec::new()).is_empty());
    }
}
