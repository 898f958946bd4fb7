mod block;
mod config;
pub mod edit;
mod error;
mod flow;
mod inline;
mod offsets;
mod parser;
mod remote;
mod segment;
mod sync;

pub use block::{Alignment, Block, Segment, Table, TextSpan};
pub use config::{Config, Rgb};
pub use error::{ConfigError, RemoteError, SyncError};
pub use flow::{FlowPayload, StyleKind, StyleOp, compile_flow, utf16_len};
pub use inline::{parse_inline, plain_text};
pub use offsets::{TableFill, flow_edits, table_fill, table_style_edits};
pub use parser::parse_blocks;
pub use remote::{
    BODY_START, CellHandle, DocumentSnapshot, MemoryDocument, RemoteDocument, TableHandle,
};
pub use segment::{flatten_segments, split_into_segments};
pub use sync::{SegmentOutcome, SyncReport, sync_document};

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parse_blocks(markdown)
}

/// Parse markdown and group the blocks into text and table segments.
pub fn segments(markdown: &str) -> Vec<Segment> {
    split_into_segments(parse(markdown))
}

/// Replace the content of `remote` with `markdown`.
pub fn publish<R: RemoteDocument>(
    markdown: &str,
    remote: &mut R,
    config: &Config,
) -> Result<SyncReport, SyncError> {
    sync_document(remote, &segments(markdown), config)
}
