pub mod batch;
pub mod config;
pub mod error;
pub mod headers;
pub mod history;
pub mod log;
pub mod moves;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod source;
pub mod summary;
pub mod timecontrol;
pub mod types;

pub use batch::{assemble_batch, assemble_batch_with, normalize_game};
pub use error::{Error, ErrorAccumulator, Result};
pub use headers::GameHeaders;
pub use history::{
    DedupPolicy, FileHistoryStore, HistoryStore, MemoryHistoryStore, merge_batches,
    merge_into_history, prefer_more_complete,
};
pub use pipeline::ingest;
pub use segment::{Segmenter, TextSegmenter, segment_games};
pub use source::{CompressionMode, FileSource, GameSource, TextSource};
pub use summary::BatchSummary;
pub use types::{ChessGame, Color, GameBatch, GameResult, Speed};
