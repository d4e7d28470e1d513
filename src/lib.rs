//! Normalizes multi-game PGN exports into per-player game batches and accumulates them into a
//! persistent history across runs.

pub mod chess;

pub use chess::{
    BatchSummary, ChessGame, Color, DedupPolicy, Error, GameBatch, GameResult, Result, Speed,
    assemble_batch, merge_batches, merge_into_history,
};
