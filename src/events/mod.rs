//! Event records, `.npz` shards and the streaming shard cursor.

/// The event record and polarity normalization.
pub mod event;
/// Forward-only cursor over a directory of shards.
pub mod reader;
/// Single-shard decoding and encoding.
pub mod shard;
