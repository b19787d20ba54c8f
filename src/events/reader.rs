use std::path::{Path, PathBuf};

use crate::events::event::Event;
use crate::events::shard::{EventShard, list_shards};
use crate::foundation::error::{EvError, EvResult};

/// Position of an [`EventShardReader`] inside its shard list.
///
/// `shard` is the only decoded shard held in memory; it is loaded on first access and dropped
/// when the cursor moves past it.
#[derive(Debug, Default)]
struct ShardCursor {
    file_idx: usize,
    offset: usize,
    shard: Option<EventShard>,
    exhausted: bool,
}

/// Forward-only cursor over a time-ordered list of shard files.
///
/// The concatenation of the shards in list order must be non-decreasing in `t`.
#[derive(Debug)]
pub struct EventShardReader {
    files: Vec<PathBuf>,
    cursor: ShardCursor,
}

impl EventShardReader {
    /// Open a reader over `files` (already in chronological order).
    pub fn open(files: Vec<PathBuf>) -> EvResult<Self> {
        if files.is_empty() {
            return Err(EvError::not_found("event shard list is empty"));
        }
        Ok(Self {
            files,
            cursor: ShardCursor::default(),
        })
    }

    /// Open a reader over every shard of `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> EvResult<Self> {
        Self::open(list_shards(dir)?)
    }

    /// Shard files this reader streams, in order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// `(first t of the first shard, last t of the last shard)`.
    ///
    /// Only the `t` arrays are read; the cursor is not moved.
    pub fn event_time_range(&self) -> EvResult<(i64, i64)> {
        let (Some(first), Some(last)) = (self.files.first(), self.files.last()) else {
            return Err(EvError::not_found("event shard list is empty"));
        };
        let t_first = EventShard::load_times(first)?;
        let t_last = if first == last {
            t_first.clone()
        } else {
            EventShard::load_times(last)?
        };
        match (t_first.first(), t_last.last()) {
            (Some(&t0), Some(&t1)) => Ok((t0, t1)),
            _ => Err(EvError::empty_data(format!(
                "empty t arrays in event files ('{}', '{}')",
                first.display(),
                last.display()
            ))),
        }
    }

    /// Move the cursor to the first event with `t >= t0_ns`, crossing shard boundaries.
    ///
    /// Seeking never moves backwards; events before the current position stay consumed.
    pub fn seek(&mut self, t0_ns: i64) -> EvResult<()> {
        while !self.cursor.exhausted {
            let offset = self.cursor.offset;
            let shard = self.loaded()?;
            let idx = shard.lower_bound(offset, t0_ns);
            if idx < shard.len() {
                self.cursor.offset = idx;
                return Ok(());
            }
            self.advance();
        }
        Ok(())
    }

    /// Consume and return every event with `t < t_end_ns` from the cursor onwards.
    ///
    /// Returns an empty batch once the stream is exhausted; check [`Self::is_exhausted`] to
    /// tell "nothing in this window" apart from "nothing left at all".
    pub fn pop_until(&mut self, t_end_ns: i64) -> EvResult<Vec<Event>> {
        let mut out = Vec::new();
        while !self.cursor.exhausted {
            let offset = self.cursor.offset;
            let shard = self.loaded()?;
            if offset >= shard.len() {
                self.advance();
                continue;
            }
            let end = shard.lower_bound(offset, t_end_ns);
            if end <= offset {
                break;
            }
            out.extend_from_slice(&shard.events()[offset..end]);
            self.cursor.offset = end;
        }
        Ok(out)
    }

    /// `true` once every shard has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.exhausted
    }

    /// `(shard index, offset within shard)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor.file_idx, self.cursor.offset)
    }

    fn loaded(&mut self) -> EvResult<&EventShard> {
        let shard = match self.cursor.shard.take() {
            Some(shard) => shard,
            None => EventShard::load(&self.files[self.cursor.file_idx])?,
        };
        Ok(self.cursor.shard.insert(shard))
    }

    fn advance(&mut self) {
        self.cursor.shard = None;
        self.cursor.offset = 0;
        self.cursor.file_idx += 1;
        if self.cursor.file_idx >= self.files.len() {
            self.cursor.exhausted = true;
            tracing::debug!(shards = self.files.len(), "event stream exhausted");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/reader.rs"]
mod tests;
