use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array1, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};

use crate::events::event::Event;
use crate::foundation::error::{EvError, EvResult};

/// File extension of event shards.
pub const SHARD_EXTENSION: &str = "npz";

/// One decoded shard: events in non-decreasing `t` order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventShard {
    events: Vec<Event>,
}

impl EventShard {
    /// Wrap already-decoded events, checking the time ordering.
    pub fn from_events(events: Vec<Event>) -> EvResult<Self> {
        if let Some(i) = events.windows(2).position(|w| w[1].t < w[0].t) {
            return Err(EvError::validation(format!(
                "shard events must be sorted by t (t[{}]={} > t[{}]={})",
                i,
                events[i].t,
                i + 1,
                events[i + 1].t
            )));
        }
        Ok(Self { events })
    }

    /// Load all four arrays of an `.npz` shard.
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> EvResult<Self> {
        let mut npz = open_npz(path)?;
        let x = read_int_column(&mut npz, path, "x")?;
        let y = read_int_column(&mut npz, path, "y")?;
        let t = read_int_column(&mut npz, path, "t")?;
        let p = read_int_column(&mut npz, path, "p")?;

        if x.len() != t.len() || y.len() != t.len() || p.len() != t.len() {
            return Err(EvError::decode(format!(
                "shard '{}' has mismatched array lengths (x={}, y={}, t={}, p={})",
                path.display(),
                x.len(),
                y.len(),
                t.len(),
                p.len()
            )));
        }

        let mut events = Vec::with_capacity(t.len());
        for (((&x, &y), &t), &p) in x.iter().zip(&y).zip(&t).zip(&p) {
            let x = coord(path, "x", x)?;
            let y = coord(path, "y", y)?;
            events.push(Event::new(x, y, t, p));
        }
        tracing::debug!(events = events.len(), "loaded shard");
        Self::from_events(events).map_err(|e| {
            EvError::decode(format!("shard '{}' is not time-ordered: {e}", path.display()))
        })
    }

    /// Load only the timestamp array of a shard.
    pub fn load_times(path: &Path) -> EvResult<Vec<i64>> {
        let mut npz = open_npz(path)?;
        read_int_column(&mut npz, path, "t")
    }

    /// Write the shard as an `.npz` archive (`x`, `y` as int32, `t` as int64, `p` as int8 0/1).
    pub fn write_npz(&self, path: &Path) -> EvResult<()> {
        let file = File::create(path).map_err(|e| {
            EvError::encode(format!("failed to create shard '{}': {e}", path.display()))
        })?;
        let x: Array1<i32> = self.events.iter().map(|e| e.x).collect();
        let y: Array1<i32> = self.events.iter().map(|e| e.y).collect();
        let t: Array1<i64> = self.events.iter().map(|e| e.t).collect();
        let p: Array1<i8> = self.events.iter().map(|e| i8::from(e.positive)).collect();

        let wrap = |e: ndarray_npy::WriteNpzError| {
            EvError::encode(format!("failed to write shard '{}': {e}", path.display()))
        };
        let mut npz = NpzWriter::new(file);
        npz.add_array("x", &x).map_err(wrap)?;
        npz.add_array("y", &y).map_err(wrap)?;
        npz.add_array("t", &t).map_err(wrap)?;
        npz.add_array("p", &p).map_err(wrap)?;
        npz.finish().map_err(wrap)?;
        Ok(())
    }

    /// Borrow the events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` when the shard holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the first event at or after `from` with `t >= t_ns` (binary search).
    pub fn lower_bound(&self, from: usize, t_ns: i64) -> usize {
        let from = from.min(self.events.len());
        from + self.events[from..].partition_point(|e| e.t < t_ns)
    }
}

/// List the shard files of `dir`, sorted by file name.
pub fn list_shards(dir: &Path) -> EvResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        EvError::not_found(format!("cannot read event directory '{}': {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        use anyhow::Context as _;
        let path = entry
            .with_context(|| format!("list event directory '{}'", dir.display()))?
            .path();
        let is_shard = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SHARD_EXTENSION));
        if is_shard {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if files.is_empty() {
        return Err(EvError::not_found(format!(
            "no .{SHARD_EXTENSION} files found in '{}'",
            dir.display()
        )));
    }
    Ok(files)
}

fn open_npz(path: &Path) -> EvResult<NpzReader<File>> {
    let file = File::open(path).map_err(|e| {
        EvError::not_found(format!("cannot open shard '{}': {e}", path.display()))
    })?;
    NpzReader::new(file)
        .map_err(|e| EvError::decode(format!("'{}' is not an npz archive: {e}", path.display())))
}

fn coord(path: &Path, field: &str, v: i64) -> EvResult<i32> {
    i32::try_from(v).map_err(|_| {
        EvError::decode(format!(
            "shard '{}' has {field} coordinate {v} outside the int32 range",
            path.display()
        ))
    })
}

// Simulators disagree on integer widths (and `p` is sometimes stored as bool), so each
// supported dtype is tried in turn and widened to i64. Arrays of any rank are flattened.
macro_rules! read_widened {
    ($npz:expr, $entry:expr, $($ty:ty),+ $(,)?) => {{
        let mut out: Option<Vec<i64>> = None;
        $(
            if out.is_none() {
                if let Ok(arr) = $npz.by_name::<OwnedRepr<$ty>, IxDyn>($entry) {
                    out = Some(arr.iter().map(|&v| v as i64).collect());
                }
            }
        )+
        out
    }};
}

fn read_int_column(npz: &mut NpzReader<File>, path: &Path, field: &str) -> EvResult<Vec<i64>> {
    let names = npz
        .names()
        .map_err(|e| EvError::decode(format!("cannot list '{}': {e}", path.display())))?;
    let with_ext = format!("{field}.npy");
    let entry = names
        .iter()
        .find(|n| n.as_str() == field || n.as_str() == with_ext)
        .cloned()
        .ok_or_else(|| {
            EvError::decode(format!(
                "shard '{}' has no '{field}' array",
                path.display()
            ))
        })?;

    read_widened!(npz, &entry, i64, i32, i16, i8, u64, u32, u16, u8, bool).ok_or_else(|| {
        EvError::decode(format!(
            "shard '{}' field '{field}' is not an integer or bool array",
            path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/events/shard.rs"]
mod tests;
