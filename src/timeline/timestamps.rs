use std::path::Path;

use crate::foundation::core::NANOS_PER_SEC;
use crate::foundation::error::{EvError, EvResult};

/// Frame capture times of the source footage, in nanoseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampSeries {
    times_ns: Vec<i64>,
}

impl TimestampSeries {
    /// Wrap nanosecond timestamps.
    pub fn from_ns(times_ns: Vec<i64>) -> Self {
        Self { times_ns }
    }

    /// Convert second timestamps to nanoseconds by rounding.
    pub fn from_secs(secs: &[f64]) -> Self {
        Self {
            times_ns: secs
                .iter()
                .map(|s| (s * NANOS_PER_SEC).round() as i64)
                .collect(),
        }
    }

    /// Parse text with one seconds value per line.
    ///
    /// Only the first whitespace-separated token of a line is read; blank lines and `#`
    /// comments are skipped. Returns `None` when no value is present.
    pub fn parse(text: &str) -> EvResult<Option<Self>> {
        let mut secs = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let s = line.trim();
            if s.is_empty() || s.starts_with('#') {
                continue;
            }
            let token = s.split_whitespace().next().unwrap_or(s);
            let v: f64 = token.parse().map_err(|_| {
                EvError::validation(format!(
                    "timestamp line {} is not a number: '{token}'",
                    lineno + 1
                ))
            })?;
            secs.push(v);
        }
        if secs.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::from_secs(&secs)))
    }

    /// Read and parse a timestamp file; a missing file is an error.
    pub fn read(path: &Path) -> EvResult<Option<Self>> {
        if !path.exists() {
            return Err(EvError::not_found(format!(
                "timestamps file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            EvError::decode(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Timestamps in nanoseconds.
    pub fn as_ns(&self) -> &[i64] {
        &self.times_ns
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.times_ns.len()
    }

    /// Return `true` when the series is empty.
    pub fn is_empty(&self) -> bool {
        self.times_ns.is_empty()
    }

    /// Median of the strictly positive consecutive differences, if any.
    ///
    /// Zero or negative steps (duplicated or reordered trailing stamps) are ignored. With an
    /// even count the lower of the two middle values is taken, so one long gap among regular
    /// steps never stretches the estimate.
    pub fn median_positive_step_ns(&self) -> Option<i64> {
        let mut diffs: Vec<i64> = self
            .times_ns
            .windows(2)
            .filter_map(|w| w[1].checked_sub(w[0]))
            .filter(|&d| d > 0)
            .collect();
        if diffs.is_empty() {
            return None;
        }
        diffs.sort_unstable();
        Some(diffs[(diffs.len() - 1) / 2])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timestamps.rs"]
mod tests;
