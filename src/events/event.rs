/// A single pixel brightness-change record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    /// Column in sensor coordinates. May lie outside the sensor; renderers drop such events.
    pub x: i32,
    /// Row in sensor coordinates.
    pub y: i32,
    /// Timestamp in nanoseconds.
    pub t: i64,
    /// `true` for a brightness increase.
    pub positive: bool,
}

impl Event {
    /// Build an event from a raw polarity value.
    pub fn new(x: i32, y: i32, t: i64, raw_polarity: i64) -> Self {
        Self {
            x,
            y,
            t,
            positive: polarity_is_positive(raw_polarity),
        }
    }
}

/// The one polarity normalization rule: `raw > 0` is positive.
///
/// Shards written by different simulators encode polarity as `{0, 1}` or `{-1, +1}`; both map
/// `1` to positive and the other value to negative under this rule.
pub fn polarity_is_positive(raw: i64) -> bool {
    raw > 0
}
