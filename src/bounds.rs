use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{event::Event, ReadByLine, Result};

/// Smallest and largest pheromone level seen on any edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PheromoneBounds {
    pub min: f64,
    pub max: f64,
}

impl PheromoneBounds {
    /// Bounds containing a single value
    #[inline]
    pub fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Widens the bounds so they contain `value`
    #[inline]
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Returns bounds containing both `self` and `other`
    #[inline]
    pub fn merge(self, other: PheromoneBounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Folds `values` into bounds. Returns `None` if there were no values at all.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some(PheromoneBounds::new(value)),
            Some(mut bounds) => {
                bounds.observe(value);
                Some(bounds)
            }
        })
    }
}

/// Folds an optional accumulator with the trails of `event`. Events other than pheromone levels
/// leave the accumulator untouched.
pub fn fold_event(acc: Option<PheromoneBounds>, event: &Event) -> Option<PheromoneBounds> {
    let trails = match event {
        Event::PheromoneLevels { trails, .. } => trails,
        _ => return acc,
    };

    match (acc, PheromoneBounds::from_values(trails.values().copied())) {
        (Some(acc), Some(line)) => Some(acc.merge(line)),
        (acc, line) => acc.or(line),
    }
}

/// The JSON representation of optional bounds. Both fields are `null` if no pheromone levels have
/// been seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsBody {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<Option<PheromoneBounds>> for BoundsBody {
    fn from(bounds: Option<PheromoneBounds>) -> Self {
        Self {
            min: bounds.map(|b| b.min),
            max: bounds.map(|b| b.max),
        }
    }
}

impl From<BoundsBody> for Option<PheromoneBounds> {
    fn from(body: BoundsBody) -> Self {
        match (body.min, body.max) {
            (Some(min), Some(max)) => Some(PheromoneBounds { min, max }),
            _ => None,
        }
    }
}

/// Reads and parses every line of `reader` and computes the bounds over all pheromone levels.
///
/// Lines which can't be parsed are skipped, read errors abort the scan.
pub async fn scan<R: ReadByLine + ?Sized>(reader: &R) -> Result<Option<PheromoneBounds>> {
    scan_with_progress(reader, |_, _| {}).await
}

/// Same as `scan` but calls `progress` with the amount of lines scanned and the total line count.
pub async fn scan_with_progress<R, F>(reader: &R, mut progress: F) -> Result<Option<PheromoneBounds>>
where
    R: ReadByLine + ?Sized,
    F: FnMut(usize, usize) + Send,
{
    let total = reader.total_lines();
    let mut bounds = None;

    for line in 0..total {
        match reader.read_line(line).await {
            Ok(text) if text.trim().is_empty() => debug!(line, "skipping blank line"),
            Ok(text) => match Event::parse(&text) {
                Ok(event) => bounds = fold_event(bounds, &event),
                Err(err) => warn!(line, %err, "skipping unparsable line"),
            },
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => warn!(line, %err, "skipping unreadable line"),
        }

        progress(line + 1, total);
    }

    Ok(bounds)
}
