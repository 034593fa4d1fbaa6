use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{bounds::PheromoneBounds, error::Error, Result};

pub const ANTS_TAG: &str = "ANTS";
pub const BEST_TAG: &str = "BEST";
pub const PHEROMONES_TAG: &str = "PHEROMONES";

/// A single record of the simulation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Current position of every ant as index into the city list
    AntPositions { positions: Vec<usize> },

    /// A new shortest tour has been found. The tour is not closed, the first city has to be
    /// repeated by whoever draws it.
    #[serde(rename = "new_best_tour")]
    BestTour { length: f64, tour: Vec<usize> },

    /// Pheromone level on each edge, keyed by `"i-j"`. `min` and `max` are the extremes of this
    /// single record and `None` if it carries no trails.
    PheromoneLevels {
        scale: f64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        trails: BTreeMap<String, f64>,
    },
}

impl Event {
    /// Parse one line of the history log
    ///
    /// ```text
    /// ANTS,<pos0>,<pos1>,...
    /// BEST,<length>,<city0>,<city1>,...
    /// PHEROMONES,<scale>,<i-j>:<value>,<i-j>:<value>,...
    /// ```
    pub fn parse(line: &str) -> Result<Event> {
        let mut fields = line.split(',').enumerate();
        let tag = fields.next().map(|(_, tag)| tag.trim()).unwrap_or_default();

        match tag {
            ANTS_TAG => Ok(Event::AntPositions {
                positions: fields.map(parse_field).collect::<Result<_>>()?,
            }),

            BEST_TAG => {
                let length = parse_float(fields.next().unwrap_or((1, "")))?;
                let tour = fields.map(parse_field).collect::<Result<_>>()?;
                Ok(Event::BestTour { length, tour })
            }

            PHEROMONES_TAG => {
                let scale = parse_float(fields.next().unwrap_or((1, "")))?;

                // Duplicate edges: last one wins
                let mut trails = BTreeMap::new();
                for (index, raw) in fields {
                    let (edge, value) = parse_trail(index, raw)?;
                    trails.insert(edge.to_owned(), value);
                }

                let bounds = PheromoneBounds::from_values(trails.values().copied());
                Ok(Event::PheromoneLevels {
                    scale,
                    min: bounds.map(|b| b.min),
                    max: bounds.map(|b| b.max),
                    trails,
                })
            }

            _ => Err(Error::UnknownEventType(tag.to_owned())),
        }
    }

    /// The tag this event has in the history log
    pub fn tag(&self) -> &'static str {
        match self {
            Event::AntPositions { .. } => ANTS_TAG,
            Event::BestTour { .. } => BEST_TAG,
            Event::PheromoneLevels { .. } => PHEROMONES_TAG,
        }
    }

    #[inline]
    pub fn is_ant_positions(&self) -> bool {
        matches!(self, Event::AntPositions { .. })
    }
}

impl FromStr for Event {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Event::parse(s)
    }
}

fn parse_field<T: FromStr>((index, raw): (usize, &str)) -> Result<T> {
    raw.trim().parse().map_err(|_| Error::malformed(index, raw))
}

fn parse_float((index, raw): (usize, &str)) -> Result<f64> {
    let value: f64 = parse_field((index, raw))?;
    if !value.is_finite() {
        return Err(Error::malformed(index, raw));
    }
    Ok(value)
}

/// Parses `<edge>:<value>`
fn parse_trail(index: usize, raw: &str) -> Result<(&str, f64)> {
    let (edge, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::malformed(index, raw))?;

    let edge = edge.trim();
    if edge.is_empty() {
        return Err(Error::malformed(index, raw));
    }

    let value = parse_float((index, value)).map_err(|_| Error::malformed(index, raw))?;
    Ok((edge, value))
}
