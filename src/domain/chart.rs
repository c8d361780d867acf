// Chart projection - samples in, renderable frame out
use crate::domain::range::{AxisSpec, TimeRange};
use crate::domain::sample::Sample;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A renderable (x, y) coordinate derived from a sample under a time range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Projected points plus the running average of the raw sensor values.
/// `average` is `None` for an empty buffer; "no data" is an explicit state,
/// never a NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub points: Vec<PlotPoint>,
    pub average: Option<f64>,
}

/// One full frame for the rendering surface, regenerated on every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub range: TimeRange,
    pub series: ChartSeries,
    pub x_labels: Vec<String>,
    pub axis: AxisSpec,
}

/// How the projector treats samples whose x runs backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Drop everything accumulated so far and restart at the offending
    /// sample. Crude, but matches the deployed behavior: stale points
    /// spanning a day boundary get discarded rather than sorted.
    Reset,
    /// Stable sort by timestamp before projecting.
    SortByTimestamp,
}

/// Maps a sample list into a chart frame for one time range.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    calibration: f64,
    order_policy: OrderPolicy,
}

impl Projector {
    pub fn new(calibration: f64, order_policy: OrderPolicy) -> Self {
        Self {
            calibration,
            order_policy,
        }
    }

    pub fn project(&self, samples: &[Sample], range: TimeRange, now: NaiveDateTime) -> ChartFrame {
        let mut ordered: Vec<Sample> = samples.to_vec();
        if self.order_policy == OrderPolicy::SortByTimestamp {
            ordered.sort_by_key(|s| s.timestamp);
        }

        let mut points: Vec<PlotPoint> = Vec::with_capacity(ordered.len());
        for sample in &ordered {
            let point = PlotPoint {
                x: range.x_offset(sample.timestamp, now),
                y: sample.weight(self.calibration),
            };
            if self.order_policy == OrderPolicy::Reset {
                if let Some(last) = points.last() {
                    if point.x < last.x {
                        points.clear();
                    }
                }
            }
            points.push(point);
        }

        // Average of the raw values across the whole buffer, not the
        // calibrated weights and not just the active window.
        let average = if samples.is_empty() {
            None
        } else {
            Some(samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64)
        };

        ChartFrame {
            range,
            series: ChartSeries { points, average },
            x_labels: range.x_labels(now),
            axis: range.axis(),
        }
    }
}
