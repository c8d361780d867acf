// Time range configuration table - one row per selectable chart range
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Selectable lookback window and display granularity for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Minute,
    Day,
    Week,
    Month,
    Year,
}

/// X-axis shape the rendering surface needs alongside the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSpec {
    pub granularity: f64,
    pub label_count: usize,
    pub axis_max: f64,
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Minute,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "minute" => Some(TimeRange::Minute),
            "day" => Some(TimeRange::Day),
            "week" => Some(TimeRange::Week),
            "month" => Some(TimeRange::Month),
            "year" => Some(TimeRange::Year),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeRange::Minute => "minute",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    /// Lookback window length in days for the day-based ranges.
    fn window_days(&self) -> i64 {
        match self {
            TimeRange::Minute => 0,
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }

    /// Start of the lookback window: midnight `window_days - 1` days before
    /// `now`, so the window always ends inside the current day.
    pub fn window_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let midnight = now.date().and_hms_opt(0, 0, 0).unwrap();
        midnight - Duration::days((self.window_days() - 1).max(0))
    }

    /// Map a sample timestamp to its x coordinate in this range's native
    /// unit. Minute plots whole seconds before `now`, wrapped into
    /// `[0, 60)`; the day-based ranges plot the offset from the window
    /// start in hours (Day) or days (Week/Month/Year).
    pub fn x_offset(&self, timestamp: NaiveDateTime, now: NaiveDateTime) -> f64 {
        match self {
            TimeRange::Minute => (now - timestamp).num_seconds().rem_euclid(60) as f64,
            TimeRange::Day => {
                (timestamp - self.window_start(now)).num_seconds() as f64 / 3600.0
            }
            TimeRange::Week | TimeRange::Month | TimeRange::Year => {
                (timestamp - self.window_start(now)).num_seconds() as f64 / 86400.0
            }
        }
    }

    /// X-axis labels relative to `now`; purely presentational and
    /// independent of the sample data.
    pub fn x_labels(&self, now: NaiveDateTime) -> Vec<String> {
        match self {
            // 13 ticks at five second steps, ":00" through ":60"
            TimeRange::Minute => (0..=12).map(|i| format!(":{:02}", i * 5)).collect(),
            // 9 ticks at three hour steps, "12 AM" through "12 AM"
            TimeRange::Day => (0..=8).map(|i| hour_label(i * 3)).collect(),
            TimeRange::Week => past_dates(now, 7),
            TimeRange::Month => past_dates(now, 30),
            TimeRange::Year => {
                (0..12)
                    .map(|i| MONTH_NAMES[((now.month0() + 1 + i) % 12) as usize].to_string())
                    .collect()
            }
        }
    }

    pub fn axis(&self) -> AxisSpec {
        match self {
            TimeRange::Minute => AxisSpec {
                granularity: 1.0,
                label_count: 13,
                axis_max: 60.0,
            },
            TimeRange::Day => AxisSpec {
                granularity: 1.0,
                label_count: 9,
                axis_max: 24.0,
            },
            TimeRange::Week => AxisSpec {
                granularity: 1.0,
                label_count: 7,
                axis_max: 7.0,
            },
            TimeRange::Month => AxisSpec {
                granularity: 5.0,
                label_count: 7,
                axis_max: 30.0,
            },
            TimeRange::Year => AxisSpec {
                granularity: 1.0,
                label_count: 12,
                axis_max: 365.0,
            },
        }
    }
}

fn hour_label(hour: u32) -> String {
    let (h, half) = match hour % 24 {
        0 => (12, "AM"),
        h @ 1..=11 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!("{} {}", h, half)
}

/// `M/D` labels covering the last `days` calendar days plus one trailing
/// tick for the upcoming day, matching the chart's right axis edge.
fn past_dates(now: NaiveDateTime, days: i64) -> Vec<String> {
    let start = now.date() - Duration::days(days - 1);
    (0..=days)
        .map(|i| {
            let date = start + Duration::days(i);
            format!("{}/{}", date.month(), date.day())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn jan1(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_minute_x_is_seconds_before_now() {
        let now = jan1(0, 0, 30);
        assert_eq!(TimeRange::Minute.x_offset(jan1(0, 0, 0), now), 30.0);
        assert_eq!(TimeRange::Minute.x_offset(jan1(0, 0, 10), now), 20.0);
        // Older samples wrap into the window
        assert_eq!(TimeRange::Minute.x_offset(jan1(0, 0, 30) - Duration::seconds(70), now), 10.0);
    }

    #[test]
    fn test_day_x_is_hours_since_midnight() {
        let now = jan1(15, 0, 0);
        assert_eq!(TimeRange::Day.x_offset(jan1(6, 0, 0), now), 6.0);
        assert_eq!(TimeRange::Day.x_offset(jan1(13, 30, 0), now), 13.5);
    }

    #[test]
    fn test_week_x_is_days_since_window_start() {
        let now = jan1(12, 0, 0);
        // Window opens at midnight six days earlier, Dec 26
        let dec26 = NaiveDate::from_ymd_opt(2023, 12, 26)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(TimeRange::Week.window_start(now), dec26);
        assert_eq!(TimeRange::Week.x_offset(dec26 + Duration::days(2), now), 2.0);
        assert_eq!(TimeRange::Week.x_offset(jan1(12, 0, 0), now), 6.5);
    }

    #[test]
    fn test_minute_labels() {
        let labels = TimeRange::Minute.x_labels(jan1(0, 0, 0));
        assert_eq!(labels.len(), 13);
        assert_eq!(labels.first().unwrap(), ":00");
        assert_eq!(labels[1], ":05");
        assert_eq!(labels.last().unwrap(), ":60");
    }

    #[test]
    fn test_day_labels_are_nine_three_hour_steps() {
        let labels = TimeRange::Day.x_labels(jan1(0, 0, 0));
        assert_eq!(
            labels,
            vec!["12 AM", "3 AM", "6 AM", "9 AM", "12 PM", "3 PM", "6 PM", "9 PM", "12 AM"]
        );
    }

    #[test]
    fn test_week_labels_span_window() {
        let labels = TimeRange::Week.x_labels(jan1(12, 0, 0));
        assert_eq!(labels.len(), 8);
        assert_eq!(labels.first().unwrap(), "12/26");
        assert_eq!(labels[6], "1/1");
        assert_eq!(labels.last().unwrap(), "1/2");
    }

    #[test]
    fn test_month_labels_count() {
        assert_eq!(TimeRange::Month.x_labels(jan1(0, 0, 0)).len(), 31);
    }

    #[test]
    fn test_year_labels_end_at_current_month() {
        let labels = TimeRange::Year.x_labels(jan1(0, 0, 0));
        assert_eq!(labels.len(), 12);
        assert_eq!(labels.first().unwrap(), "Feb");
        assert_eq!(labels.last().unwrap(), "Jan");
    }

    #[test]
    fn test_range_names_round_trip() {
        for range in TimeRange::ALL {
            assert_eq!(TimeRange::from_name(range.name()), Some(range));
        }
        assert_eq!(TimeRange::from_name("decade"), None);
    }
}
