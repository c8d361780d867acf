// Weight sample domain model
use chrono::NaiveDateTime;

/// Timestamp pattern used on the wire: `Mon Jan 01 00:00:00 2024`.
pub const EVENT_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Default linear calibration from raw sensor counts to grams.
/// Placeholder sensor math; overridable via `chart.toml`.
pub const DEFAULT_CALIBRATION: f64 = 0.0011427;

/// A data point received from the perch scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Decode one raw event of the form `"<value>\t<timestamp>"`.
    ///
    /// Returns `None` for anything malformed: wrong field count, a value
    /// that is not a float, or a timestamp that does not match
    /// [`EVENT_TIME_FORMAT`]. Bad events are dropped, not reported; partial
    /// data beats a stalled chart.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.split('\t');
        let (value, timestamp) = match (fields.next(), fields.next(), fields.next()) {
            (Some(value), Some(timestamp), None) => (value, timestamp),
            _ => return None,
        };
        let value = value.parse::<f64>().ok()?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp, EVENT_TIME_FORMAT).ok()?;
        Some(Self { timestamp, value })
    }

    /// Inverse of [`Sample::parse`] for the same wire format.
    pub fn to_raw(&self) -> String {
        format!("{}\t{}", self.value, self.timestamp.format(EVENT_TIME_FORMAT))
    }

    /// Convert the raw sensor value to grams.
    pub fn weight(&self, calibration: f64) -> f64 {
        (self.value * calibration).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_well_formed() {
        let sample = Sample::parse("10.0\tMon Jan 01 00:00:00 2024").unwrap();
        assert_eq!(sample.timestamp, at(0, 0, 0));
        assert_eq!(sample.value, 10.0);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(Sample::parse("10.0").is_none());
        assert!(Sample::parse("10.0\ta\tb").is_none());
        assert!(Sample::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_value() {
        assert!(Sample::parse("grams\tMon Jan 01 00:00:00 2024").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_timestamp() {
        assert!(Sample::parse("10.0\t2024-01-01T00:00:00Z").is_none());
        // Jan 01 2024 is a Monday, not a Tuesday
        assert!(Sample::parse("10.0\tTue Jan 01 00:00:00 2024").is_none());
    }

    #[test]
    fn test_raw_round_trip() {
        let sample = Sample::new(at(13, 45, 9), -8712.5);
        assert_eq!(Sample::parse(&sample.to_raw()), Some(sample));
    }

    #[test]
    fn test_weight_is_absolute() {
        let sample = Sample::new(at(0, 0, 0), -10000.0);
        assert!((sample.weight(DEFAULT_CALIBRATION) - 11.427).abs() < 1e-9);
    }
}
