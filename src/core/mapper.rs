use crate::domain::model::{DayEntry, Forecast, ForecastDay, ForecastDocument};
use crate::domain::ports::{ConfigProvider, Units};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::validate_url;
use chrono::{Locale, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

pub const DEFAULT_ICON_BASE: &str = "http://openweathermap.org/img/w";

/// Locale and time zone the mapper formats with. Nothing is read from the
/// process environment.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    pub time_zone: Tz,
    pub locale: Locale,
    pub grouping_separator: Option<char>,
    pub units: Units,
    pub icon_base: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            locale: Locale::en_US,
            grouping_separator: Some(','),
            units: Units::Imperial,
            icon_base: DEFAULT_ICON_BASE.to_string(),
        }
    }
}

impl FormatConfig {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let time_zone: Tz =
            config
                .time_zone()
                .parse()
                .map_err(|e| ForecastError::InvalidConfigValueError {
                    field: "format.time_zone".to_string(),
                    value: config.time_zone().to_string(),
                    reason: format!("unknown IANA time zone: {}", e),
                })?;

        let locale = Locale::try_from(config.locale()).map_err(|_| {
            ForecastError::InvalidConfigValueError {
                field: "format.locale".to_string(),
                value: config.locale().to_string(),
                reason: "unknown locale, expected a POSIX name such as en_US".to_string(),
            }
        })?;

        validate_url("format.icon_base", config.icon_base())?;

        Ok(Self {
            time_zone,
            locale,
            grouping_separator: config.grouping_separator(),
            units: config.units(),
            icon_base: config.icon_base().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForecastMapper {
    format: FormatConfig,
}

impl ForecastMapper {
    pub fn new(format: FormatConfig) -> Self {
        Self { format }
    }

    /// Maps every entry of `list` in order. The first bad entry fails the
    /// whole document.
    pub fn map(&self, document: &ForecastDocument) -> Result<Forecast> {
        let days = document
            .list
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let entry = DayEntry::deserialize(value).map_err(|e| ForecastError::Mapping {
                    index,
                    message: e.to_string(),
                })?;
                self.map_entry(index, entry)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Mapped {} forecast days", days.len());
        Ok(Forecast::new(days))
    }

    fn map_entry(&self, index: usize, entry: DayEntry) -> Result<ForecastDay> {
        let condition = entry
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| ForecastError::Mapping {
                index,
                message: "`weather` has no entries".to_string(),
            })?;

        let day_of_week = self.day_of_week(entry.dt).ok_or_else(|| ForecastError::Mapping {
            index,
            message: format!("timestamp {} is out of range", entry.dt),
        })?;

        Ok(ForecastDay::new(
            day_of_week,
            self.temperature(entry.temp.min),
            self.temperature(entry.temp.max),
            self.humidity(entry.humidity),
            condition.description,
            self.icon_reference(&condition.icon),
        ))
    }

    pub fn day_of_week(&self, epoch_seconds: i64) -> Option<String> {
        let local = Utc
            .timestamp_opt(epoch_seconds, 0)
            .single()?
            .with_timezone(&self.format.time_zone);
        Some(local.format_localized("%A", self.format.locale).to_string())
    }

    pub fn temperature(&self, degrees: f64) -> String {
        format!(
            "{}{}",
            self.format_whole(degrees),
            self.format.units.temperature_suffix()
        )
    }

    /// `humidity` is 0-100; formatted as a fraction with a percent instance.
    pub fn humidity(&self, humidity: f64) -> String {
        let fraction = humidity / 100.0;
        format!("{}%", self.format_whole(fraction * 100.0))
    }

    pub fn icon_reference(&self, icon_code: &str) -> String {
        format!(
            "{}/{}.png",
            self.format.icon_base.trim_end_matches('/'),
            icon_code
        )
    }

    fn format_whole(&self, value: f64) -> String {
        let rounded = value.round_ties_even();
        // Formatting the float keeps every digit; an integer cast would saturate.
        let digits = format!("{:.0}", rounded.abs());

        let grouped = match self.format.grouping_separator {
            Some(sep) => group_digits(&digits, sep),
            None => digits,
        };

        if rounded < 0.0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapper_in(zone: Tz) -> ForecastMapper {
        ForecastMapper::new(FormatConfig {
            time_zone: zone,
            ..FormatConfig::default()
        })
    }

    fn day(dt: i64, min: f64, max: f64, humidity: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "temp": {"day": (min + max) / 2.0, "min": min, "max": max},
            "pressure": 1012.3,
            "humidity": humidity,
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
        })
    }

    fn document(list: Vec<serde_json::Value>) -> ForecastDocument {
        ForecastDocument { list }
    }

    #[test]
    fn test_epoch_is_thursday_in_utc() {
        assert_eq!(mapper_in(Tz::UTC).day_of_week(0).as_deref(), Some("Thursday"));
    }

    #[test]
    fn test_offset_crosses_local_midnight() {
        // 1970-01-01T00:00Z is still Wednesday evening in New York
        assert_eq!(
            mapper_in(chrono_tz::America::New_York).day_of_week(0).as_deref(),
            Some("Wednesday")
        );
        // 15:00Z is midnight in Tokyo
        assert_eq!(
            mapper_in(chrono_tz::Asia::Tokyo).day_of_week(15 * 3600).as_deref(),
            Some("Friday")
        );
        assert_eq!(
            mapper_in(chrono_tz::Asia::Tokyo).day_of_week(15 * 3600 - 1).as_deref(),
            Some("Thursday")
        );
    }

    #[test]
    fn test_daylight_saving_offset_applies_at_instant() {
        // 04:30Z on the day after the switch: 00:30 EDT Monday, 23:30 EST Sunday
        let ts = Utc.with_ymd_and_hms(2021, 3, 15, 4, 30, 0).unwrap().timestamp();
        assert_eq!(
            mapper_in(chrono_tz::America::New_York).day_of_week(ts).as_deref(),
            Some("Monday")
        );

        // Same wall-clock offset in January is EST
        let ts = Utc.with_ymd_and_hms(2021, 1, 18, 4, 30, 0).unwrap().timestamp();
        assert_eq!(
            mapper_in(chrono_tz::America::New_York).day_of_week(ts).as_deref(),
            Some("Sunday")
        );
    }

    #[test]
    fn test_localized_weekday_name() {
        let mapper = ForecastMapper::new(FormatConfig {
            locale: Locale::de_DE,
            ..FormatConfig::default()
        });
        assert_eq!(mapper.day_of_week(0).as_deref(), Some("Donnerstag"));
    }

    #[test]
    fn test_temperature_rounds_to_whole_degrees() {
        let mapper = ForecastMapper::default();
        assert_eq!(mapper.temperature(59.9), "60\u{00B0}F");
        assert_eq!(mapper.temperature(61.4), "61\u{00B0}F");
        assert_eq!(mapper.temperature(-3.6), "-4\u{00B0}F");
        assert_eq!(mapper.temperature(-0.4), "0\u{00B0}F");
    }

    #[test]
    fn test_temperature_rounds_half_to_even() {
        let mapper = ForecastMapper::default();
        assert_eq!(mapper.temperature(72.5), "72\u{00B0}F");
        assert_eq!(mapper.temperature(73.5), "74\u{00B0}F");
    }

    #[test]
    fn test_temperature_beyond_integer_range_keeps_digits() {
        let mapper = ForecastMapper::default();
        assert_eq!(
            mapper.temperature(1e20),
            "100,000,000,000,000,000,000\u{00B0}F"
        );
        assert_eq!(
            mapper.temperature(-1e20),
            "-100,000,000,000,000,000,000\u{00B0}F"
        );
    }

    #[test]
    fn test_temperature_grouping_and_units() {
        let kelvin = ForecastMapper::new(FormatConfig {
            units: Units::Standard,
            grouping_separator: Some('.'),
            ..FormatConfig::default()
        });
        assert_eq!(kelvin.temperature(1234.2), "1.234K");

        let celsius = ForecastMapper::new(FormatConfig {
            units: Units::Metric,
            grouping_separator: None,
            ..FormatConfig::default()
        });
        assert_eq!(celsius.temperature(1234.2), "1234\u{00B0}C");
    }

    #[test]
    fn test_humidity_percent() {
        let mapper = ForecastMapper::default();
        assert_eq!(mapper.humidity(87.0), "87%");
        assert_eq!(mapper.humidity(0.0), "0%");
        assert_eq!(mapper.humidity(100.0), "100%");
    }

    #[test]
    fn test_icon_reference() {
        let mapper = ForecastMapper::default();
        assert_eq!(
            mapper.icon_reference("10d"),
            "http://openweathermap.org/img/w/10d.png"
        );
    }

    #[test]
    fn test_map_preserves_count_and_order() {
        let doc = document(vec![
            day(0, 59.9, 61.4, 87.0),
            day(86_400, 50.0, 70.0, 40.0),
            day(2 * 86_400, 45.2, 66.8, 55.0),
        ]);
        let forecast = mapper_in(Tz::UTC).map(&doc).unwrap();

        assert_eq!(forecast.len(), 3);
        let names: Vec<&str> = forecast.days().iter().map(|d| d.day_of_week()).collect();
        assert_eq!(names, vec!["Thursday", "Friday", "Saturday"]);

        let first = &forecast.days()[0];
        assert_eq!(first.min_temperature(), "60\u{00B0}F");
        assert_eq!(first.max_temperature(), "61\u{00B0}F");
        assert_eq!(first.humidity_percent(), "87%");
        assert_eq!(first.condition_description(), "light rain");
        assert_eq!(
            first.icon_reference(),
            "http://openweathermap.org/img/w/10d.png"
        );
    }

    #[test]
    fn test_map_is_idempotent() {
        let doc = document(vec![day(0, 59.9, 61.4, 87.0), day(86_400, 50.0, 70.0, 40.0)]);
        let mapper = ForecastMapper::default();
        assert_eq!(mapper.map(&doc).unwrap(), mapper.map(&doc).unwrap());
    }

    #[test]
    fn test_map_empty_list() {
        let forecast = ForecastMapper::default().map(&document(vec![])).unwrap();
        assert!(forecast.is_empty());
    }

    #[test]
    fn test_one_bad_entry_fails_whole_document() {
        let mut bad = day(86_400, 50.0, 70.0, 40.0);
        bad["temp"].as_object_mut().unwrap().remove("max");
        let doc = document(vec![day(0, 59.9, 61.4, 87.0), bad, day(2 * 86_400, 1.0, 2.0, 3.0)]);

        let err = ForecastMapper::default().map(&doc).unwrap_err();
        match err {
            ForecastError::Mapping { index, message } => {
                assert_eq!(index, 1);
                assert!(message.contains("max"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_mapping_failure() {
        let mut bad = day(0, 59.9, 61.4, 87.0);
        bad["humidity"] = json!("high");
        let err = ForecastMapper::default().map(&document(vec![bad])).unwrap_err();
        assert!(matches!(err, ForecastError::Mapping { index: 0, .. }));
    }

    #[test]
    fn test_empty_weather_is_mapping_failure() {
        let mut bad = day(0, 59.9, 61.4, 87.0);
        bad["weather"] = json!([]);
        let err = ForecastMapper::default().map(&document(vec![bad])).unwrap_err();
        assert!(matches!(err, ForecastError::Mapping { index: 0, .. }));
    }
}
