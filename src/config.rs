//! Analytics configuration.

use std::fmt;

/// Environment variable holding the day/night boundary hour.
pub const DAY_NIGHT_HOUR_ENV: &str = "BABYTRACK_DAY_NIGHT_HOUR";

/// Default day/night boundary hour.
pub const DEFAULT_DAY_NIGHT_HOUR: u32 = 8;

/// Configuration for sleep classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepConfig {
    /// Hour of day (0-11) where daytime starts; daytime lasts twelve hours.
    day_night_hour: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        SleepConfig {
            day_night_hour: DEFAULT_DAY_NIGHT_HOUR,
        }
    }
}

impl SleepConfig {
    /// Creates a configuration with the given boundary hour.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidDayNightHour` unless `0 <= hour < 12`.
    pub fn new(day_night_hour: i64) -> Result<Self, ConfigError> {
        if !(0..12).contains(&day_night_hour) {
            return Err(ConfigError::InvalidDayNightHour(day_night_hour));
        }
        Ok(SleepConfig {
            day_night_hour: day_night_hour as u32,
        })
    }

    /// Loads the boundary hour from `BABYTRACK_DAY_NIGHT_HOUR`, falling back
    /// to the default when the variable is unset.
    ///
    /// # Errors
    /// Returns `ConfigError` if the variable is set but not a valid hour.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(std::env::var(DAY_NIGHT_HOUR_ENV).ok().as_deref())
    }

    fn from_var(value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            Some(value) => Self::parse(value),
            None => Ok(Self::default()),
        }
    }

    /// Parses a boundary hour from text.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let hour = value
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue {
                key: DAY_NIGHT_HOUR_ENV.to_string(),
                value: value.to_string(),
            })?;
        Self::new(hour)
    }

    pub fn day_night_hour(&self) -> u32 {
        self.day_night_hour
    }
}

/// Invalid configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Boundary hour outside `[0, 12)`
    InvalidDayNightHour(i64),
    /// Setting that could not be parsed
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDayNightHour(hour) => write!(
                f,
                "Invalid configuration: day/night hour must be between 0 and 11, got {}",
                hour
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid configuration: {}={:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boundary_is_eight() {
        assert_eq!(SleepConfig::default().day_night_hour(), 8);
    }

    #[test]
    fn test_boundary_range() {
        assert!(SleepConfig::new(0).is_ok());
        assert!(SleepConfig::new(11).is_ok());
        assert_eq!(
            SleepConfig::new(12).unwrap_err(),
            ConfigError::InvalidDayNightHour(12)
        );
        assert_eq!(
            SleepConfig::new(-1).unwrap_err(),
            ConfigError::InvalidDayNightHour(-1)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(SleepConfig::parse(" 6 ").unwrap().day_night_hour(), 6);
        assert!(matches!(
            SleepConfig::parse("six"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            SleepConfig::parse("14"),
            Err(ConfigError::InvalidDayNightHour(14))
        ));
    }

    #[test]
    fn test_from_var_defaults_when_unset() {
        assert_eq!(SleepConfig::from_var(None).unwrap(), SleepConfig::default());
        assert_eq!(SleepConfig::from_var(Some("5")).unwrap().day_night_hour(), 5);
        assert!(matches!(
            SleepConfig::from_var(Some("")),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    // The only test that touches the process environment.
    #[test]
    fn test_from_env_reads_variable() {
        std::env::set_var(DAY_NIGHT_HOUR_ENV, "7");
        let configured = SleepConfig::from_env();
        std::env::set_var(DAY_NIGHT_HOUR_ENV, "12");
        let out_of_range = SleepConfig::from_env();
        std::env::remove_var(DAY_NIGHT_HOUR_ENV);
        let unset = SleepConfig::from_env();

        assert_eq!(configured.unwrap().day_night_hour(), 7);
        assert_eq!(out_of_range.unwrap_err(), ConfigError::InvalidDayNightHour(12));
        assert_eq!(unset.unwrap(), SleepConfig::default());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidDayNightHour(13);
        assert!(err.to_string().contains("between 0 and 11"));
    }
}
