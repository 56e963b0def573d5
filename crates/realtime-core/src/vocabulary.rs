//! Localized month, weekday and meridiem labels.
//!
//! Labels are held in fixed-size tables indexed by the published values
//! (months 1-12, weekdays 1-7 with Monday first). Lookups clamp their
//! index into range, so a variable overwritten with a stray value still
//! yields a label.

use realtime_types::Meridiem;

use crate::config::{ConfigError, VocabularyConfig, expect_len};

/// Display strings used by the escape codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    months: [String; 12],
    week_days: [String; 7],
    am: String,
    pm: String,
}

impl Vocabulary {
    /// Build the tables from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless there are exactly 12 month
    /// names and 7 weekday names.
    pub fn from_config(config: &VocabularyConfig) -> Result<Self, ConfigError> {
        expect_len("vocabulary.months", config.months.len(), 12)?;
        expect_len("vocabulary.week_days", config.week_days.len(), 7)?;

        let months = <[String; 12]>::try_from(config.months.clone()).map_err(|names| {
            ConfigError::Invalid {
                reason: format!("expected 12 month names, found {}", names.len()),
            }
        })?;
        let week_days = <[String; 7]>::try_from(config.week_days.clone()).map_err(|names| {
            ConfigError::Invalid {
                reason: format!("expected 7 weekday names, found {}", names.len()),
            }
        })?;

        Ok(Self {
            months,
            week_days,
            am: config.am.clone(),
            pm: config.pm.clone(),
        })
    }

    /// Name of a month, 1 = January. Out-of-range values clamp to 1-12.
    pub fn month_name(&self, month: i64) -> &str {
        lookup(&self.months, month)
    }

    /// Name of a weekday, 1 = Monday. Out-of-range values clamp to 1-7.
    pub fn week_day_name(&self, weekday: i64) -> &str {
        lookup(&self.week_days, weekday)
    }

    /// The AM or PM label.
    pub fn meridiem(&self, meridiem: Meridiem) -> &str {
        match meridiem {
            Meridiem::Am => &self.am,
            Meridiem::Pm => &self.pm,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let config = VocabularyConfig::default();
        Self {
            months: std::array::from_fn(|i| config.months.get(i).cloned().unwrap_or_default()),
            week_days: std::array::from_fn(|i| {
                config.week_days.get(i).cloned().unwrap_or_default()
            }),
            am: config.am,
            pm: config.pm,
        }
    }
}

/// 1-based clamped lookup.
fn lookup<const N: usize>(names: &[String; N], index: i64) -> &str {
    let last = i64::try_from(N).unwrap_or(i64::MAX);
    let zero_based = index.clamp(1, last).saturating_sub(1);
    usize::try_from(zero_based)
        .ok()
        .and_then(|i| names.get(i))
        .map_or("", String::as_str)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_names() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.month_name(1), "January");
        assert_eq!(vocab.month_name(3), "March");
        assert_eq!(vocab.month_name(12), "December");
        assert_eq!(vocab.week_day_name(1), "Monday");
        assert_eq!(vocab.week_day_name(7), "Sunday");
        assert_eq!(vocab.meridiem(Meridiem::Am), "AM");
        assert_eq!(vocab.meridiem(Meridiem::Pm), "PM");
    }

    #[test]
    fn out_of_range_indexes_clamp() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.month_name(0), "January");
        assert_eq!(vocab.month_name(13), "December");
        assert_eq!(vocab.week_day_name(-4), "Monday");
        assert_eq!(vocab.week_day_name(9), "Sunday");
    }

    #[test]
    fn localized_names_from_config() {
        let config = VocabularyConfig {
            months: [
                "Janvier", "Fevrier", "Mars", "Avril", "Mai", "Juin", "Juillet", "Aout",
                "Septembre", "Octobre", "Novembre", "Decembre",
            ]
            .map(String::from)
            .to_vec(),
            week_days: ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"]
                .map(String::from)
                .to_vec(),
            am: "matin".to_owned(),
            pm: "soir".to_owned(),
        };
        let vocab = Vocabulary::from_config(&config).unwrap();
        assert_eq!(vocab.month_name(3), "Mars");
        assert_eq!(vocab.week_day_name(7), "Dimanche");
        assert_eq!(vocab.meridiem(Meridiem::Pm), "soir");
    }

    #[test]
    fn wrong_counts_are_rejected() {
        let mut config = VocabularyConfig::default();
        config.months.pop();
        assert!(Vocabulary::from_config(&config).is_err());

        let mut config = VocabularyConfig::default();
        config.week_days.push("Funday".to_owned());
        assert!(Vocabulary::from_config(&config).is_err());
    }
}
