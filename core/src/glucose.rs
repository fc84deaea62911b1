//! Glucose reading validation and severity classification.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Meter measurement floor; readings below this are rejected, not stored.
pub const MIN_MEASURABLE: f64 = 20.0;
/// Meter measurement ceiling.
pub const MAX_MEASURABLE: f64 = 600.0;

/// Absolute floor below which any low reading becomes critical, regardless
/// of the personalized target range.
pub const CRITICAL_LOW_FLOOR: f64 = 70.0;
/// Absolute ceiling above which any high reading becomes critical.
pub const CRITICAL_HIGH_CEILING: f64 = 250.0;

/// Personalized glucose band in mg/dL. `min`/`max` describe the expected
/// envelope for the condition; `target_min`/`target_max` drive alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TargetRange {
    pub min: f64,
    pub max: f64,
    pub target_min: f64,
    pub target_max: f64,
}

impl TargetRange {
    pub const TYPE_1_DIABETES: TargetRange = TargetRange {
        min: 80.0,
        max: 250.0,
        target_min: 80.0,
        target_max: 180.0,
    };
    pub const TYPE_2_DIABETES: TargetRange = TargetRange {
        min: 90.0,
        max: 220.0,
        target_min: 90.0,
        target_max: 180.0,
    };
    pub const PRE_DIABETES: TargetRange = TargetRange {
        min: 85.0,
        max: 180.0,
        target_min: 85.0,
        target_max: 140.0,
    };
    pub const NO_CONDITION: TargetRange = TargetRange {
        min: 70.0,
        max: 140.0,
        target_min: 70.0,
        target_max: 140.0,
    };
    pub const DEFAULT: TargetRange = TargetRange {
        min: 70.0,
        max: 180.0,
        target_min: 80.0,
        target_max: 140.0,
    };

    pub fn contains_target(&self, reading: f64) -> bool {
        reading >= self.target_min && reading <= self.target_max
    }

    pub fn describe(&self) -> String {
        format!("{}-{} mg/dL", self.target_min, self.target_max)
    }
}

/// Pick the range for a user's condition list. When conditions overlap the
/// most restrictive diagnosis wins: Type 1, then Type 2, then pre-diabetes.
/// An explicit "None" (or an empty list) gets the tight healthy band; any
/// unrecognized condition set falls back to the default band.
pub fn range_for_conditions(conditions: &[String]) -> TargetRange {
    let has = |name: &str| conditions.iter().any(|c| c == name);
    if has("Type 1 Diabetes") {
        TargetRange::TYPE_1_DIABETES
    } else if has("Type 2 Diabetes") {
        TargetRange::TYPE_2_DIABETES
    } else if has("Pre-diabetes") {
        TargetRange::PRE_DIABETES
    } else if conditions.is_empty() || has("None") {
        TargetRange::NO_CONDITION
    } else {
        TargetRange::DEFAULT
    }
}

/// Whether a reading is physically plausible for a meter.
pub fn is_measurable(reading: f64) -> bool {
    (MIN_MEASURABLE..=MAX_MEASURABLE).contains(&reading)
}

/// Alert severity for a stored reading. Only non-normal severities produce
/// persisted alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    CriticalLow,
    Low,
    Normal,
    High,
    CriticalHigh,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::CriticalLow => "critical_low",
            Severity::Low => "low",
            Severity::Normal => "normal",
            Severity::High => "high",
            Severity::CriticalHigh => "critical_high",
        }
    }

    pub fn is_alert(self) -> bool {
        self != Severity::Normal
    }
}

/// Classify a measurable reading against a personalized range. The critical
/// bands use the absolute 70/250 thresholds, not the range edges, so a
/// Type 1 reading of 75 is low but never critical.
pub fn classify(reading: f64, range: &TargetRange) -> Severity {
    if reading < range.target_min {
        if reading < CRITICAL_LOW_FLOOR {
            Severity::CriticalLow
        } else {
            Severity::Low
        }
    } else if reading > range.target_max {
        if reading > CRITICAL_HIGH_CEILING {
            Severity::CriticalHigh
        } else {
            Severity::High
        }
    } else {
        Severity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn condition_priority_order() {
        let both = strings(&["Type 2 Diabetes", "Type 1 Diabetes"]);
        assert_eq!(range_for_conditions(&both), TargetRange::TYPE_1_DIABETES);
        assert_eq!(
            range_for_conditions(&strings(&["Hypertension", "Type 2 Diabetes"])),
            TargetRange::TYPE_2_DIABETES
        );
        assert_eq!(
            range_for_conditions(&strings(&["Pre-diabetes"])),
            TargetRange::PRE_DIABETES
        );
        assert_eq!(range_for_conditions(&[]), TargetRange::NO_CONDITION);
        assert_eq!(range_for_conditions(&strings(&["None"])), TargetRange::NO_CONDITION);
        assert_eq!(
            range_for_conditions(&strings(&["Hypertension"])),
            TargetRange::DEFAULT
        );
    }

    #[test]
    fn measurement_gate() {
        assert!(!is_measurable(19.9));
        assert!(is_measurable(20.0));
        assert!(is_measurable(600.0));
        assert!(!is_measurable(600.1));
    }

    #[test]
    fn severity_bands_for_type1() {
        let range = TargetRange::TYPE_1_DIABETES;
        assert_eq!(classify(65.0, &range), Severity::CriticalLow);
        // Below target_min 80 but above the absolute 70 floor.
        assert_eq!(classify(75.0, &range), Severity::Low);
        assert_eq!(classify(120.0, &range), Severity::Normal);
        assert_eq!(classify(200.0, &range), Severity::High);
        assert_eq!(classify(260.0, &range), Severity::CriticalHigh);
    }

    #[test]
    fn healthy_band_flags_high_earlier_but_critical_at_same_absolute_level() {
        let range = TargetRange::NO_CONDITION;
        assert_eq!(classify(150.0, &range), Severity::High);
        assert_eq!(classify(250.0, &range), Severity::High);
        assert_eq!(classify(250.1, &range), Severity::CriticalHigh);
    }

    #[test]
    fn boundary_readings_are_normal() {
        let range = TargetRange::DEFAULT;
        assert_eq!(classify(range.target_min, &range), Severity::Normal);
        assert_eq!(classify(range.target_max, &range), Severity::Normal);
    }

    #[test]
    fn only_non_normal_severities_alert() {
        assert!(!Severity::Normal.is_alert());
        assert!(Severity::Low.is_alert());
        assert!(Severity::CriticalHigh.is_alert());
        assert_eq!(Severity::CriticalLow.as_str(), "critical_low");
    }
}
