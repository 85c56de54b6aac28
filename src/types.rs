use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Alert severity level, ordered from lowest to highest. Stored as a lowercase
/// string column on the alerts and thresholds tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// What produced an alert: an operator (`manual`) or a threshold breach in
/// either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Manual,
    ThresholdLow,
    ThresholdHigh,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Manual => "manual",
            AlertKind::ThresholdLow => "threshold_low",
            AlertKind::ThresholdHigh => "threshold_high",
        }
    }
}

impl std::str::FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(AlertKind::Manual),
            "threshold_low" => Ok(AlertKind::ThresholdLow),
            "threshold_high" => Ok(AlertKind::ThresholdHigh),
            _ => Err(format!("unknown alert kind: {s}")),
        }
    }
}

/// Which bound a reading breached. De-duplication is per sensor *and* per
/// direction: an open below-min alert does not suppress a new above-max one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachDirection {
    BelowMin,
    AboveMax,
}

impl BreachDirection {
    pub fn alert_kind(&self) -> AlertKind {
        match self {
            BreachDirection::BelowMin => AlertKind::ThresholdLow,
            BreachDirection::AboveMax => AlertKind::ThresholdHigh,
        }
    }
}

/// Schedule rule flavor: pure clock window, pure sensor condition, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    TimeWindow,
    Condition,
    Hybrid,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::TimeWindow => "time_window",
            RuleKind::Condition => "condition",
            RuleKind::Hybrid => "hybrid",
        }
    }

    pub fn has_window(&self) -> bool {
        matches!(self, RuleKind::TimeWindow | RuleKind::Hybrid)
    }

    pub fn has_condition(&self) -> bool {
        matches!(self, RuleKind::Condition | RuleKind::Hybrid)
    }
}

impl std::str::FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time_window" => Ok(RuleKind::TimeWindow),
            "condition" => Ok(RuleKind::Condition),
            "hybrid" => Ok(RuleKind::Hybrid),
            _ => Err(format!("unknown rule kind: {s}")),
        }
    }
}

/// Explicit alert lifecycle state, derived from the `read`/`attended`/
/// `resolved` flag triad stored on the row. Keeping the derivation here means
/// the legal-transition rules live in one place instead of at every call site.
///
/// `read` is independent of the other two flags; the schema deliberately
/// allows a resolved-but-never-read alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Open,
    Seen,
    Attended,
    Resolved,
}

impl AlertState {
    pub fn from_flags(read: bool, attended: bool, resolved: bool) -> Self {
        if resolved {
            AlertState::Resolved
        } else if attended {
            AlertState::Attended
        } else if read {
            AlertState::Seen
        } else {
            AlertState::Open
        }
    }

    /// Resolved is terminal: a new breach spawns a new alert instead of
    /// reopening this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertState::Resolved)
    }
}

/// One time-stamped measurement for an installed sensor, as delivered by the
/// ingest queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: i32,
    pub value: f64,
    pub taken_at: NaiveDateTime,
}

/// A "run this actuator now" decision emitted by the schedule evaluator.
/// Dispatching it (and tracking last-fired state) is the consumer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuationIntent {
    pub rule_id: i32,
    pub installation_id: i32,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trip() {
        let sev: Severity = "critical".parse().unwrap();
        assert_eq!(sev, Severity::Critical);
        assert_eq!(sev.as_str(), "critical");
        assert!(Severity::Critical > Severity::Info);
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn alert_state_from_flags() {
        assert_eq!(AlertState::from_flags(false, false, false), AlertState::Open);
        assert_eq!(AlertState::from_flags(true, false, false), AlertState::Seen);
        assert_eq!(AlertState::from_flags(true, true, false), AlertState::Attended);
        assert_eq!(AlertState::from_flags(true, true, true), AlertState::Resolved);
        // read stays independent: resolved-but-unread is representable
        assert_eq!(AlertState::from_flags(false, true, true), AlertState::Resolved);
        assert!(AlertState::Resolved.is_terminal());
        assert!(!AlertState::Attended.is_terminal());
    }

    #[test]
    fn breach_direction_maps_to_alert_kind() {
        assert_eq!(BreachDirection::BelowMin.alert_kind(), AlertKind::ThresholdLow);
        assert_eq!(BreachDirection::AboveMax.alert_kind(), AlertKind::ThresholdHigh);
    }
}
