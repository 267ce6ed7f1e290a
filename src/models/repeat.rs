use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatSeverity {
    Normal,
    Alarming,
    Critical,
    VeryAlarming,
}

impl RepeatSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatSeverity::Normal => "NORMAL REPEAT",
            RepeatSeverity::Alarming => "ALARMING",
            RepeatSeverity::Critical => "CRITICAL",
            RepeatSeverity::VeryAlarming => "VERY ALARMING",
        }
    }

    /// Classification thresholds from §4.11: `>10 → VERY ALARMING`, `>6 → CRITICAL`,
    /// `>3 → ALARMING`, else `NORMAL REPEAT`.
    pub fn classify(repeat_count: i64) -> RepeatSeverity {
        if repeat_count > 10 {
            RepeatSeverity::VeryAlarming
        } else if repeat_count > 6 {
            RepeatSeverity::Critical
        } else if repeat_count > 3 {
            RepeatSeverity::Alarming
        } else {
            RepeatSeverity::Normal
        }
    }
}

/// One repeat caller (non-empty `mdn` appearing more than once in the 30-day window
/// ending on the target date). Read-mostly result type, not persisted (§6 names no
/// `daily_repeats` table).
#[derive(Debug, Clone)]
pub struct RepeatHighlight {
    pub mdn: String,
    pub repeat_count: i64,
    pub severity: RepeatSeverity,
    pub region: Option<String>,
    pub exchange: Option<String>,
    pub city: Option<String>,
    /// The most frequent `sr_sub_type` among this MDN's rows in the window.
    pub modal_sub_type: Option<String>,
}

/// Aggregated output of the Repeat stage: the filtered repeater list plus the
/// breakdowns named in §4.11.
#[derive(Debug, Clone, Default)]
pub struct RepeatReport {
    pub repeaters: Vec<RepeatHighlight>,
    pub by_region: BTreeMap<String, i64>,
    pub by_exchange: BTreeMap<String, i64>,
    pub by_city: BTreeMap<String, i64>,
    pub by_severity: BTreeMap<&'static str, i64>,
    pub by_sub_type: BTreeMap<String, i64>,
    pub by_region_sub_type: BTreeMap<(String, String), i64>,
    pub by_exchange_sub_type: BTreeMap<(String, String), i64>,
    pub by_city_sub_type: BTreeMap<(String, String), i64>,
    /// Heaviest repeaters, descending by `repeat_count`, capped to the configured N.
    pub top_repeaters: Vec<RepeatHighlight>,
}
