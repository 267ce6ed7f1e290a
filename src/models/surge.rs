/// The four scope levels Surge computes over, from coarsest to finest (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurgeLevel {
    Total,
    Region,
    RegionExchange,
    RegionExchangeCity,
}

impl SurgeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurgeLevel::Total => "Total",
            SurgeLevel::Region => "Region",
            SurgeLevel::RegionExchange => "Region+Exchange",
            SurgeLevel::RegionExchangeCity => "Region+Exchange+City",
        }
    }

    /// Minimum raw count for a candidate at this level to be considered at all.
    /// `None` means no floor (Total has none).
    pub fn floor(&self) -> Option<i64> {
        match self {
            SurgeLevel::Total => None,
            SurgeLevel::Region => Some(15),
            SurgeLevel::RegionExchange => Some(10),
            SurgeLevel::RegionExchangeCity => Some(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurgeSeverity {
    Alarming,
    Critical,
}

impl SurgeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurgeSeverity::Alarming => "ALARMING",
            SurgeSeverity::Critical => "CRITICAL",
        }
    }
}

/// A surge candidate that cleared its level's floor and threshold. Read-mostly; not
/// part of the persisted schema (§6 names no `daily_surges` table) so this is an
/// in-process result type only.
#[derive(Debug, Clone)]
pub struct SurgeHighlight {
    pub level: SurgeLevel,
    pub region: Option<String>,
    pub exchange: Option<String>,
    pub city: Option<String>,
    pub current: i64,
    pub mtd_avg: f64,
    pub last_week: i64,
    pub pct_mtd: f64,
    pub pct_wow: f64,
    pub max_pct: f64,
    pub severity: SurgeSeverity,
}
