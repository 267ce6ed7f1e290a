use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resolution dimensions are a strict subset of the analytical dimension set: RCA and
/// Type are not part of MTTR/aging breakdowns per spec §4.12, which names only
/// Total/Region/City/Exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionDimension {
    Total,
    Region,
    Exchange,
    City,
}

impl ResolutionDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionDimension::Total => "Total",
            ResolutionDimension::Region => "Region",
            ResolutionDimension::Exchange => "Exchange",
            ResolutionDimension::City => "City",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<ResolutionDimension> {
        match s {
            "Total" => Some(ResolutionDimension::Total),
            "Region" => Some(ResolutionDimension::Region),
            "Exchange" => Some(ResolutionDimension::Exchange),
            "City" => Some(ResolutionDimension::City),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMttr {
    pub id: Option<i64>,
    pub mttr_date: NaiveDate,
    pub dimension: ResolutionDimension,
    pub dimension_key: String,
    pub avg_mttr_hours: f64,
    pub total_resolved_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingSlab {
    Over24h,
    Over48h,
    Over72h,
    Over6d,
    Over10d,
    Over30d,
    Over60d,
}

impl AgingSlab {
    /// Ordered from loosest to tightest bound; a row falls in the *largest* slab it
    /// satisfies, so callers should walk this list from the end.
    pub const ASCENDING: [AgingSlab; 7] = [
        AgingSlab::Over24h,
        AgingSlab::Over48h,
        AgingSlab::Over72h,
        AgingSlab::Over6d,
        AgingSlab::Over10d,
        AgingSlab::Over30d,
        AgingSlab::Over60d,
    ];

    pub fn threshold_hours(&self) -> f64 {
        match self {
            AgingSlab::Over24h => 24.0,
            AgingSlab::Over48h => 48.0,
            AgingSlab::Over72h => 72.0,
            AgingSlab::Over6d => 6.0 * 24.0,
            AgingSlab::Over10d => 10.0 * 24.0,
            AgingSlab::Over30d => 30.0 * 24.0,
            AgingSlab::Over60d => 60.0 * 24.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgingSlab::Over24h => "> 24 Hours",
            AgingSlab::Over48h => "> 48 Hours",
            AgingSlab::Over72h => "> 72 Hours",
            AgingSlab::Over6d => "> 6 Days",
            AgingSlab::Over10d => "> 10 Days",
            AgingSlab::Over30d => "> 30 Days",
            AgingSlab::Over60d => "> 60 Days",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<AgingSlab> {
        Self::ASCENDING.into_iter().find(|slab| slab.as_str() == s)
    }

    /// The largest slab `age_hours` satisfies, or `None` if it's under 24h.
    pub fn classify(age_hours: f64) -> Option<AgingSlab> {
        Self::ASCENDING
            .into_iter()
            .rev()
            .find(|slab| age_hours > slab.threshold_hours())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAging {
    pub id: Option<i64>,
    pub aging_date: NaiveDate,
    pub dimension: ResolutionDimension,
    pub dimension_key: String,
    pub slab: AgingSlab,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_picks_largest_satisfied_slab() {
        assert_eq!(AgingSlab::classify(10.0), None);
        assert_eq!(AgingSlab::classify(25.0), Some(AgingSlab::Over24h));
        assert_eq!(AgingSlab::classify(49.0), Some(AgingSlab::Over48h));
        assert_eq!(AgingSlab::classify(24.0 * 61.0), Some(AgingSlab::Over60d));
    }
}
