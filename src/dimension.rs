use serde::{Deserialize, Serialize};

use crate::models::complaint::ComplaintRaw;

/// The five analytical dimensions. A closed variant rather than a string key, per
/// the design note that polymorphism over dimensions should not go through
/// runtime-name lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Type,
    Region,
    Exchange,
    City,
    Rca,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Type,
        Dimension::Region,
        Dimension::Exchange,
        Dimension::City,
        Dimension::Rca,
    ];

    /// Dimensions RCA attribution applies to (§4.7): every dimension except RCA
    /// itself, since "what's the probable cause of this RCA anomaly" is circular.
    pub const RCA_APPLICABLE: [Dimension; 4] = [
        Dimension::Type,
        Dimension::Region,
        Dimension::Exchange,
        Dimension::City,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Type => "Type",
            Dimension::Region => "Region",
            Dimension::Exchange => "Exchange",
            Dimension::City => "City",
            Dimension::Rca => "RCA",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Dimension> {
        match s {
            "Type" => Some(Dimension::Type),
            "Region" => Some(Dimension::Region),
            "Exchange" => Some(Dimension::Exchange),
            "City" => Some(Dimension::City),
            "RCA" => Some(Dimension::Rca),
            _ => None,
        }
    }

    /// The column this dimension groups `ComplaintRaw` by.
    pub fn column<'a>(&self, row: &'a ComplaintRaw) -> Option<&'a str> {
        let v = match self {
            Dimension::Type => &row.sr_type,
            Dimension::Region => &row.region,
            Dimension::Exchange => &row.exc_id,
            Dimension::City => &row.city,
            Dimension::Rca => &row.rca,
        };
        v.as_deref().filter(|s| !s.is_empty())
    }

    /// The `complaints_raw` column name, for building SQL.
    pub fn sql_column(&self) -> &'static str {
        match self {
            Dimension::Type => "sr_type",
            Dimension::Region => "region",
            Dimension::Exchange => "exc_id",
            Dimension::City => "city",
            Dimension::Rca => "rca",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::from_str_opt(d.as_str()), Some(d));
        }
    }

    #[test]
    fn rca_applicable_excludes_rca() {
        assert!(!Dimension::RCA_APPLICABLE.contains(&Dimension::Rca));
        assert_eq!(Dimension::RCA_APPLICABLE.len(), 4);
    }
}
