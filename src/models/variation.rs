use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationType {
    Dod,
    Wow,
    Mom,
}

impl VariationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationType::Dod => "DOD",
            VariationType::Wow => "WOW",
            VariationType::Mom => "MOM",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<VariationType> {
        match s {
            "DOD" => Some(VariationType::Dod),
            "WOW" => Some(VariationType::Wow),
            "MOM" => Some(VariationType::Mom),
            _ => None,
        }
    }
}

/// (date, dimension, key, type) variation record. See spec §3/§4.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyVariation {
    pub id: Option<i64>,
    pub variation_date: NaiveDate,
    pub dimension: Dimension,
    pub dimension_key: String,
    pub variation_type: VariationType,
    pub current_value: f64,
    pub previous_value: f64,
    pub variation_percent: f64,
    pub is_significant: bool,
}
