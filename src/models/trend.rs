use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Stable => "STABLE",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<TrendDirection> {
        match s {
            "UP" => Some(TrendDirection::Up),
            "DOWN" => Some(TrendDirection::Down),
            "STABLE" => Some(TrendDirection::Stable),
            _ => None,
        }
    }
}

/// (date, dimension, key, window) trend record. See spec §3/§4.4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTrend {
    pub id: Option<i64>,
    pub trend_date: NaiveDate,
    pub dimension: Dimension,
    pub dimension_key: String,
    pub window_days: u32,
    pub metric_value: i64,
    pub trend_direction: TrendDirection,
    pub trend_strength: f64,
    pub significance: Option<f64>,
}
