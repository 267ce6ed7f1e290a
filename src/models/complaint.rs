use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One service request, normalized from whatever heterogeneous file produced it.
/// Mirrors the original system's `ComplaintsRaw` table column-for-column; fields the
/// pipeline never needs directly are carried along so the store roundtrips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRaw {
    pub sr_number: String,
    pub sr_row_id: Option<String>,
    pub mdn: Option<String>,
    pub open_ts: NaiveDateTime,
    pub close_ts: Option<NaiveDateTime>,
    pub open_date: NaiveDate,
    pub sr_type: Option<String>,
    pub sr_sub_type: Option<String>,
    pub sr_status: Option<String>,
    pub sr_sub_status: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub exc_id: Option<String>,
    pub cabinet_id: Option<String>,
    pub dp_id: Option<String>,
    pub switch_id: Option<String>,
    pub rca: Option<String>,
    pub desc_text: Option<String>,
    pub priority: Option<String>,
    pub product: Option<String>,
    pub sub_product: Option<String>,
    pub cust_seg: Option<String>,
    pub service_type: Option<String>,
    /// Intentionally kept as a string (§9): the source field's unit is inconsistent
    /// across producers. Parse at read time if a numeric value is ever needed.
    pub sr_duration: Option<String>,
}
