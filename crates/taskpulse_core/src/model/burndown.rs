use crate::model::timestamp;
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurndownPoint {
    #[serde(with = "timestamp::calendar_date")]
    pub date: Date,
    pub actual: u32,
    pub ideal: u32,
}
