//! Reservation request assembled before handing off to the payment gateway.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::ProgramDetail;
use crate::error::{Error, Result};

/// Per-person price used when a program has no guide price set.
pub const DEFAULT_GUIDE_PRICE: i64 = 50_000;
const DEFAULT_GUIDE_ID: i64 = 1;
const PAYMENT_METHOD_CARD: &str = "card";
const GUIDE_START_HOUR: u32 = 10;
const GUIDE_END_HOUR: u32 = 13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub num_of_people: u32,
    pub guide_start_date: String,
    pub guide_end_date: String,
    pub tour_program_id: i64,
    pub payment_method: String,
    pub guide_id: i64,
    pub total_price: i64,
    pub imp_uid: String,
    pub merchant_uid: String,
    pub user_id: Option<String>,
}

impl ReservationDraft {
    pub fn build(
        detail: &ProgramDetail,
        user_id: Option<String>,
        date: NaiveDate,
        people: u32,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if people == 0 {
            return Err(Error::InvalidInput(
                "number of people must be at least 1".to_string(),
            ));
        }
        let unit_price = if detail.guide_price > 0 {
            detail.guide_price
        } else {
            DEFAULT_GUIDE_PRICE
        };

        Ok(Self {
            num_of_people: people,
            guide_start_date: guide_time(date, GUIDE_START_HOUR),
            guide_end_date: guide_time(date, GUIDE_END_HOUR),
            tour_program_id: detail.id,
            payment_method: PAYMENT_METHOD_CARD.to_string(),
            guide_id: detail.guide_id.unwrap_or(DEFAULT_GUIDE_ID),
            total_price: unit_price.saturating_mul(i64::from(people)),
            imp_uid: String::new(),
            merchant_uid: format!("merchant_{}", now.timestamp_millis()),
            user_id,
        })
    }
}

fn guide_time(date: NaiveDate, hour: u32) -> String {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string()
}
