//! Canonical records parsed from backend responses.
//!
//! Field-name fallbacks live here and nowhere else. Each `Raw*` struct mirrors
//! what the endpoint may send; conversion into the public record decides which
//! field wins.

mod program;
mod reservation;
mod review;
mod user;

pub(crate) use program::detail_wishlist_count;
pub use program::{ProgramCard, ProgramDetail, Schedule};
pub use reservation::{ReservationDraft, DEFAULT_GUIDE_PRICE};
pub use review::{render_stars, RatingStats, Review, ReviewDraft, ScoreCount, ANONYMOUS_NAME};
pub use user::CurrentUser;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;

/// JSON scalar the backend sends as either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                Some(*value as i64)
            }
            Self::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(value) => value.trim().parse::<f64>().ok(),
            Self::Bool(_) => None,
        };
        value.filter(|value| value.is_finite())
    }

    /// String form for identifiers compared across numeric/string encodings.
    pub(crate) fn as_id_string(&self) -> Option<String> {
        match self {
            Self::Int(value) => Some(value.to_string()),
            Self::Float(_) => self.as_i64().map(|value| value.to_string()),
            Self::Text(value) => crate::text::non_blank(Some(value.clone())),
            Self::Bool(_) => None,
        }
    }
}

pub(crate) fn deserialize_record<T: for<'de> Deserialize<'de>>(
    record: &'static str,
    value: Value,
) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|error| ParseError::InvalidShape {
        record,
        detail: error.to_string(),
    })
}

/// Parses every item, skipping (and logging) the ones that do not fit.
pub(crate) fn parse_items<T>(
    items: Vec<Value>,
    mut parse: impl FnMut(usize, Value) -> Result<T, ParseError>,
) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match parse(index, item) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(index, %error, "skipping unparseable list item");
                None
            }
        })
        .collect()
}
