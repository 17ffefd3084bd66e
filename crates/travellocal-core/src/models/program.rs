//! Tour program records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_record, Scalar};
use crate::error::ParseError;
use crate::text::non_blank;

/// A program as listed on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCard {
    pub id: i64,
    pub title: String,
    pub region: String,
    pub likes: Option<i64>,
    pub wishlist_count: i64,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProgramCard {
    id: Option<Scalar>,
    tour_program_id: Option<Scalar>,
    title: Option<String>,
    region: Option<String>,
    region_name: Option<String>,
    likes: Option<Scalar>,
    like_count: Option<Scalar>,
    wishlist_count: Option<Scalar>,
    favorites: Option<Scalar>,
    bookmark_count: Option<Scalar>,
    thumbnail_url: Option<String>,
    image_url: Option<String>,
}

impl TryFrom<RawProgramCard> for ProgramCard {
    type Error = ParseError;

    fn try_from(value: RawProgramCard) -> Result<Self, ParseError> {
        let id = value
            .id
            .as_ref()
            .and_then(Scalar::as_i64)
            .or_else(|| value.tour_program_id.as_ref().and_then(Scalar::as_i64))
            .ok_or(ParseError::MissingField {
                record: "program",
                field: "id",
            })?;

        let likes = value
            .likes
            .as_ref()
            .and_then(Scalar::as_i64)
            .or_else(|| value.like_count.as_ref().and_then(Scalar::as_i64));

        let wishlist_count = [&value.wishlist_count, &value.favorites, &value.bookmark_count]
            .into_iter()
            .find_map(|candidate| candidate.as_ref().and_then(Scalar::as_i64))
            .unwrap_or(0);

        Ok(Self {
            id,
            title: value.title.unwrap_or_default(),
            region: value.region.or(value.region_name).unwrap_or_default(),
            likes,
            wishlist_count,
            thumbnail_url: value.thumbnail_url.or(value.image_url),
        })
    }
}

impl ProgramCard {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        deserialize_record::<RawProgramCard>("program", value)?.try_into()
    }
}

/// One stop in a program's itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub place_description: Option<String>,
    #[serde(default)]
    pub travel_time: Option<i64>,
    #[serde(default)]
    pub google_place_id: Option<String>,
}

/// Full program record from `GET /api/tour-program/<id>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramDetail {
    pub id: i64,
    pub title: String,
    pub region: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub hashtags: Vec<String>,
    pub review_count: i64,
    pub wishlist_count: i64,
    pub wishlisted: bool,
    pub point_paid: bool,
    pub guide_price: i64,
    pub guide_id: Option<i64>,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProgramDetail {
    tour_program_id: Option<Scalar>,
    id: Option<Scalar>,
    title: Option<String>,
    region: Option<String>,
    description: Option<String>,
    thumbnail_url: Option<String>,
    hashtags: Option<Vec<String>>,
    review_count: Option<Scalar>,
    wishlist_count: Option<Scalar>,
    wishlisted: Option<bool>,
    point_paid: Option<bool>,
    guide_price: Option<Scalar>,
    guide_id: Option<Scalar>,
    user: Option<RawProgramOwner>,
    schedules: Option<Vec<Schedule>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProgramOwner {
    id: Option<Scalar>,
}

impl TryFrom<RawProgramDetail> for ProgramDetail {
    type Error = ParseError;

    fn try_from(value: RawProgramDetail) -> Result<Self, ParseError> {
        let id = value
            .tour_program_id
            .as_ref()
            .and_then(Scalar::as_i64)
            .or_else(|| value.id.as_ref().and_then(Scalar::as_i64))
            .ok_or(ParseError::MissingField {
                record: "program detail",
                field: "id",
            })?;
        let count = |field: &Option<Scalar>| field.as_ref().and_then(Scalar::as_i64).unwrap_or(0);
        let guide_id = value
            .guide_id
            .as_ref()
            .and_then(Scalar::as_i64)
            .or_else(|| value.user.as_ref()?.id.as_ref()?.as_i64());

        Ok(Self {
            id,
            title: value.title.unwrap_or_default(),
            region: value.region.unwrap_or_default(),
            description: non_blank(value.description),
            thumbnail_url: non_blank(value.thumbnail_url),
            hashtags: value.hashtags.unwrap_or_default(),
            review_count: count(&value.review_count),
            wishlist_count: count(&value.wishlist_count),
            wishlisted: value.wishlisted.unwrap_or(false),
            point_paid: value.point_paid.unwrap_or(false),
            guide_price: count(&value.guide_price),
            guide_id,
            schedules: value.schedules.unwrap_or_default(),
        })
    }
}

impl ProgramDetail {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        deserialize_record::<RawProgramDetail>("program detail", value)?.try_into()
    }

    /// Itinerary grouped by day, days ascending, stops in response order.
    pub fn schedules_by_day(&self) -> BTreeMap<u32, Vec<&Schedule>> {
        let mut grouped: BTreeMap<u32, Vec<&Schedule>> = BTreeMap::new();
        for schedule in &self.schedules {
            grouped.entry(schedule.day).or_default().push(schedule);
        }
        grouped
    }
}

/// Wishlist count carried by a detail body, if the body has data at all.
///
/// A detail without the field counts as zero.
pub(crate) fn detail_wishlist_count(data: &Value) -> i64 {
    data.get("wishlistCount")
        .cloned()
        .and_then(|value| serde_json::from_value::<Scalar>(value).ok())
        .and_then(|value| value.as_i64())
        .unwrap_or(0)
}
