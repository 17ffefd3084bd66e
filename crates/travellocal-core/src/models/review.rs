//! Review records for tour programs and places.
//!
//! Both backends describe the same entity with slightly different payloads,
//! so there is one `Review` and one normalizer per resource.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_record, Scalar};
use crate::error::{Error, ParseError, Result};
use crate::text::non_blank;

pub const ANONYMOUS_NAME: &str = "익명";
pub const MAX_RATING: u8 = 5;
const FALLBACK_ID_BASE: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: i64,
    pub user_id: Option<String>,
    pub name: String,
    pub rating: f64,
    pub content: String,
    pub image_urls: Vec<String>,
    pub verification_badge: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawReview {
    review_id: Option<Scalar>,
    id: Option<Scalar>,
    user_id: Option<Scalar>,
    #[serde(rename = "user_id")]
    user_id_snake: Option<Scalar>,
    user: Option<RawReviewUser>,
    name: Option<String>,
    rating: Option<Scalar>,
    content: Option<String>,
    image_urls: Option<Value>,
    images_urls: Option<Value>,
    verification_badge: Option<bool>,
    created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReviewUser {
    name: Option<String>,
}

impl RawReview {
    fn author_id(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .and_then(Scalar::as_id_string)
            .or_else(|| self.user_id_snake.as_ref().and_then(Scalar::as_id_string))
    }

    fn review_id(&self) -> Option<i64> {
        nonzero(self.review_id.as_ref())
    }
}

impl Review {
    /// Normalizes an item of `GET /api/tour-program/review/<programId>`.
    pub fn from_tour_value(index: usize, value: Value) -> std::result::Result<Self, ParseError> {
        let raw: RawReview = deserialize_record("tour review", value)?;
        let user_id = raw.author_id();
        let id = raw
            .review_id()
            .or_else(|| nonzero(raw.id.as_ref()))
            .unwrap_or_else(|| fallback_id(index));
        let name = raw
            .user
            .and_then(|user| non_blank(user.name))
            .or_else(|| non_blank(raw.name))
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());
        let rating = raw.rating.as_ref().and_then(Scalar::as_f64).unwrap_or(0.0);

        Ok(Self {
            id,
            user_id,
            name,
            rating,
            content: raw.content.unwrap_or_default(),
            image_urls: string_array(raw.image_urls),
            verification_badge: raw.verification_badge.unwrap_or(false),
            created_at: non_blank(raw.created_at),
        })
    }

    /// Normalizes an item of `GET /api/place/review/<googlePlaceId>`.
    ///
    /// Ratings are clamped to `0..=5`; a missing timestamp becomes `now`.
    pub fn from_place_value(
        index: usize,
        value: Value,
        now: DateTime<Utc>,
    ) -> std::result::Result<Self, ParseError> {
        let raw: RawReview = deserialize_record("place review", value)?;
        let user_id = raw.author_id();
        let id = raw.review_id().unwrap_or_else(|| fallback_id(index));
        let rating = raw
            .rating
            .as_ref()
            .and_then(Scalar::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, f64::from(MAX_RATING));

        Ok(Self {
            id,
            user_id,
            name: non_blank(raw.name).unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            rating,
            content: raw.content.unwrap_or_default(),
            image_urls: string_array(raw.images_urls),
            verification_badge: raw.verification_badge.unwrap_or(false),
            created_at: Some(
                non_blank(raw.created_at)
                    .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
        })
    }

    /// Whether `user_id` wrote this review. Ids compare by string form.
    pub fn is_owned_by(&self, user_id: Option<&str>) -> bool {
        match (self.user_id.as_deref(), user_id.map(str::trim)) {
            (Some(author), Some(user)) => !user.is_empty() && author == user,
            _ => false,
        }
    }
}

fn nonzero(value: Option<&Scalar>) -> Option<i64> {
    value.and_then(Scalar::as_i64).filter(|id| *id != 0)
}

fn fallback_id(index: usize) -> i64 {
    i64::try_from(index).map_or(i64::MAX, |index| index.saturating_add(FALLBACK_ID_BASE))
}

fn string_array(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => non_blank(Some(url)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Input for a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: u8,
    pub content: String,
    pub image_url: Option<String>,
}

impl ReviewDraft {
    pub fn new(rating: u8, content: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            rating,
            content: content.into(),
            image_url,
        }
    }

    /// Trimmed copy of the draft, or `InvalidInput` before any request is made.
    pub fn validated(&self) -> Result<Self> {
        if !(1..=MAX_RATING).contains(&self.rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between 1 and {MAX_RATING}"
            )));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput(
                "review content must not be empty".to_string(),
            ));
        }
        Ok(Self {
            rating: self.rating,
            content: content.to_string(),
            image_url: non_blank(self.image_url.clone()),
        })
    }

    /// Rating as the backend expects it, e.g. `"4.0"`.
    pub fn rating_label(&self) -> String {
        format!("{:.1}", f64::from(self.rating))
    }

    pub fn image_urls(&self) -> Vec<String> {
        self.image_url.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
}

/// Average and per-score distribution of a review list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub average: f64,
    pub total: usize,
    /// Scores 5 down to 1.
    pub distribution: Vec<ScoreCount>,
}

impl RatingStats {
    /// Ratings outside `1..=5` are left out of the distribution and the sum
    /// but still count toward the total the average divides by.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution: Vec<ScoreCount> = (1..=MAX_RATING)
            .rev()
            .map(|score| ScoreCount { score, count: 0 })
            .collect();
        if reviews.is_empty() {
            return Self {
                average: 0.0,
                total: 0,
                distribution,
            };
        }

        let mut sum = 0.0;
        for review in reviews {
            if (1.0..=f64::from(MAX_RATING)).contains(&review.rating) {
                let score = review.rating.floor() as usize;
                distribution[usize::from(MAX_RATING) - score].count += 1;
                sum += review.rating;
            }
        }

        Self {
            average: sum / reviews.len() as f64,
            total: reviews.len(),
            distribution,
        }
    }

    /// Share of reviews with `count` entries, in percent.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Five-slot star bar for a rating, clamped to `0..=5`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_stars(rating: f64) -> String {
    let rating = if rating.is_nan() { 0.0 } else { rating };
    let full = rating.clamp(0.0, f64::from(MAX_RATING)).floor() as usize;
    let empty = usize::from(MAX_RATING) - full;
    format!("{}{}", "⭐".repeat(full), "☆".repeat(empty))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn tour_review_falls_back_through_id_and_name_fields() {
        let review = Review::from_tour_value(
            2,
            json!({
                "reviewId": 0,
                "id": 31,
                "user_id": 9,
                "user": {"name": ""},
                "name": "민지",
                "rating": "4.5",
                "content": "좋았어요"
            }),
        )
        .unwrap();

        assert_eq!(review.id, 31);
        assert_eq!(review.user_id.as_deref(), Some("9"));
        assert_eq!(review.name, "민지");
        assert!((review.rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tour_review_without_ids_uses_index_offset() {
        let review = Review::from_tour_value(3, json!({"rating": "not a number"})).unwrap();
        assert_eq!(review.id, 1003);
        assert_eq!(review.name, ANONYMOUS_NAME);
        assert!(review.rating.abs() < f64::EPSILON);
    }

    #[test]
    fn place_review_clamps_rating_and_reads_images_urls() {
        let review = Review::from_place_value(
            0,
            json!({
                "reviewId": 12,
                "userId": "u-1",
                "rating": 9,
                "imagesUrls": ["https://img.example.com/1.jpg"],
                "imageUrls": ["ignored"],
                "verificationBadge": true
            }),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(review.id, 12);
        assert!((review.rating - 5.0).abs() < f64::EPSILON);
        assert_eq!(review.image_urls, vec!["https://img.example.com/1.jpg"]);
        assert!(review.verification_badge);
        assert_eq!(review.created_at.as_deref(), Some("2025-03-01T09:00:00.000Z"));
    }

    #[test]
    fn place_review_ignores_non_array_images() {
        let review =
            Review::from_place_value(1, json!({"imagesUrls": "a.jpg", "id": 50}), fixed_now())
                .unwrap();
        assert!(review.image_urls.is_empty());
        assert_eq!(review.id, 1001);
    }

    #[test]
    fn ownership_compares_string_forms() {
        let review = Review::from_tour_value(0, json!({"userId": 42})).unwrap();
        assert!(review.is_owned_by(Some("42")));
        assert!(!review.is_owned_by(Some("7")));
        assert!(!review.is_owned_by(None));
    }

    #[test]
    fn draft_validation_rejects_empty_content_and_bad_rating() {
        assert!(ReviewDraft::new(5, "   ", None).validated().is_err());
        assert!(ReviewDraft::new(0, "ok", None).validated().is_err());
        assert!(ReviewDraft::new(6, "ok", None).validated().is_err());

        let draft = ReviewDraft::new(4, "  맛집 추천  ", Some(" ".to_string()))
            .validated()
            .unwrap();
        assert_eq!(draft.content, "맛집 추천");
        assert_eq!(draft.rating_label(), "4.0");
        assert!(draft.image_urls().is_empty());
    }

    #[test]
    fn rating_stats_counts_by_floor() {
        let reviews: Vec<Review> = [5.0, 4.5, 4.0, 0.0]
            .iter()
            .enumerate()
            .map(|(index, rating)| {
                Review::from_place_value(index, json!({"rating": rating}), fixed_now()).unwrap()
            })
            .collect();

        let stats = RatingStats::from_reviews(&reviews);
        assert_eq!(stats.total, 4);
        assert!((stats.average - 13.5 / 4.0).abs() < 1e-9);
        assert_eq!(stats.distribution[0], ScoreCount { score: 5, count: 1 });
        assert_eq!(stats.distribution[1], ScoreCount { score: 4, count: 2 });
        assert_eq!(stats.distribution[4], ScoreCount { score: 1, count: 0 });
        assert!((stats.percent(2) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rating_stats_for_empty_list() {
        let stats = RatingStats::from_reviews(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.distribution.len(), 5);
        assert!(stats.percent(0).abs() < f64::EPSILON);
    }

    #[test]
    fn render_stars_clamps() {
        assert_eq!(render_stars(3.7), "⭐⭐⭐☆☆");
        assert_eq!(render_stars(-1.0), "☆☆☆☆☆");
        assert_eq!(render_stars(12.0), "⭐⭐⭐⭐⭐");
    }
}
