//! Review lists for tour programs and places.

use chrono::Utc;
use serde_json::json;

use crate::api::envelope::{STATUS_OK, STATUS_SUCCESS};
use crate::api::{ensure_status, unwrap_list, ApiClient, Auth, QueryParams};
use crate::config::REVIEW_PAGE_SIZE;
use crate::error::Result;
use crate::models::{parse_items, Review, ReviewDraft};
use crate::session::CredentialStore;
use crate::sort::ReviewSort;
use crate::sync::ListSource;

pub const REVIEW_LOAD_FAILURE: &str = "리뷰를 불러오지 못했습니다.";
pub const REVIEW_DELETE_PROMPT: &str = "리뷰를 삭제하시겠습니까?";
/// `userName` sent with a place review when no identity is cached.
pub const FALLBACK_REVIEWER_NAME: &str = "사용자";

const LIST_STATUSES: &[&str] = &[STATUS_OK, STATUS_SUCCESS];
const MUTATION_STATUSES: &[&str] = &[STATUS_OK];

fn page_params(sort: ReviewSort) -> QueryParams {
    QueryParams::new()
        .with("page", 0)
        .with("size", REVIEW_PAGE_SIZE)
        .with("sortOption", sort.as_server_str())
}

/// Reviews of one tour program.
#[derive(Debug, Clone)]
pub struct TourReviewSource<S: CredentialStore> {
    client: ApiClient<S>,
    program_id: i64,
    sort: ReviewSort,
}

impl<S: CredentialStore> TourReviewSource<S> {
    pub const fn new(client: ApiClient<S>, program_id: i64, sort: ReviewSort) -> Self {
        Self {
            client,
            program_id,
            sort,
        }
    }

    pub const fn program_id(&self) -> i64 {
        self.program_id
    }
}

impl<S: CredentialStore> ListSource for TourReviewSource<S> {
    type Item = Review;
    type Draft = ReviewDraft;
    type Key = i64;

    async fn fetch(&self) -> Result<Vec<Review>> {
        let path = format!("/api/tour-program/review/{}", self.program_id);
        let body = self
            .client
            .get(&path, &page_params(self.sort), Auth::Optional)
            .await?;
        ensure_status(&body, LIST_STATUSES)?;
        Ok(parse_items(unwrap_list(&body), Review::from_tour_value))
    }

    async fn create(&self, draft: &ReviewDraft) -> Result<()> {
        let draft = draft.validated()?;
        let body = json!({
            "tourProgramId": self.program_id,
            "rating": draft.rating_label(),
            "content": draft.content,
            "imageUrls": draft.image_urls(),
        });
        let response = self
            .client
            .post("/api/tour-program/review", &body, Auth::Required)
            .await?;
        ensure_status(&response, MUTATION_STATUSES)?;
        tracing::info!(program_id = self.program_id, "tour review created");
        Ok(())
    }

    async fn delete(&self, review_id: &i64) -> Result<()> {
        let path = format!("/api/tour-program/review/{review_id}");
        let response = self
            .client
            .delete(&path, &QueryParams::new(), Auth::Required)
            .await?;
        ensure_status(&response, MUTATION_STATUSES)?;
        tracing::info!(program_id = self.program_id, review_id, "tour review deleted");
        Ok(())
    }

    fn load_failure_message(&self) -> &'static str {
        REVIEW_LOAD_FAILURE
    }
}

/// Reviews of one place, keyed by its Google place id.
#[derive(Debug, Clone)]
pub struct PlaceReviewSource<S: CredentialStore> {
    client: ApiClient<S>,
    place_id: String,
    sort: ReviewSort,
}

impl<S: CredentialStore> PlaceReviewSource<S> {
    pub fn new(client: ApiClient<S>, place_id: impl Into<String>, sort: ReviewSort) -> Self {
        Self {
            client,
            place_id: place_id.into(),
            sort,
        }
    }

    pub fn place_id(&self) -> &str {
        &self.place_id
    }

    fn reviewer_name(&self) -> Result<String> {
        Ok(self
            .client
            .session()
            .cached_identity()?
            .map_or_else(|| FALLBACK_REVIEWER_NAME.to_string(), |identity| identity.user_name))
    }
}

impl<S: CredentialStore> ListSource for PlaceReviewSource<S> {
    type Item = Review;
    type Draft = ReviewDraft;
    type Key = i64;

    async fn fetch(&self) -> Result<Vec<Review>> {
        let path = format!("/api/place/review/{}", urlencoding::encode(&self.place_id));
        let body = self
            .client
            .get(&path, &page_params(self.sort), Auth::Optional)
            .await?;
        ensure_status(&body, LIST_STATUSES)?;
        let now = Utc::now();
        Ok(parse_items(unwrap_list(&body), |index, value| {
            Review::from_place_value(index, value, now)
        }))
    }

    async fn create(&self, draft: &ReviewDraft) -> Result<()> {
        let draft = draft.validated()?;
        let body = json!({
            "googlePlaceId": self.place_id,
            "rating": draft.rating_label(),
            "content": draft.content,
            "imageUrls": draft.image_urls(),
            "userName": self.reviewer_name()?,
        });
        let response = self
            .client
            .post("/api/place/review", &body, Auth::Required)
            .await?;
        ensure_status(&response, MUTATION_STATUSES)?;
        tracing::info!(place_id = %self.place_id, "place review created");
        Ok(())
    }

    async fn delete(&self, review_id: &i64) -> Result<()> {
        let params = QueryParams::new()
            .with("googlePlaceId", &self.place_id)
            .with("reviewId", review_id);
        let response = self
            .client
            .delete("/api/place/review", &params, Auth::Required)
            .await?;
        ensure_status(&response, MUTATION_STATUSES)?;
        tracing::info!(place_id = %self.place_id, review_id, "place review deleted");
        Ok(())
    }

    fn load_failure_message(&self) -> &'static str {
        REVIEW_LOAD_FAILURE
    }

    fn delete_prompt(&self) -> &'static str {
        REVIEW_DELETE_PROMPT
    }
}
