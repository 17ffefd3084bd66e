//! Home screen recommendations: the most wishlisted programs.
//!
//! The list endpoint's wishlist counters are not reliable, so every card is
//! re-counted from its detail record before ranking.

use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;

use crate::api::{unwrap_list, ApiClient, Auth, QueryParams};
use crate::config::{RECOMMENDATION_DISPLAY_COUNT, RECOMMENDATION_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::models::{detail_wishlist_count, parse_items, ProgramCard};
use crate::session::CredentialStore;
use crate::sort::{sort_desc_by_key, ProgramSort};
use crate::sync::ListSource;

pub const RECOMMENDATION_LOAD_FAILURE: &str = "추천 목록을 불러오지 못했습니다.";

/// City and county names of Chungcheongnam-do.
pub const CHUNGNAM_REGIONS: &[&str] = &[
    "천안시", "아산시", "공주시", "보령시", "서산시", "논산시", "당진시", "계룡시", "금산군",
    "부여군", "서천군", "청양군", "홍성군", "예산군", "태안군",
];

pub const PREFERRED_HASHTAGS: &[&str] = &[
    "혼자여행", "커플여행", "가족여행", "우정여행", "여행버디", "즉흥여행", "계획여행",
    "자연여행", "도시탐방", "문화유산", "힐링여행", "액티비티", "맛집투어", "야경명소",
    "해수욕장", "산정상뷰", "계곡여행", "한옥마을", "전통시장", "한강산책", "감성숙소",
    "가성비숙소", "한적한여행", "혼산", "혼캠", "감성사진", "카페투어", "야경촬영",
    "자연과함께", "힐링산책", "산림욕", "한적한바닷가", "로컬푸드", "재충전",
    "계획없이떠나기", "사진맛집", "편한여행", "감성여행", "조용한여행", "감성가득",
    "쉼표여행", "마음정리", "트레킹", "일상탈출", "소확행", "걷기좋은길", "하늘풍경",
    "초록자연", "일몰명소", "바람쐬기",
];

/// Looks up a single program's detail body.
#[allow(async_fn_in_trait)]
pub trait ProgramDetailFetcher {
    async fn program_detail(&self, program_id: i64) -> Result<Value>;
}

impl<S: CredentialStore> ProgramDetailFetcher for ApiClient<S> {
    async fn program_detail(&self, program_id: i64) -> Result<Value> {
        self.get_detail("tour-program", program_id, Auth::Optional)
            .await
    }
}

/// Replaces each card's wishlist count with the one from its detail record.
///
/// All lookups are started together and each is bounded by `timeout`. A card
/// whose lookup fails keeps the count it came with.
pub async fn enrich_wishlist_counts<F: ProgramDetailFetcher>(
    fetcher: &F,
    cards: Vec<ProgramCard>,
    timeout: Duration,
) -> Vec<ProgramCard> {
    let lookups = cards
        .iter()
        .map(|card| tokio::time::timeout(timeout, fetcher.program_detail(card.id)));
    let results = join_all(lookups).await;

    cards
        .into_iter()
        .zip(results)
        .map(|(mut card, result)| {
            match result {
                Ok(Ok(body)) => {
                    if let Some(data) = body.get("data").filter(|data| !data.is_null()) {
                        card.wishlist_count = detail_wishlist_count(data);
                    }
                }
                Ok(Err(error)) => {
                    tracing::warn!(program_id = card.id, %error, "program detail lookup failed");
                }
                Err(_) => {
                    tracing::warn!(
                        program_id = card.id,
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "program detail lookup timed out"
                    );
                }
            }
            card
        })
        .collect()
}

/// Most wishlisted first, ties in list order, at most `limit` cards.
pub fn rank_by_wishlist(mut cards: Vec<ProgramCard>, limit: usize) -> Vec<ProgramCard> {
    sort_desc_by_key(&mut cards, |card| card.wishlist_count);
    cards.truncate(limit);
    cards
}

#[derive(Debug, Clone)]
pub struct RecommendationSource<S: CredentialStore> {
    client: ApiClient<S>,
    hashtags: Vec<String>,
    regions: Vec<String>,
    sort: Option<ProgramSort>,
}

impl<S: CredentialStore> RecommendationSource<S> {
    /// Source using the preferred hashtags and the Chungnam regions.
    pub fn new(client: ApiClient<S>) -> Self {
        Self {
            client,
            hashtags: PREFERRED_HASHTAGS.iter().map(ToString::to_string).collect(),
            regions: CHUNGNAM_REGIONS.iter().map(ToString::to_string).collect(),
            sort: None,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, hashtags: Vec<String>, regions: Vec<String>) -> Self {
        self.hashtags = hashtags;
        self.regions = regions;
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: ProgramSort) -> Self {
        self.sort = Some(sort);
        self
    }

    fn list_params(&self) -> QueryParams {
        let params = QueryParams::new()
            .with_sequence("hashtags", &self.hashtags)
            .with_sequence("regions", &self.regions)
            .with("page", 0)
            .with("size", RECOMMENDATION_PAGE_SIZE);
        match self.sort {
            Some(sort) => params.with("sortOption", sort.as_server_str()),
            None => params,
        }
    }
}

impl<S: CredentialStore> ListSource for RecommendationSource<S> {
    type Item = ProgramCard;
    type Draft = ();
    type Key = i64;

    async fn fetch(&self) -> Result<Vec<ProgramCard>> {
        let body = self
            .client
            .get("/api/tour-program", &self.list_params(), Auth::Optional)
            .await?;
        let cards = parse_items(unwrap_list(&body), |_, value| ProgramCard::from_value(value));
        tracing::debug!(count = cards.len(), "enriching recommendation candidates");

        let cards =
            enrich_wishlist_counts(&self.client, cards, self.client.config().detail_timeout).await;
        Ok(rank_by_wishlist(cards, RECOMMENDATION_DISPLAY_COUNT))
    }

    async fn create(&self, _draft: &()) -> Result<()> {
        Err(Error::Unsupported("recommendations are read-only"))
    }

    async fn delete(&self, _key: &i64) -> Result<()> {
        Err(Error::Unsupported("recommendations are read-only"))
    }

    fn load_failure_message(&self) -> &'static str {
        RECOMMENDATION_LOAD_FAILURE
    }
}
