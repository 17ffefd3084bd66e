//! Sort vocabulary shared with the backend.

use serde::Serialize;

/// Review list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReviewSort {
    #[default]
    Latest,
    HighestRating,
    LowestRating,
}

impl ReviewSort {
    pub const fn as_server_str(self) -> &'static str {
        match self {
            Self::Latest => "addedDesc",
            Self::HighestRating => "ratingDesc",
            Self::LowestRating => "ratingAsc",
        }
    }
}

/// Program list ordering accepted by `GET /api/tour-program`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgramSort {
    AddedAsc,
    AddedDesc,
    PriceAsc,
    PriceDesc,
    ReviewDesc,
    WishlistDesc,
}

impl ProgramSort {
    pub const fn as_server_str(self) -> &'static str {
        match self {
            Self::AddedAsc => "addedAsc",
            Self::AddedDesc => "addedDesc",
            Self::PriceAsc => "priceAsc",
            Self::PriceDesc => "priceDesc",
            Self::ReviewDesc => "reviewDesc",
            Self::WishlistDesc => "wishlistDesc",
        }
    }
}

/// Stable sort, largest key first. Ties keep their incoming order.
pub fn sort_desc_by_key<T, K: Ord>(items: &mut [T], mut key: impl FnMut(&T) -> K) {
    items.sort_by(|left, right| key(right).cmp(&key(left)));
}
