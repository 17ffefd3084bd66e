use travellocal_core::recommend::RecommendationSource;
use travellocal_core::sort::ProgramSort;
use travellocal_core::sync::ListSync;

use crate::auth::KeyringCredentialStore;
use crate::commands::common::{
    build_client, format_program_card_lines, load_list, print_json, Client,
};
use crate::error::CliError;

/// Filters given on the command line. Empty filters keep the source defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendFilters {
    pub hashtags: Vec<String>,
    pub regions: Vec<String>,
    pub sort: Option<ProgramSort>,
}

impl RecommendFilters {
    pub const fn new(
        hashtags: Vec<String>,
        regions: Vec<String>,
        sort: Option<ProgramSort>,
    ) -> Self {
        Self {
            hashtags,
            regions,
            sort,
        }
    }

    pub fn has_custom_filters(&self) -> bool {
        !self.hashtags.is_empty() || !self.regions.is_empty()
    }

    fn apply(self, client: Client) -> RecommendationSource<KeyringCredentialStore> {
        let mut source = RecommendationSource::new(client);
        if self.has_custom_filters() {
            source = source.with_filters(self.hashtags, self.regions);
        }
        if let Some(sort) = self.sort {
            source = source.with_sort(sort);
        }
        source
    }
}

pub async fn run_recommend(filters: RecommendFilters, as_json: bool) -> Result<(), CliError> {
    let sync = ListSync::new(filters.apply(build_client()?));
    let _close = sync.close_on_drop();
    let cards = load_list(&sync).await?;

    if as_json {
        print_json(&cards)?;
    } else if cards.is_empty() {
        println!("No recommendations yet.");
    } else {
        for line in format_program_card_lines(&cards) {
            println!("{line}");
        }
    }

    Ok(())
}
