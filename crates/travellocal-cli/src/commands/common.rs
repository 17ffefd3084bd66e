use std::io::{self, BufRead, IsTerminal, Write};

use serde::Serialize;
use travellocal_core::models::{render_stars, RatingStats};
use travellocal_core::programs::ProgramView;
use travellocal_core::sync::{Confirm, ListSource, ListSync};
use travellocal_core::{ApiClient, ClientConfig, ProgramCard, ProgramDetail, Review};

use crate::auth::{keychain_session, KeyringCredentialStore};
use crate::error::CliError;

pub type Client = ApiClient<KeyringCredentialStore>;

pub fn build_client() -> Result<Client, CliError> {
    Ok(ApiClient::new(ClientConfig::default(), keychain_session())?)
}

/// Yes/no prompt on the terminal. `--yes` answers for the user.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            eprintln!("{prompt} (pass --yes to confirm non-interactively)");
            return false;
        }
        eprint!("{prompt} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Refreshes `sync` once and hands back its items, or the message the list
/// screen would have shown.
pub async fn load_list<S: ListSource>(sync: &ListSync<S>) -> Result<Vec<S::Item>, CliError> {
    if let Err(error) = sync.refresh().await {
        if error.is_auth_required() {
            return Err(CliError::LoginRequired);
        }
        return Err(match sync.state().error {
            Some(message) => CliError::Remote(message),
            None => CliError::from_core(error, sync.source().load_failure_message()),
        });
    }
    Ok(sync.state().items)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_program_card_lines(cards: &[ProgramCard]) -> Vec<String> {
    cards
        .iter()
        .enumerate()
        .map(|(rank, card)| {
            let region = if card.region.is_empty() {
                String::new()
            } else {
                format!(" [{}]", card.region)
            };
            format!(
                "{}. #{} {}{} ♥ {}",
                rank + 1,
                card.id,
                card.title,
                region,
                card.wishlist_count
            )
        })
        .collect()
}

pub fn format_review_lines(reviews: &[Review], current_user_id: Option<&str>) -> Vec<String> {
    reviews
        .iter()
        .map(|review| {
            let mut line = format!(
                "#{} {} {} ({:.1})",
                review.id,
                render_stars(review.rating),
                review.name,
                review.rating
            );
            if review.verification_badge {
                line.push_str(" ✔");
            }
            if review.is_owned_by(current_user_id) {
                line.push_str(" (mine)");
            }
            line.push_str("\n    ");
            line.push_str(&review.content);
            for url in &review.image_urls {
                line.push_str("\n    ");
                line.push_str(url);
            }
            line
        })
        .collect()
}

pub fn format_rating_stats_lines(stats: &RatingStats) -> Vec<String> {
    let mut lines = vec![format!(
        "{:.1} {} ({} reviews)",
        stats.average,
        render_stars(stats.average),
        stats.total
    )];
    lines.extend(stats.distribution.iter().map(|entry| {
        format!(
            "  {} {:>3} ({:.0}%)",
            entry.score,
            entry.count,
            stats.percent(entry.count)
        )
    }));
    lines
}

pub fn format_program_header(detail: &ProgramDetail) -> String {
    if detail.region.is_empty() {
        detail.title.clone()
    } else {
        format!("{} [{}]", detail.title, detail.region)
    }
}

pub fn format_program_view_lines(view: &ProgramView, program_id: i64) -> Vec<String> {
    let detail = &view.detail;
    let mut lines = vec![format_program_header(detail)];
    if let Some(description) = &detail.description {
        lines.push(description.clone());
    }
    if !detail.hashtags.is_empty() {
        let tags: Vec<String> = detail.hashtags.iter().map(|tag| format!("#{tag}")).collect();
        lines.push(tags.join(" "));
    }
    lines.push(format!(
        "reviews {} · wishlist {} · guide price {}",
        detail.review_count, detail.wishlist_count, detail.guide_price
    ));

    for (day, stops) in detail.schedules_by_day() {
        if view.schedule_masked() {
            lines.push(format!("Day {day}: {} stops (locked)", stops.len()));
            continue;
        }
        lines.push(format!("Day {day}"));
        for stop in stops {
            match &stop.place_description {
                Some(description) => {
                    lines.push(format!("  - {}: {description}", stop.place_name));
                }
                None => lines.push(format!("  - {}", stop.place_name)),
            }
        }
    }
    if view.schedule_masked() && !detail.schedules.is_empty() {
        lines.push(format!(
            "Unlock the full itinerary with `travellocal program unlock {program_id}`."
        ));
    }
    lines
}
