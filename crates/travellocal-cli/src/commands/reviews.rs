use serde::Serialize;
use travellocal_core::models::RatingStats;
use travellocal_core::programs::ProgramService;
use travellocal_core::reviews::{PlaceReviewSource, TourReviewSource};
use travellocal_core::sort::ReviewSort;
use travellocal_core::sync::ListSync;
use travellocal_core::Review;

use crate::commands::common::{
    build_client, format_program_header, format_rating_stats_lines, format_review_lines,
    load_list, print_json,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct PlaceReviewsOutput<'a> {
    stats: &'a RatingStats,
    reviews: &'a [Review],
}

pub async fn run_tour_reviews(
    program_id: i64,
    sort: ReviewSort,
    as_json: bool,
) -> Result<(), CliError> {
    let client = build_client()?;
    let current_user_id = client.session().current_user_id()?;
    let programs = ProgramService::new(client.clone());
    let sync = ListSync::new(TourReviewSource::new(client, program_id, sort));
    let _close = sync.close_on_drop();
    let (program, reviews) = tokio::join!(programs.summary(program_id), load_list(&sync));
    let reviews = reviews?;

    if as_json {
        return print_json(&reviews);
    }
    match program {
        Ok(program) => {
            println!("{}", format_program_header(&program));
            println!();
        }
        Err(error) => tracing::warn!(program_id, %error, "program header unavailable"),
    }
    print_reviews(&reviews, current_user_id.as_deref());
    Ok(())
}

pub async fn run_place_reviews(
    place_id: &str,
    sort: ReviewSort,
    as_json: bool,
) -> Result<(), CliError> {
    let client = build_client()?;
    let current_user_id = client.session().current_user_id()?;
    let sync = ListSync::new(PlaceReviewSource::new(client, place_id, sort));
    let _close = sync.close_on_drop();
    let reviews = load_list(&sync).await?;
    let stats = RatingStats::from_reviews(&reviews);

    if as_json {
        return print_json(&PlaceReviewsOutput {
            stats: &stats,
            reviews: &reviews,
        });
    }
    for line in format_rating_stats_lines(&stats) {
        println!("{line}");
    }
    println!();
    print_reviews(&reviews, current_user_id.as_deref());
    Ok(())
}

fn print_reviews(reviews: &[Review], current_user_id: Option<&str>) {
    if reviews.is_empty() {
        println!("No reviews yet.");
        return;
    }
    for line in format_review_lines(reviews, current_user_id) {
        println!("{line}");
    }
}
