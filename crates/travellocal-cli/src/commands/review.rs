use travellocal_core::programs::ProgramService;
use travellocal_core::reviews::{PlaceReviewSource, TourReviewSource};
use travellocal_core::sort::ReviewSort;
use travellocal_core::sync::{DeleteOutcome, ListSource, ListState, ListSync, Phase};
use travellocal_core::{Review, ReviewDraft};

use crate::cli::{ReviewAddTarget, ReviewDeleteTarget, ReviewInput};
use crate::commands::common::{build_client, load_list, Client, TerminalConfirm};
use crate::error::CliError;

const CREATE_FAILURE: &str = "등록에 실패했습니다.";
const DELETE_FAILURE: &str = "삭제에 실패했습니다.";

pub async fn run_review_add(target: ReviewAddTarget) -> Result<(), CliError> {
    let client = signed_in_client()?;
    match target {
        ReviewAddTarget::Tour { program_id, input } => {
            let sync = ListSync::new(TourReviewSource::new(
                client,
                program_id,
                ReviewSort::default(),
            ));
            submit(&sync, input).await
        }
        ReviewAddTarget::Place { place_id, input } => {
            // Place reviews carry the author's display name.
            if let Err(error) = ProgramService::new(client.clone()).current_user().await {
                tracing::warn!(%error, "could not load current user; posting with fallback name");
            }
            let sync = ListSync::new(PlaceReviewSource::new(
                client,
                place_id,
                ReviewSort::default(),
            ));
            submit(&sync, input).await
        }
    }
}

pub async fn run_review_delete(target: ReviewDeleteTarget) -> Result<(), CliError> {
    let client = signed_in_client()?;
    let current_user_id = client.session().current_user_id()?;
    match target {
        ReviewDeleteTarget::Tour {
            program_id,
            review_id,
            yes,
        } => {
            let sync = ListSync::new(TourReviewSource::new(
                client,
                program_id,
                ReviewSort::default(),
            ));
            remove(&sync, review_id, current_user_id.as_deref(), yes).await
        }
        ReviewDeleteTarget::Place {
            place_id,
            review_id,
            yes,
        } => {
            let sync = ListSync::new(PlaceReviewSource::new(
                client,
                place_id,
                ReviewSort::default(),
            ));
            remove(&sync, review_id, current_user_id.as_deref(), yes).await
        }
    }
}

fn signed_in_client() -> Result<Client, CliError> {
    let client = build_client()?;
    if !client.session().is_signed_in()? {
        return Err(CliError::LoginRequired);
    }
    Ok(client)
}

async fn submit<S>(sync: &ListSync<S>, input: ReviewInput) -> Result<(), CliError>
where
    S: ListSource<Item = Review, Draft = ReviewDraft>,
{
    let draft = ReviewDraft::new(input.rating, input.content, input.image_url);
    sync.create(&draft)
        .await
        .map_err(|error| CliError::from_core(error, CREATE_FAILURE))?;
    println!("{}", submitted_message(&sync.state()));
    Ok(())
}

/// Confirmation after a create, noting when the list could not be reloaded.
pub fn submitted_message(state: &ListState<Review>) -> String {
    match (&state.phase, &state.error) {
        (Phase::Error, Some(message)) => {
            format!("Review submitted, but the list could not be reloaded: {message}")
        }
        _ => format!("Review submitted. {} reviews listed.", state.items.len()),
    }
}

async fn remove<S>(
    sync: &ListSync<S>,
    review_id: i64,
    current_user_id: Option<&str>,
    assume_yes: bool,
) -> Result<(), CliError>
where
    S: ListSource<Item = Review, Key = i64>,
{
    let reviews = load_list(sync).await?;
    ensure_deletable(&reviews, review_id, current_user_id)?;

    let outcome = sync
        .delete(&review_id, &TerminalConfirm { assume_yes })
        .await
        .map_err(|error| CliError::from_core(error, DELETE_FAILURE))?;
    match outcome {
        DeleteOutcome::Deleted => println!("Review {review_id} deleted."),
        DeleteOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}

/// Reviews on the first page must belong to the current user. Reviews not
/// listed are left for the server to check.
pub fn ensure_deletable(
    reviews: &[Review],
    review_id: i64,
    current_user_id: Option<&str>,
) -> Result<(), CliError> {
    match reviews.iter().find(|review| review.id == review_id) {
        Some(review) if !review.is_owned_by(current_user_id) => {
            Err(CliError::NotReviewOwner(review_id))
        }
        _ => Ok(()),
    }
}
