use chrono::{NaiveDate, Utc};
use travellocal_core::models::ReservationDraft;
use travellocal_core::programs::ProgramService;

use crate::commands::common::{build_client, print_json};
use crate::error::CliError;

const DETAIL_FAILURE: &str = "투어 정보를 불러오는데 실패했습니다.";

pub async fn run_reserve(program_id: i64, date: NaiveDate, people: u32) -> Result<(), CliError> {
    let service = ProgramService::new(build_client()?);
    let view = service
        .detail(program_id)
        .await
        .map_err(|error| CliError::from_core(error, DETAIL_FAILURE))?;
    let user = service
        .current_user()
        .await
        .map_err(|error| CliError::from_core(error, DETAIL_FAILURE))?;

    let draft =
        ReservationDraft::build(&view.detail, Some(user.user_id), date, people, Utc::now())?;
    tracing::info!(program_id, total_price = draft.total_price, "reservation prepared");
    print_json(&draft)
}
