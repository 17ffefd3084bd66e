use travellocal_core::config::SCHEDULE_UNLOCK_COST;
use travellocal_core::programs::{ProgramService, UnlockOutcome};

use crate::commands::common::{build_client, format_program_view_lines, print_json, TerminalConfirm};
use crate::error::CliError;

const DETAIL_FAILURE: &str = "투어 정보를 불러오는데 실패했습니다.";
const UNLOCK_FAILURE: &str = "결제 처리 중 문제가 발생했습니다.";

pub async fn run_program_show(program_id: i64, as_json: bool) -> Result<(), CliError> {
    let service = ProgramService::new(build_client()?);
    let view = service
        .detail(program_id)
        .await
        .map_err(|error| CliError::from_core(error, DETAIL_FAILURE))?;

    if as_json {
        return print_json(&view);
    }
    for line in format_program_view_lines(&view, program_id) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_program_unlock(program_id: i64, assume_yes: bool) -> Result<(), CliError> {
    let service = ProgramService::new(build_client()?);
    let outcome = service
        .unlock_with_points(
            program_id,
            SCHEDULE_UNLOCK_COST,
            &TerminalConfirm { assume_yes },
        )
        .await
        .map_err(|error| CliError::from_core(error, UNLOCK_FAILURE))?;

    match outcome {
        UnlockOutcome::Unlocked { balance_before } => {
            println!(
                "Itinerary unlocked for program {program_id}. Points: {balance_before} -> {}",
                balance_before - SCHEDULE_UNLOCK_COST
            );
        }
        UnlockOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}
