use worklog_core::sync::SyncOutcome;

use crate::commands::common::{describe_sync, format_report, Context};
use crate::error::CliError;

pub async fn run_sync(context: &Context) -> Result<(), CliError> {
    if !context.remote()?.is_configured() {
        return Err(CliError::ApiNotConfigured);
    }

    let service = context.open_service().await?;
    match service.sync_now().await? {
        SyncOutcome::Offline => println!("offline, nothing sent"),
        SyncOutcome::Completed(report) => println!("{}", format_report(&report)),
        outcome => println!("{}", describe_sync(Some(&outcome))),
    }

    let remaining = service.queue().len().await?;
    if remaining > 0 {
        println!("{remaining} queued changes remain");
    }
    Ok(())
}
