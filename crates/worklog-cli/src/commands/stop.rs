use worklog_core::actions::StopRequest;

use crate::commands::common::{
    describe_sync, format_duration, format_work_log_line, join_description, Context,
};
use crate::error::CliError;

pub async fn run_stop(
    description_parts: &[String],
    tags: &[String],
    context: &Context,
) -> Result<(), CliError> {
    let service = context.open_service().await?;
    let current = service.actions().active_for(&context.user_id()).await?;

    let outcome = service
        .actions()
        .stop(StopRequest {
            current,
            description: join_description(description_parts),
            tags: (!tags.is_empty()).then(|| tags.to_vec()),
        })
        .await?;

    println!(
        "Stopped {} after {}",
        format_work_log_line(&outcome.closed),
        format_duration(outcome.duration_secs)
    );
    println!("{}", describe_sync(outcome.sync.as_ref()));
    Ok(())
}
