use worklog_core::actions::StartRequest;

use crate::commands::common::{describe_sync, format_work_log_line, join_description, Context};
use crate::error::CliError;

pub async fn run_start(
    description_parts: &[String],
    tags: &[String],
    context: &Context,
) -> Result<(), CliError> {
    let description = join_description(description_parts).ok_or(CliError::EmptyDescription)?;
    let service = context.open_service().await?;
    let user_id = context.user_id();

    if let Some(active) = service.actions().active_for(&user_id).await? {
        return Err(CliError::AlreadyActive(active.description));
    }

    let outcome = service
        .actions()
        .start(StartRequest {
            user_id,
            description,
            tags: tags.to_vec(),
        })
        .await?;

    println!("Started {}", format_work_log_line(&outcome.active));
    println!("{}", describe_sync(outcome.sync.as_ref()));
    Ok(())
}
