use worklog_core::actions::SwitchRequest;

use crate::commands::common::{
    describe_sync, format_duration, format_work_log_line, join_description, Context,
};
use crate::error::CliError;

pub async fn run_switch(
    description_parts: &[String],
    tags: &[String],
    context: &Context,
) -> Result<(), CliError> {
    let description = join_description(description_parts).ok_or(CliError::EmptyDescription)?;
    let service = context.open_service().await?;
    let user_id = context.user_id();
    let current = service.actions().active_for(&user_id).await?;

    let outcome = service
        .actions()
        .switch(SwitchRequest {
            current,
            user_id,
            description,
            tags: tags.to_vec(),
        })
        .await?;

    println!(
        "Stopped {} after {}",
        format_work_log_line(&outcome.closed),
        format_duration(outcome.duration_secs)
    );
    println!("Started {}", format_work_log_line(&outcome.active));
    println!("{}", describe_sync(outcome.sync.as_ref()));
    Ok(())
}
