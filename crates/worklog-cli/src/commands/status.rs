use crate::commands::common::{format_status_lines, now_ms, status_to_item, Context};
use crate::error::CliError;

pub async fn run_status(as_json: bool, context: &Context) -> Result<(), CliError> {
    let service = context.open_service().await?;
    let summary = service.status(&context.user_id()).await?;
    let now = now_ms();

    if as_json {
        let item = status_to_item(&summary, now);
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        for line in format_status_lines(&summary, now) {
            println!("{line}");
        }
    }

    Ok(())
}
