use crate::commands::common::{
    format_queue_lines, queue_item_to_list_item, Context, QueueListItem,
};
use crate::error::CliError;

pub async fn run_queue(as_json: bool, context: &Context) -> Result<(), CliError> {
    let service = context.open_service().await?;
    let items = service.pending_items().await?;

    if as_json {
        let json_items = items
            .iter()
            .map(queue_item_to_list_item)
            .collect::<Vec<QueueListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    for line in format_queue_lines(&items) {
        println!("{line}");
    }
    Ok(())
}
