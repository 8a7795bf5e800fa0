use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_purge(context: &Context) -> Result<(), CliError> {
    let service = context.open_service().await?;
    let purged = service.actions().purge_synced().await?;

    if purged == 1 {
        println!("Purged 1 synced work log");
    } else {
        println!("Purged {purged} synced work logs");
    }
    Ok(())
}
