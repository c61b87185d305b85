use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_tags(context: &CliContext) -> Result<(), CliError> {
    let (store, _subscription) = context.load_journals().await?;
    for tag in store.all_tags() {
        println!("{tag}");
    }
    Ok(())
}
