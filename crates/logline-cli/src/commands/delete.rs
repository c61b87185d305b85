use crate::commands::common::{normalize_journal_identifier, resolve_journal, CliContext};
use crate::error::CliError;

pub async fn run_delete(id: &str, context: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_journal_identifier(id)?;
    let (store, _subscription) = context.load_journals().await?;
    let journal = resolve_journal(&normalized_id, &store.all_journals())?;

    store.delete_journal(&journal.id).await?;
    println!("{}", journal.id);
    Ok(())
}
