use logline_core::models::parse_tag_input;
use logline_core::JournalPatch;

use crate::commands::common::{normalize_journal_identifier, resolve_journal, CliContext};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    tags: Option<&str>,
    context: &CliContext,
) -> Result<(), CliError> {
    if title.is_none() && content.is_none() && tags.is_none() {
        return Err(CliError::NothingToEdit);
    }

    let normalized_id = normalize_journal_identifier(id)?;
    let (store, _subscription) = context.load_journals().await?;
    let journal = resolve_journal(&normalized_id, &store.all_journals())?;

    store
        .update_journal(
            &journal.id,
            JournalPatch {
                title,
                content,
                tags: tags.map(parse_tag_input),
            },
        )
        .await?;

    println!("{}", journal.id);
    Ok(())
}
