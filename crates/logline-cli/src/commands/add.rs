use std::collections::HashSet;

use logline_core::models::parse_tag_input;
use logline_core::{JournalId, NewJournal};

use crate::commands::common::{resolve_entry_content, wait_for_state, CliContext};
use crate::error::CliError;

pub async fn run_add(
    title: &str,
    tags: Option<&str>,
    content_parts: &[String],
    context: &CliContext,
) -> Result<(), CliError> {
    let content = resolve_entry_content(content_parts)?;
    let title = title.trim();
    if title.is_empty() && content.is_empty() {
        return Err(CliError::EmptyEntry);
    }

    let (store, _subscription) = context.load_journals().await?;
    let existing = store
        .all_journals()
        .into_iter()
        .map(|journal| journal.id)
        .collect::<HashSet<JournalId>>();

    store
        .create_journal(NewJournal {
            title: Some(title.to_string()),
            content: Some(content),
            tags: tags.map(parse_tag_input),
        })
        .await?;

    // The new id is only known once the live query echoes the insert
    wait_for_state(&store, |state| {
        state.all.iter().any(|journal| !existing.contains(&journal.id))
    })
    .await?;
    if let Some(created) = store
        .all_journals()
        .into_iter()
        .find(|journal| !existing.contains(&journal.id))
    {
        println!("{}", created.id);
    }
    Ok(())
}
