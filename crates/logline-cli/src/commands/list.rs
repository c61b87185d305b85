use logline_core::store::FilterState;

use crate::commands::common::{
    format_journal_lines, journal_to_list_item, CliContext, CliJournalStore, JournalListItem,
};
use crate::error::CliError;

pub async fn run_list(
    search: Option<&str>,
    tag: Option<&str>,
    as_json: bool,
    context: &CliContext,
) -> Result<(), CliError> {
    let (store, _subscription) = context.load_journals().await?;
    apply_filters(&store, search, tag);
    let journals = store.journals();

    if as_json {
        let json_items = journals
            .iter()
            .map(journal_to_list_item)
            .collect::<Vec<JournalListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if journals.is_empty() {
        println!("{}", empty_list_message(&store.snapshot().filters));
    } else {
        for line in format_journal_lines(&journals) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn apply_filters(store: &CliJournalStore, search: Option<&str>, tag: Option<&str>) {
    if let Some(query) = search {
        store.search_journals(query);
    }
    if let Some(tag) = tag {
        store.filter_by_tag(tag.trim());
    }
}

pub fn empty_list_message(filters: &FilterState) -> &'static str {
    if filters.is_active() {
        "No journals match the current filters."
    } else {
        "No journals found."
    }
}
