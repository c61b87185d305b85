use std::sync::Arc;

use chrono::Local;
use logline_core::JournalEntry;

use crate::commands::common::{format_journal_lines, CliContext};
use crate::commands::list::apply_filters;
use crate::error::CliError;

pub async fn run_watch(
    search: Option<&str>,
    tag: Option<&str>,
    context: &CliContext,
) -> Result<(), CliError> {
    let store = Arc::new(context.open_store().await?);
    if store.session().state().user().is_none() {
        return Err(CliError::NotSignedIn);
    }
    apply_filters(&store, search, tag);

    let binding = store.follow_session()?;
    let poller = store
        .document_store()
        .spawn_change_poller(context.config.poll_interval());
    tracing::info!("Watching {}; press Ctrl-C to stop", context.db_path.display());

    let mut rx = store.watch();
    let mut last_rendered: Option<Vec<JournalEntry>> = None;
    loop {
        let state = rx.borrow_and_update().clone();
        if state.loaded && last_rendered.as_ref() != Some(&state.filtered) {
            print_frame(&state.filtered);
            last_rendered = Some(state.filtered);
        }

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    poller.abort();
    binding.stop();
    Ok(())
}

fn print_frame(journals: &[JournalEntry]) {
    println!(
        "--- {} journal(s) at {} ---",
        journals.len(),
        Local::now().format("%H:%M:%S")
    );
    for line in format_journal_lines(journals) {
        println!("{line}");
    }
}
