use std::path::{Path, PathBuf};

use logline_core::export::{render_journals_export, suggested_export_file_name};
use logline_core::util::{timestamp_now, unix_timestamp_millis_now};
use logline_core::SessionProvider;

use crate::cli::ExportFormat;
use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    context: &CliContext,
) -> Result<(), CliError> {
    let (store, _subscription) = context.load_journals().await?;
    let user = store
        .session()
        .current_user()
        .map(|user| user.label().to_string());
    let rendered = render_journals_export(
        &store.all_journals(),
        format.into(),
        user.as_deref(),
        &timestamp_now(),
    )?;

    if let Some(path) = output_path {
        let path = export_target(path, format);
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// A directory target gets a generated file name inside it
pub fn export_target(path: &Path, format: ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(
            format.into(),
            unix_timestamp_millis_now(),
        ))
    } else {
        path.to_path_buf()
    }
}
