//! Media library commands: `kasi media ...`.

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use kasi_manager::api::{FilesClient, UploadFile, UploadOptions};
use kasi_manager::list::ListViewModel;
use kasi_manager::models::FileRecord;
use kasi_manager::models::media::{MediaFilter, MediaSort};
use kasi_manager::mutation::BulkOutcome;

use super::super::MediaCommands;
use super::{Context, fetch_list, or_dash, print_list_footer, report_bulk, short_date, truncate};

pub async fn cmd_media(ctx: &Context, command: MediaCommands) -> Result<()> {
    if let MediaCommands::Url { url } = &command {
        println!("{}", ctx.image_url(url));
        return Ok(());
    }

    ctx.require_session()?;
    let files = FilesClient::new(ctx.api.clone());

    match command {
        MediaCommands::List {
            list: args,
            category,
            sort,
        } => {
            let mut list: ListViewModel<FileRecord, MediaFilter, MediaSort> =
                ListViewModel::new(ctx.config.page_size());
            list.set_filter(MediaFilter {
                search: args.search.unwrap_or_default(),
                category,
            });
            list.set_sort(Some(sort.unwrap_or_default()));
            fetch_list(&mut list, &files, args.page).await?;

            println!();
            println!(
                "{:<26} {:<32} {:<12} {:>10}  {:<10} URL",
                "ID", "Name", "Category", "Size", "Uploaded"
            );
            println!(
                "{:<26} {:<32} {:<12} {:>10}  {:<10} ---",
                "-".repeat(26),
                "-".repeat(32),
                "-".repeat(12),
                "-".repeat(10),
                "-".repeat(10)
            );
            let mut shown = 0;
            for file in list.visible_items() {
                shown += 1;
                let visibility = if file.is_public {
                    String::new()
                } else {
                    console::style(" (private)").dim().to_string()
                };
                println!(
                    "{:<26} {:<32} {:<12} {:>10}  {:<10} {}{}",
                    or_dash(file.id.as_deref()),
                    truncate(file.display_name(), 32),
                    truncate(&file.category, 12),
                    format_size(file.size),
                    short_date(file.created_at.as_deref()),
                    ctx.image_url(&file.url),
                    visibility
                );
            }
            print_list_footer(&list, shown);
        }
        MediaCommands::Upload {
            paths,
            name,
            private,
        } => {
            if name.is_some() && paths.len() > 1 {
                bail!("--name can only be used when uploading a single file");
            }
            let options = UploadOptions {
                custom_filename: name,
                is_public: !private,
            };
            upload_all(ctx, &files, &paths, &options).await?;
        }
        MediaCommands::Delete { ids } => {
            let prompt = format!("Delete {} file(s) from the media library?", ids.len());
            if !ctx.confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            let mut outcome = BulkOutcome::default();
            for (id, result) in files.remove_many(&ids).await {
                match result {
                    Ok(()) => outcome.succeeded.push(id),
                    Err(e) => outcome.failed.push((id, e)),
                }
            }
            report_bulk(&outcome, "file(s)")?;
        }
        MediaCommands::Url { .. } => {}
    }

    Ok(())
}

async fn upload_all(
    ctx: &Context,
    files: &FilesClient,
    paths: &[PathBuf],
    options: &UploadOptions,
) -> Result<()> {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let mut failures = 0;
    for path in paths {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style.clone());
        spinner.set_message(format!("Uploading {}", path.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = match UploadFile::from_path(path) {
            Ok(file) => files
                .upload(file, options)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message())),
            Err(e) => Err(e),
        };
        spinner.finish_and_clear();

        match result {
            Ok(record) if record.synthesized => println!(
                "  {} {} {}",
                console::style("uploaded").green(),
                record.display_name(),
                console::style("(server sent no record; refresh the list to see it)").dim()
            ),
            Ok(record) => println!(
                "  {} {} → {}",
                console::style("uploaded").green(),
                record.display_name(),
                ctx.image_url(&record.url)
            ),
            Err(e) => {
                failures += 1;
                println!("  {} {}: {:#}", console::style("failed").red(), path.display(), e);
            }
        }
    }

    println!();
    if failures > 0 {
        bail!("{} of {} upload(s) failed", failures, paths.len());
    }
    println!("Uploaded {} file(s).", paths.len());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
