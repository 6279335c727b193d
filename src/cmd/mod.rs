//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `auth`          | `Login`, `Logout`, `Whoami`, `Password`            |
//! | `products`      | `Products`                                         |
//! | `categories`    | `Categories`                                       |
//! | `orders`        | `Orders`                                           |
//! | `users`         | `Users`                                            |
//! | `media`         | `Media`                                            |
//! | `config`        | `Config`                                           |

pub mod auth;
pub mod categories;
pub mod config;
pub mod media;
pub mod orders;
pub mod products;
pub mod users;

pub use auth::{cmd_login, cmd_logout, cmd_password, cmd_whoami};
pub use categories::cmd_categories;
pub use config::cmd_config;
pub use media::cmd_media;
pub use orders::cmd_orders;
pub use products::cmd_products;
pub use users::cmd_users;

use anyhow::{Context as _, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::sync::Arc;

use kasi_manager::api::{ApiClient, CollectionSource};
use kasi_manager::errors::{GENERIC_FAILURE_MESSAGE, SubmitError};
use kasi_manager::form::{Draft, FormMode, FormViewModel, ValidationErrors};
use kasi_manager::kasi_config::KasiConfig;
use kasi_manager::list::criteria::{Filter, Sorter};
use kasi_manager::list::{FetchOutcome, ListViewModel};
use kasi_manager::models::Record;
use kasi_manager::mutation::BulkOutcome;
use kasi_manager::session::{FileSessionStore, Session};

use super::FieldArgs;

/// Everything a command needs: effective config and an API client bound to
/// the restored session.
pub struct Context {
    pub config: KasiConfig,
    pub api: ApiClient,
    pub yes: bool,
}

impl Context {
    pub fn new(config: KasiConfig, yes: bool) -> Result<Self> {
        let session = match config.session_path() {
            Some(path) => Session::restore(Arc::new(FileSessionStore::new(path))),
            None => {
                tracing::warn!("No config directory available; the session will not be persisted");
                Session::in_memory()
            }
        };
        let api = ApiClient::from_config(config.api(), session)?;
        Ok(Self { config, api, yes })
    }

    /// Fail fast, before any network call, when nobody is signed in.
    pub fn require_session(&self) -> Result<()> {
        if !self.api.session().is_authenticated() {
            bail!("Not signed in. Run 'kasi login' first.");
        }
        Ok(())
    }

    /// Ask before a destructive action. `--yes` skips the prompt; a
    /// non-interactive run without it refuses.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        if !console::user_attended() {
            bail!("{} Re-run with --yes to confirm.", prompt);
        }
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }

    pub fn image_url(&self, url: &str) -> String {
        kasi_manager::util::format_image_url(&self.config.api().file_server_base_url, url)
    }
}

/// Fetch `page` of a list, clamped to the pages the server reports.
///
/// Page 1 is always fetched first so the total is known before a later page
/// is requested.
pub async fn fetch_list<T, F, S, C>(
    list: &mut ListViewModel<T, F, S>,
    source: &C,
    page: u32,
) -> Result<()>
where
    T: Record,
    F: Filter<T> + Default,
    S: Sorter<T>,
    C: CollectionSource<T> + ?Sized,
{
    let mut outcome = list.load(source).await;
    if outcome == FetchOutcome::Applied && page > 1 {
        outcome = list.set_page(page, source).await;
    }
    match outcome {
        FetchOutcome::Applied => Ok(()),
        FetchOutcome::Failed => bail!("{}", list.error().unwrap_or(GENERIC_FAILURE_MESSAGE)),
        FetchOutcome::Stale => bail!("The list was closed before the page arrived"),
    }
}

pub fn print_list_footer<T, F, S>(list: &ListViewModel<T, F, S>, shown: usize)
where
    T: Record,
    F: Filter<T> + Default,
    S: Sorter<T>,
{
    println!();
    println!(
        "{}",
        console::style(format!(
            "Page {}/{} · {} shown · {} total",
            list.page(),
            list.total_pages(),
            shown,
            list.total()
        ))
        .dim()
    );
    println!();
}

/// Apply every `--set path=value` to the form draft.
pub fn apply_fields<D: Draft>(form: &mut FormViewModel<D>, fields: &FieldArgs) -> Result<()> {
    for assignment in &fields.set {
        let Some((path, value)) = assignment.split_once('=') else {
            bail!("Invalid --set '{}': expected PATH=VALUE", assignment);
        };
        form.set_field(path, value)
            .with_context(|| format!("Invalid --set '{}'", assignment))?;
    }
    Ok(())
}

fn print_validation_errors(errors: &ValidationErrors) {
    println!();
    println!("{}", console::style("Please fix the following:").red().bold());
    for (field, message) in errors.iter() {
        println!("  {} {}", console::style(format!("{}:", field)).yellow(), message);
    }
    println!();
}

/// Run a form submission and turn its failure modes into CLI errors.
pub async fn submit_form<D, T, F, Fut>(form: &mut FormViewModel<D>, send: F) -> Result<T>
where
    D: Draft,
    F: FnOnce(FormMode, D::Payload) -> Fut,
    Fut: Future<Output = Result<T, kasi_manager::errors::ApiError>>,
{
    match form.submit(send).await {
        Ok(value) => Ok(value),
        Err(SubmitError::Invalid(errors)) => {
            print_validation_errors(&errors);
            bail!("Validation failed ({} field(s))", errors.len())
        }
        Err(SubmitError::Busy) => bail!("A submission is already in progress"),
        Err(SubmitError::Api(e)) => bail!("{}", e.user_message()),
    }
}

/// Print a per-item report of a bulk delete. Fails when anything failed.
pub fn report_bulk(outcome: &BulkOutcome, noun: &str) -> Result<()> {
    for id in &outcome.succeeded {
        println!("  {} {}", console::style("deleted").green(), id);
    }
    for (id, e) in &outcome.failed {
        println!("  {} {}: {}", console::style("failed").red(), id, e.user_message());
    }
    println!();
    if outcome.is_complete_success() {
        println!("Deleted {} {}.", outcome.succeeded.len(), noun);
        Ok(())
    } else {
        bail!(
            "{} of {} {} could not be deleted",
            outcome.failed.len(),
            outcome.failed.len() + outcome.succeeded.len(),
            noun
        )
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// Date part of an RFC 3339 timestamp.
pub fn short_date(value: Option<&str>) -> String {
    value
        .and_then(|v| chrono::DateTime::parse_from_rfc3339(v).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Cut `value` to `width` characters for table cells.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
