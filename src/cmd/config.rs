//! Configuration view and validation commands: `kasi config`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use kasi_manager::kasi_config::{CONFIG_FILE, KasiConfig, KasiToml, PROJECT_DIR};

use super::super::ConfigCommands;

pub fn cmd_config(
    config: &KasiConfig,
    explicit: Option<&Path>,
    command: Option<ConfigCommands>,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Kasi Configuration");
            println!("==================");
            println!();

            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No kasi.toml found. Searched:");
                    for path in KasiConfig::search_paths() {
                        println!("  - {}", path.display());
                    }
                }
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            println!();

            let api = config.api();
            println!("[api]");
            println!("  base_url = \"{}\"", api.base_url);
            println!("  file_server_base_url = \"{}\"", api.file_server_base_url);
            match &api.upload_url {
                Some(url) => println!("  upload_url = \"{}\"", url),
                None => println!(
                    "  upload_url = \"{}/file-management/upload\" {}",
                    api.base_url.trim_end_matches('/'),
                    console::style("(default)").dim()
                ),
            }
            match api.timeout_secs {
                Some(secs) => println!("  timeout_secs = {}", secs),
                None => println!("  timeout_secs = {}", console::style("none").dim()),
            }
            println!();

            println!("[lists]");
            println!("  page_size = {}", config.toml.lists.page_size);
            println!("  category_page_size = {}", config.toml.lists.category_page_size);
            println!();

            println!("[session]");
            match config.session_path() {
                Some(path) => println!("  path = \"{}\"", path.display()),
                None => println!("  path = {}", console::style("(not persisted)").dim()),
            }
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", config.log_level());
            println!("  format = \"{}\"", config.log_format());
            println!();

            if config.source.is_none() {
                println!("Run 'kasi config init' to create a kasi.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                match &config.source {
                    Some(_) => println!("Configuration is valid."),
                    None => println!("No kasi.toml found. Using defaults (valid)."),
                }
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", console::style(warning).yellow());
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let config_path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(PROJECT_DIR).join(CONFIG_FILE));
            if config_path.exists() {
                println!("kasi.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            KasiToml::default().save(&config_path)?;

            println!("Created kasi.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, file_server_base_url, upload_url, timeout_secs");
            println!("  - [lists] page_size, category_page_size");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
