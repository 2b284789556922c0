//! Config command handler.

use gasledger::config::RegistryConfig;
use gasledger::{Error, Result};

/// Config command.
pub fn cmd_config(config: &RegistryConfig, show: bool) -> Result<()> {
    if !show {
        return Err(Error::InvalidInput(
            "Nothing to do: pass --show to print the configuration".to_string(),
        ));
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Config Files Loaded:");
    if config.config_sources.is_empty() {
        println!("  (none - using defaults)");
    } else {
        for source in &config.config_sources {
            println!("  - {}", source.display());
        }
    }
    println!();

    println!("Data Directory: {}", config.data_dir.display());
    println!("Database: {}", config.db_path().display());
    println!("Session File: {}", config.session_path().display());
    println!("Page Size: {}", config.page_size);
    println!("Search Debounce: {}ms", config.search_debounce_ms);
    println!("Scroll Save Interval: {}ms", config.scroll_save_interval_ms);
    println!();

    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("(default)")
    );
    println!(
        "  File: {}",
        config.logging.file.as_deref().unwrap_or("(stderr)")
    );

    Ok(())
}
