//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `clients.rs`: Record commands (add, update, delete, get, list, count)
//! - `search.rs`: Search and facet commands
//! - `browse.rs`: Resumable browsing and session slots
//! - `io.rs`: Import, export and template
//! - `config.rs`: Configuration display command

mod browse;
mod clients;
mod config;
mod io;
mod search;

use clap::{Args, Subcommand};
use gasledger::io::Column;
use gasledger::models::{ClientRecord, Page, SearchCriteria, StatusFlags};
use gasledger::{Error, Result};

pub use browse::{cmd_browse, cmd_session};
pub use clients::{cmd_add, cmd_count, cmd_delete, cmd_get, cmd_list, cmd_update};
pub use config::cmd_config;
pub use io::{cmd_export, cmd_import, cmd_template};
pub use search::{cmd_facets, cmd_search, cmd_search_interactive};

/// Browse subcommands.
#[derive(Subcommand)]
pub enum BrowseAction {
    /// Start browsing, reusing the saved window if the filters match.
    Start {
        /// Filters for the browse window.
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Load the next page into the saved window.
    More,
    /// Record the scroll position of the saved window.
    Scroll {
        /// Scroll offset in pixels.
        offset: f64,
    },
    /// Show the saved window and its scroll position.
    Restore,
}

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionAction {
    /// Remove every saved session slot.
    Clear,
}

/// Search filters shared by `search`, `export` and `browse start`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search over name, account, street, phone and meter number.
    #[arg(short = 'q', long = "text")]
    pub text: Option<String>,

    /// Settlement (repeatable, OR within the list).
    #[arg(long = "settlement")]
    pub settlements: Vec<String>,

    /// Street as "<type> <name>" (repeatable).
    #[arg(long = "street")]
    pub streets: Vec<String>,

    /// Meter brand (repeatable).
    #[arg(long = "brand")]
    pub meter_brands: Vec<String>,

    /// Meter size (repeatable).
    #[arg(long = "size")]
    pub meter_sizes: Vec<String>,

    /// Meter year (repeatable).
    #[arg(long = "year")]
    pub meter_years: Vec<String>,

    /// Meter group (repeatable).
    #[arg(long = "group")]
    pub meter_groups: Vec<String>,

    /// Only clients with gas disconnected.
    #[arg(long)]
    pub disconnected: bool,

    /// Only dacha clients.
    #[arg(long)]
    pub dacha: bool,

    /// Only temporarily absent clients.
    #[arg(long)]
    pub absent: bool,
}

impl FilterArgs {
    /// Converts the flags into search criteria.
    pub fn to_criteria(&self) -> SearchCriteria {
        let mut criteria = SearchCriteria::new().with_status(StatusFlags {
            disconnected: self.disconnected,
            dacha: self.dacha,
            absent: self.absent,
        });
        if let Some(text) = &self.text {
            criteria = criteria.with_text(text.clone());
        }
        criteria.settlements.extend(self.settlements.iter().cloned());
        criteria.streets.extend(self.streets.iter().cloned());
        criteria.meter_brands.extend(self.meter_brands.iter().cloned());
        criteria.meter_sizes.extend(self.meter_sizes.iter().cloned());
        criteria.meter_years.extend(self.meter_years.iter().cloned());
        criteria.meter_groups.extend(self.meter_groups.iter().cloned());
        criteria
    }
}

/// Parses `LABEL=VALUE` field assignments, where `LABEL` is a column label.
pub fn parse_fields(fields: &[String]) -> Result<Vec<(Column, String)>> {
    fields
        .iter()
        .map(|field| {
            let (label, value) = field.split_once('=').ok_or_else(|| {
                Error::InvalidInput(format!("Expected LABEL=VALUE, got '{field}'"))
            })?;
            let column = Column::from_header(label)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown column: '{label}'")))?;
            Ok((column, value.to_string()))
        })
        .collect()
}

/// Applies parsed field assignments to a record.
pub fn apply_fields(record: &mut ClientRecord, fields: &[(Column, String)]) {
    for (column, value) in fields {
        column.assign(record, value);
    }
}

/// One summary line per record.
pub fn summary_line(record: &ClientRecord) -> String {
    let id = record
        .id
        .map_or_else(|| "-".to_string(), |id| id.get().to_string());
    let mut address = record.settlement.clone();
    let street = record.street_name();
    if !street.is_empty() {
        address.push_str(", ");
        address.push_str(&street);
    }
    if !record.building.is_empty() {
        address.push(' ');
        address.push_str(&record.building);
        address.push_str(&record.building_letter);
    }
    if !record.apartment.is_empty() {
        address.push_str(", кв. ");
        address.push_str(&record.apartment);
        address.push_str(&record.apartment_letter);
    }
    format!(
        "{id:>6}  {:<12}  {:<32}  {address}",
        record.account_number, record.full_name
    )
}

/// Prints a page of records with a footer.
pub fn print_page(page: &Page) {
    println!(
        "{:>6}  {:<12}  {:<32}  Адреса",
        "ID",
        Column::AccountNumber.header(),
        Column::FullName.header(),
    );
    for record in &page.items {
        println!("{}", summary_line(record));
    }
    println!();
    println!(
        "Page {} ({} of {} records){}",
        page.page_index + 1,
        page.items.len(),
        page.total,
        if page.has_more { ", more available" } else { "" }
    );
}
