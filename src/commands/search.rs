//! Search and facet command handlers.

use super::{FilterArgs, print_page, summary_line};
use gasledger::models::{FacetOptions, FacetSelection, Page};
use gasledger::services::Debouncer;
use gasledger::{ClientRegistry, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

/// Prints one page of matching records.
pub fn cmd_search(
    registry: &ClientRegistry,
    filters: &FilterArgs,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let page = registry.search_paginated(&filters.to_criteria(), page, page_size)?;
    if page.total == 0 {
        println!("No matching clients.");
        return Ok(());
    }
    print_page(&page);
    Ok(())
}

/// Reads search terms from stdin, one per line, and prints the first page
/// for each term that is not superseded within the debounce period.
///
/// Filters other than the text apply to every term.
pub async fn cmd_search_interactive(
    registry: &ClientRegistry,
    filters: &FilterArgs,
    page_size: usize,
    debounce: Duration,
) -> Result<()> {
    let query = registry.query();
    let debouncer = Debouncer::new(debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks: JoinSet<Result<Option<(String, Page)>>> = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(term) = line.map_err(|e| Error::OperationFailed {
                    operation: "read_stdin".to_string(),
                    cause: e.to_string(),
                })?
                else {
                    break;
                };

                let criteria = FilterArgs {
                    text: Some(term.trim().to_string()),
                    ..filters.clone()
                }
                .to_criteria();
                let debouncer = debouncer.clone();
                let query = Arc::clone(&query);

                tasks.spawn(async move {
                    let fired = debouncer
                        .run(move || async move {
                            let ticket = query.begin_query();
                            tokio::task::spawn_blocking(move || {
                                query.search_guarded(ticket, &criteria, 0, page_size)
                            })
                            .await
                            .map_err(|e| Error::OperationFailed {
                                operation: "search".to_string(),
                                cause: e.to_string(),
                            })
                            .and_then(std::convert::identity)
                        })
                        .await;
                    match fired {
                        Some(result) => Ok(result?.map(|page| (term, page))),
                        None => Ok(None),
                    }
                });
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                report(joined)?;
            },
        }
    }

    while let Some(joined) = tasks.join_next().await {
        report(joined)?;
    }
    Ok(())
}

fn report(
    joined: std::result::Result<Result<Option<(String, Page)>>, tokio::task::JoinError>,
) -> Result<()> {
    let outcome = joined.map_err(|e| Error::OperationFailed {
        operation: "search".to_string(),
        cause: e.to_string(),
    })??;

    if let Some((term, page)) = outcome {
        println!("== {term} ({} matches)", page.total);
        for record in &page.items {
            println!("{}", summary_line(record));
        }
    }
    Ok(())
}

/// Prints the filter option lists for an address selection.
pub fn cmd_facets(
    registry: &ClientRegistry,
    settlements: Vec<String>,
    streets: Vec<String>,
    json: bool,
) -> Result<()> {
    let selection = FacetSelection {
        settlements: settlements.into_iter().collect(),
        streets: streets.into_iter().collect(),
    };
    let options = registry.facets(&selection)?;

    if json {
        let text = serde_json::to_string_pretty(&options).map_err(|e| Error::OperationFailed {
            operation: "serialize_facets".to_string(),
            cause: e.to_string(),
        })?;
        println!("{text}");
    } else {
        print_options(&options);
    }
    Ok(())
}

fn print_options(options: &FacetOptions) {
    let lists = [
        ("Населений пункт", &options.settlements),
        ("Вулиця", &options.streets),
        ("Марка лічильника", &options.meter_brands),
        ("Типорозмір", &options.meter_sizes),
        ("Рік випуску", &options.meter_years),
        ("Група ліч.", &options.meter_groups),
    ];
    for (label, values) in lists {
        println!("{label} ({}):", values.len());
        for value in values {
            println!("  {value}");
        }
    }
}
