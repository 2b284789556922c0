//! Browse and session command handlers.
//!
//! Each invocation is one step of a browse session; the loaded window lives
//! in the session file between invocations.

use super::{BrowseAction, SessionAction, summary_line};
use gasledger::config::RegistryConfig;
use gasledger::services::{FileSessionStore, ScrollStateCache, StartOutcome};
use gasledger::{BrowseSession, ClientRegistry, Error, Result};
use std::sync::Arc;

fn open_session(
    registry: &ClientRegistry,
    config: &RegistryConfig,
) -> (BrowseSession, Arc<ScrollStateCache>) {
    let store = Arc::new(FileSessionStore::new(config.session_path()));
    let cache = Arc::new(ScrollStateCache::new(store));
    let session = registry
        .browse(Arc::clone(&cache), config.page_size)
        .with_scroll_save_interval(config.scroll_save_interval());
    (session, cache)
}

/// Resumes the saved window; fails if there is none.
fn resume(registry: &ClientRegistry, config: &RegistryConfig) -> Result<BrowseSession> {
    let (mut session, cache) = open_session(registry, config);
    let snapshot = cache.restore()?.ok_or_else(|| {
        Error::InvalidInput("No saved browse window; run `browse start` first".to_string())
    })?;
    session.start(snapshot.criteria)?;
    Ok(session)
}

/// Executes a browse step.
pub fn cmd_browse(
    registry: &ClientRegistry,
    config: &RegistryConfig,
    action: BrowseAction,
) -> Result<()> {
    match action {
        BrowseAction::Start { filters } => {
            let (mut session, _cache) = open_session(registry, config);
            let outcome = session.start(filters.to_criteria())?;
            match outcome {
                StartOutcome::Restored => println!("Restored saved window."),
                StartOutcome::Loaded => println!("Loaded first page."),
            }
            for record in session.records() {
                println!("{}", summary_line(record));
            }
            print_status(&session);
            if let Some(offset) = session.on_rendered() {
                println!("Scroll to offset {offset}");
            }
        },
        BrowseAction::More => {
            let mut session = resume(registry, config)?;
            let before = session.records().len();
            let appended = session.load_more()?;
            if appended == 0 {
                println!("No more records.");
            }
            for record in &session.records()[before..] {
                println!("{}", summary_line(record));
            }
            print_status(&session);
        },
        BrowseAction::Scroll { offset } => {
            let mut session = resume(registry, config)?;
            session.record_scroll(offset)?;
            session.flush()?;
            println!("Saved scroll offset {offset}");
        },
        BrowseAction::Restore => {
            let mut session = resume(registry, config)?;
            for record in session.records() {
                println!("{}", summary_line(record));
            }
            print_status(&session);
            if let Some(offset) = session.on_rendered() {
                println!("Scroll to offset {offset}");
            }
        },
    }
    Ok(())
}

fn print_status(session: &BrowseSession) {
    println!();
    println!(
        "Showing {} of {} records (page {}){}",
        session.records().len(),
        session.total(),
        session.page_index() + 1,
        if session.has_more() { ", more available" } else { "" }
    );
}

/// Executes a session command.
pub fn cmd_session(config: &RegistryConfig, action: &SessionAction) -> Result<()> {
    match action {
        SessionAction::Clear => {
            let store = FileSessionStore::new(config.session_path());
            store.clear_all()?;
            println!("Session cleared: {}", store.path().display());
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::FilterArgs;
    use gasledger::models::ClientRecord;

    fn setup() -> (tempfile::TempDir, ClientRegistry, RegistryConfig) {
        let dir = tempfile::tempdir().unwrap();
        let registry = ClientRegistry::in_memory().unwrap();
        for i in 0..5 {
            registry
                .create(&ClientRecord::new(format!("{i:03}"), format!("Клієнт {i}")))
                .unwrap();
        }
        let config = RegistryConfig::default()
            .with_data_dir(dir.path())
            .with_page_size(2);
        (dir, registry, config)
    }

    #[test]
    fn test_more_requires_start() {
        let (_dir, registry, config) = setup();
        let result = cmd_browse(&registry, &config, BrowseAction::More);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_steps_share_the_saved_window() {
        let (_dir, registry, config) = setup();
        cmd_browse(
            &registry,
            &config,
            BrowseAction::Start {
                filters: FilterArgs::default(),
            },
        )
        .unwrap();
        cmd_browse(&registry, &config, BrowseAction::More).unwrap();
        cmd_browse(&registry, &config, BrowseAction::Scroll { offset: 120.0 }).unwrap();

        let session = resume(&registry, &config).unwrap();
        assert_eq!(session.records().len(), 4);
        assert!((session.scroll_offset() - 120.0).abs() < f64::EPSILON);

        cmd_session(&config, &SessionAction::Clear).unwrap();
        assert!(resume(&registry, &config).is_err());
    }

    #[test]
    fn test_scroll_to_nan_keeps_window() {
        let (_dir, registry, config) = setup();
        cmd_browse(
            &registry,
            &config,
            BrowseAction::Start {
                filters: FilterArgs::default(),
            },
        )
        .unwrap();
        cmd_browse(&registry, &config, BrowseAction::More).unwrap();

        let result = cmd_browse(&registry, &config, BrowseAction::Scroll { offset: f64::NAN });
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let session = resume(&registry, &config).unwrap();
        assert_eq!(session.records().len(), 4);
        assert_eq!(session.page_index(), 1);
    }
}
