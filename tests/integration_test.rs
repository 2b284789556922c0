//! Integration tests for gasledger.
#![allow(
    clippy::panic,
    clippy::too_many_lines,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use gasledger::io::columns::headers;
use gasledger::io::{Column, ExportOptions, ExportService, ImportOptions, ImportService};
use gasledger::models::{ClientId, NO, YES};
use gasledger::services::{MemorySessionStore, StartOutcome};
use gasledger::{
    ClientRecord, ClientRegistry, ClientStore, Error, FacetSelection, ScrollStateCache,
    SearchCriteria, StatusFlags,
};

fn names(records: &[ClientRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.full_name.clone()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Record store
// ============================================================================

#[test]
fn test_crud_lifecycle() {
    let registry = ClientRegistry::in_memory().unwrap();
    let record = ClientRecord::new("0001234567", "Іванов Іван").with_settlement("Київ");

    let id = registry.create(&record).unwrap();
    let all = registry.store().get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], record.clone().with_id(id));

    let mut changed = all[0].clone();
    changed.phone = "0501234567".to_string();
    registry.update(&changed).unwrap();
    let all = registry.store().get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].phone, "0501234567");

    assert!(registry.delete(id).unwrap());
    assert!(!registry.delete(id).unwrap());
    assert_eq!(registry.count().unwrap(), 0);
}

#[test]
fn test_invalid_create_leaves_store_unchanged() {
    let registry = ClientRegistry::in_memory().unwrap();
    registry.create(&ClientRecord::new("001", "Іванов")).unwrap();

    let result = registry.create(&ClientRecord::new("  ", "Петренко"));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(registry.count().unwrap(), 1);
}

#[test]
fn test_ids_survive_reopen_and_are_never_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("clients.db");

    let (first, second) = {
        let registry = ClientRegistry::open(&path).unwrap();
        let first = registry.create(&ClientRecord::new("001", "Іванов")).unwrap();
        let second = registry.create(&ClientRecord::new("002", "Петренко")).unwrap();
        registry.delete(second).unwrap();
        (first, second)
    };

    let registry = ClientRegistry::open(&path).unwrap();
    assert_eq!(registry.count().unwrap(), 1);
    assert_eq!(registry.get(first).unwrap().unwrap().full_name, "Іванов");

    let third = registry.create(&ClientRecord::new("003", "Сидоренко")).unwrap();
    assert!(third.get() > second.get());
    assert!(registry.get(second).unwrap().is_none());
}

#[test]
fn test_update_without_id_is_rejected() {
    let registry = ClientRegistry::in_memory().unwrap();
    let result = registry.update(&ClientRecord::new("001", "Іванов"));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(registry.count().unwrap(), 0);
}

#[test]
fn test_update_of_unknown_id_inserts_at_that_id() {
    let registry = ClientRegistry::in_memory().unwrap();
    let record = ClientRecord::new("001", "Іванов").with_id(ClientId::new(42));
    registry.update(&record).unwrap();
    assert_eq!(registry.get(ClientId::new(42)).unwrap(), Some(record));
}

// ============================================================================
// Query engine
// ============================================================================

#[test]
fn test_numeric_term_matches_account_and_phone() {
    let registry = ClientRegistry::in_memory().unwrap();
    registry
        .create(&ClientRecord::new("0001234567", "Рахунок"))
        .unwrap();
    registry
        .create(&ClientRecord::new("0009999999", "Телефон").with_phone("0670000000, 0501231111"))
        .unwrap();
    registry
        .create(&ClientRecord::new("0005555555", "Ніхто").with_phone("0670000000"))
        .unwrap();

    let found = registry
        .search(&SearchCriteria::new().with_text("123"))
        .unwrap();
    assert_eq!(
        names(&found),
        set(&["Рахунок", "Телефон"])
    );
}

#[test]
fn test_status_flags_or_other_filters_and() {
    let registry = ClientRegistry::in_memory().unwrap();
    let mut dacha = ClientRecord::new("001", "Дачник").with_settlement("Київ");
    dacha.dacha = true;
    dacha.gas_disconnected = NO.to_string();
    registry.create(&dacha).unwrap();

    let mut off = ClientRecord::new("002", "Вимкнений").with_settlement("Львів");
    off.gas_disconnected = YES.to_string();
    registry.create(&off).unwrap();

    registry
        .create(&ClientRecord::new("003", "Звичайний").with_settlement("Київ"))
        .unwrap();

    let both_flags = StatusFlags {
        disconnected: true,
        dacha: true,
        absent: false,
    };
    let found = registry
        .search(&SearchCriteria::new().with_status(both_flags))
        .unwrap();
    assert_eq!(
        names(&found),
        set(&["Дачник", "Вимкнений"])
    );

    let narrowed = registry
        .search(
            &SearchCriteria::new()
                .with_status(both_flags)
                .with_settlement("Бровари"),
        )
        .unwrap();
    assert!(narrowed.is_empty());
}

#[test]
fn test_empty_criteria_returns_everything() {
    let registry = ClientRegistry::in_memory().unwrap();
    for i in 0..7 {
        registry
            .create(&ClientRecord::new(format!("{i}"), format!("Клієнт {i}")))
            .unwrap();
    }
    let found = registry.search(&SearchCriteria::new()).unwrap();
    assert_eq!(found, registry.store().get_all().unwrap());
}

#[test]
fn test_superseded_query_is_dropped() {
    let registry = ClientRegistry::in_memory().unwrap();
    registry.create(&ClientRecord::new("001", "Іванов")).unwrap();
    let query = registry.query();

    let stale = query.begin_query();
    let fresh = query.begin_query();
    let criteria = SearchCriteria::new();

    assert!(!query.is_current(stale));
    assert!(
        query
            .search_guarded(stale, &criteria, 0, 10)
            .unwrap()
            .is_none()
    );
    assert_eq!(
        query
            .search_guarded(fresh, &criteria, 0, 10)
            .unwrap()
            .unwrap()
            .total,
        1
    );
}

// ============================================================================
// Facets
// ============================================================================

#[test]
fn test_facet_scoping_is_one_directional() {
    let registry = ClientRegistry::in_memory().unwrap();
    let rows = [
        ("001", "Київ", "A", "G4", "2019", "Група 1"),
        ("002", "Київ", "B", "G6", "2020", "Група 2"),
        ("003", "Львів", "C", "G10", "2015", "Група 3"),
    ];
    for (account, settlement, brand, size, year, group) in rows {
        let mut record = ClientRecord::new(account, format!("Клієнт {account}"))
            .with_settlement(settlement)
            .with_meter(brand, size, year);
        record.meter_group = group.to_string();
        registry.create(&record).unwrap();
    }

    let all = registry.facets(&FacetSelection::new()).unwrap();
    assert_eq!(all.meter_brands, vec!["A", "B", "C"]);

    let kyiv = SearchCriteria::new().with_settlement("Київ");
    let scoped = registry.facets(&FacetSelection::from(&kyiv)).unwrap();
    assert_eq!(scoped.settlements, vec!["Київ", "Львів"]);
    assert_eq!(scoped.meter_brands, vec!["A", "B"]);

    let with_brand = kyiv.with_meter_brand("A");
    let unchanged = registry.facets(&FacetSelection::from(&with_brand)).unwrap();
    assert_eq!(unchanged.meter_sizes, vec!["G4", "G6"]);
    assert_eq!(unchanged.meter_years, vec!["2020", "2019"]);
    assert_eq!(unchanged.meter_groups, vec!["Група 1", "Група 2"]);
}

// ============================================================================
// Import / export
// ============================================================================

fn csv_row(cells: &[(Column, &str)]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let row: Vec<String> = Column::ALL
        .iter()
        .map(|column| {
            cells
                .iter()
                .find(|(c, _)| c == column)
                .map_or_else(
                    || if column.is_flag() { NO.to_string() } else { String::new() },
                    |(_, v)| (*v).to_string(),
                )
        })
        .collect();
    writer.write_record(&row).unwrap();
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn sample_file() -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers()).unwrap();
    let mut text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    text.push_str(&csv_row(&[
        (Column::FullName, "Іванов Іван"),
        (Column::AccountNumber, "0001234567"),
        (Column::Settlement, "Київ"),
        (Column::Phone, "0501234567, 0671112233"),
        (Column::Dacha, YES),
    ]));
    text.push_str(&csv_row(&[
        (Column::FullName, "Петренко Петро"),
        (Column::AccountNumber, "0002345678"),
        (Column::StreetType, "вул."),
        (Column::Street, "Шевченка"),
        (Column::GasDisconnected, YES),
    ]));
    text.push_str(&csv_row(&[
        (Column::AccountNumber, "0003456789"),
        (Column::Settlement, "Львів"),
    ]));
    text.push_str(&csv_row(&[
        (Column::FullName, "Сидоренко Олена, \"молодша\""),
        (Column::AccountNumber, "0004567890"),
        (Column::TemporaryAbsent, YES),
    ]));
    text
}

#[test]
fn test_import_counts_valid_rows() {
    let registry = ClientRegistry::in_memory().unwrap();
    let service = ImportService::new(registry.store());
    let before = registry.count().unwrap();

    let result = service
        .import_from_reader(
            std::io::Cursor::new(sample_file()),
            ImportOptions::default(),
            None,
        )
        .unwrap();

    assert_eq!(result.imported, 3);
    assert_eq!(result.skipped_invalid, 1);
    assert_eq!(registry.count().unwrap(), before + 3);
}

#[test]
fn test_export_of_import_reproduces_valid_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, sample_file()).unwrap();

    let registry = ClientRegistry::in_memory().unwrap();
    ImportService::new(registry.store())
        .import_from_file(&input, ImportOptions::default(), None)
        .unwrap();
    ExportService::new(registry.store())
        .export_to_file(&output, ExportOptions::default(), None)
        .unwrap();

    let read_rows = |text: &str| -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    };

    let expected: Vec<Vec<String>> = read_rows(&sample_file())
        .into_iter()
        .filter(|row| !row[0].is_empty() && !row[8].is_empty())
        .collect();
    let exported = read_rows(&std::fs::read_to_string(&output).unwrap());

    assert_eq!(exported.len(), 3);
    assert_eq!(exported, expected);
}

#[test]
fn test_workbook_export_moves_registry_between_stores() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let workbook = dir.path().join("Абоненти_2025-01-31.xlsx");
    std::fs::write(&input, sample_file()).unwrap();

    let source = ClientRegistry::in_memory().unwrap();
    ImportService::new(source.store())
        .import_from_file(&input, ImportOptions::default(), None)
        .unwrap();
    let exported = ExportService::new(source.store())
        .export_to_file(&workbook, ExportOptions::default(), None)
        .unwrap();
    assert_eq!(exported.exported, 3);

    let target = ClientRegistry::in_memory().unwrap();
    let result = ImportService::new(target.store())
        .import_from_file(&workbook, ImportOptions::default(), None)
        .unwrap();

    assert_eq!(result.imported, 3);
    assert_eq!(result.skipped_invalid, 0);
    assert_eq!(
        target.store().get_all().unwrap(),
        source.store().get_all().unwrap()
    );
}

// ============================================================================
// Browsing
// ============================================================================

#[test]
fn test_browse_resumes_from_snapshot() {
    let registry = ClientRegistry::in_memory().unwrap();
    for i in 0..5 {
        registry
            .create(&ClientRecord::new(format!("{i:03}"), format!("Клієнт {i}")))
            .unwrap();
    }
    let cache = Arc::new(ScrollStateCache::new(Arc::new(MemorySessionStore::new())));

    let mut first = registry.browse(Arc::clone(&cache), 2);
    assert_eq!(first.start(SearchCriteria::new()).unwrap(), StartOutcome::Loaded);
    assert_eq!(first.load_more().unwrap(), 2);
    first.record_scroll(340.0).unwrap();
    first.flush().unwrap();

    let mut second = registry.browse(Arc::clone(&cache), 2);
    assert_eq!(
        second.start(SearchCriteria::new()).unwrap(),
        StartOutcome::Restored
    );
    assert_eq!(second.records().len(), 4);
    assert!(second.has_more());
    assert_eq!(second.on_rendered(), Some(340.0));
    assert_eq!(second.on_rendered(), None);

    let mut third = registry.browse(Arc::clone(&cache), 2);
    assert_eq!(
        third
            .start(SearchCriteria::new().with_text("Клієнт 4"))
            .unwrap(),
        StartOutcome::Loaded
    );
    assert_eq!(third.records().len(), 1);
    assert!(!third.has_more());
}
