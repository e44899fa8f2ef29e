use std::fs;

use energy_core::{
    storage::{BillingStorage, DatasetKey},
    CoreError,
};
use energy_domain::{ContractSetup, LedgerEntry, Month, Provenance, CURRENT_SCHEMA_VERSION};
use energy_storage_json::{JsonBillingStorage, StoragePaths};
use tempfile::{tempdir, TempDir};

fn storage_in(dir: &TempDir) -> JsonBillingStorage {
    let paths = StoragePaths {
        data_root: dir.path().join("data"),
        backup_root: dir.path().join("backups"),
    };
    JsonBillingStorage::new(paths).expect("create storage")
}

fn contract() -> ContractSetup {
    ContractSetup {
        energy_price_per_kwh: 3.2,
        fixed_supplier_fee: 120.0,
        distribution_high_tariff: 1800.0,
        distribution_low_tariff: 900.0,
        high_tariff_ratio: 0.6,
        breaker_fee: 280.0,
        last_annual_kwh: 2400,
        monthly_payment: 1700.0,
        billing_start: Month::May,
        billing_end: Month::January,
        supplier: None,
        distributor: Some("Grid".into()),
        schema_version: CURRENT_SCHEMA_VERSION,
    }
}

fn entry(month: Month, batch: u32) -> LedgerEntry {
    LedgerEntry::new(month, 150, 25.5, 1674.5, Provenance::user(batch))
}

#[test]
fn absent_datasets_load_as_empty() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);

    assert!(storage.load_contract().expect("load contract").is_none());
    assert!(storage.load_entries().expect("load entries").is_empty());
}

#[test]
fn blank_dataset_file_loads_as_empty() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    fs::write(storage.dataset_path(DatasetKey::Ledger), "  \n").expect("write blank");

    assert!(storage.load_entries().expect("load entries").is_empty());
}

#[test]
fn contract_and_entries_survive_a_new_instance() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    storage.save_contract(&contract()).expect("save contract");
    storage
        .save_entries(&[entry(Month::May, 1), entry(Month::June, 1)])
        .expect("save entries");

    let reopened = storage_in(&dir);
    let loaded = reopened.load_contract().expect("load").expect("contract present");
    assert_eq!(loaded.billing_start, Month::May);
    assert_eq!(loaded.distributor.as_deref(), Some("Grid"));

    let entries = reopened.load_entries().expect("load entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].month, Month::June);
    assert_eq!(entries[1].provenance, Provenance::user(1));

    let path = reopened.dataset_path(DatasetKey::Ledger);
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn append_creates_and_extends_the_sequence() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);

    storage.append_entry(&entry(Month::May, 1)).expect("append");
    storage.append_entry(&entry(Month::June, 2)).expect("append");

    let entries = storage.load_entries().expect("load entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].month, Month::May);
    assert_eq!(entries[1].provenance.batch, 2);
}

#[test]
fn append_to_non_sequence_fails() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    fs::write(storage.dataset_path(DatasetKey::Ledger), "{\"month\": \"may\"}")
        .expect("write object");

    let err = storage.append_entry(&entry(Month::May, 1)).unwrap_err();
    assert!(err.is_storage());
    assert!(storage.load_entries().unwrap_err().is_storage());
}

#[test]
fn corrupt_dataset_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    fs::write(storage.dataset_path(DatasetKey::Contract), "{ not json").expect("write");

    let err = storage.load_contract().unwrap_err();
    assert!(matches!(err, CoreError::Serde(_)));
}

#[test]
fn clear_removes_both_datasets() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    storage.save_contract(&contract()).expect("save contract");
    storage.append_entry(&entry(Month::May, 1)).expect("append");

    storage.clear().expect("clear");
    assert!(!storage.dataset_path(DatasetKey::Contract).exists());
    assert!(!storage.dataset_path(DatasetKey::Ledger).exists());
    assert!(storage.load_contract().expect("load").is_none());
}

#[test]
fn backups_are_listed_and_restorable() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    storage.save_contract(&contract()).expect("save contract");
    storage.append_entry(&entry(Month::May, 1)).expect("append");

    let info = storage
        .backup(Some("Before reset"))
        .expect("backup")
        .expect("json storage keeps backups");
    assert!(info.id.starts_with("billing_"));
    assert!(info.id.ends_with("_before-reset.json"));

    let backups = storage.list_backups().expect("list backups");
    assert!(backups.iter().any(|backup| backup.id == info.id));

    storage.clear().expect("clear");
    storage.restore(&info.id).expect("restore");
    assert_eq!(storage.load_backup(&info).expect("load backup").entries.len(), 1);
    assert_eq!(storage.load_entries().expect("load").len(), 1);
    assert!(storage.load_contract().expect("load").is_some());
}

#[test]
fn retention_prunes_oldest_backups() {
    let dir = tempdir().expect("tempdir");
    let backups = dir.path().join("backups");
    fs::create_dir_all(&backups).expect("create backups dir");
    for stamp in ["20240101_080000", "20240102_080000", "20240103_080000"] {
        fs::write(
            backups.join(format!("billing_{stamp}.json")),
            r#"{"schema_version":1,"created_at":"2024-01-01T08:00:00Z","contract":null,"entries":[]}"#,
        )
        .expect("seed backup");
    }
    let storage = JsonBillingStorage::with_retention(
        StoragePaths {
            data_root: dir.path().join("data"),
            backup_root: backups.clone(),
        },
        2,
    )
    .expect("create storage");

    let fresh = storage.backup(None).expect("backup").expect("info");
    let listed = storage.list_backups().expect("list backups");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, fresh.id);
    assert_eq!(listed[1].id, "billing_20240103_080000.json");
}

#[test]
fn unrelated_files_are_ignored_when_listing_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    fs::write(storage.backups_dir().join("notes.txt"), "hello").expect("write");
    fs::write(storage.backups_dir().join("other_20240101_080000.json"), "{}").expect("write");

    assert!(storage.list_backups().expect("list").is_empty());
}

#[test]
fn restore_by_id_snapshots_the_replaced_data() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    storage.save_contract(&contract()).expect("save contract");
    storage.append_entry(&entry(Month::May, 1)).expect("append");
    let saved = storage.backup(Some("march")).expect("backup").expect("info");
    storage.append_entry(&entry(Month::June, 2)).expect("append");

    let replaced = storage
        .restore(&saved.id)
        .expect("restore")
        .expect("snapshot of replaced data");
    assert!(replaced.id.ends_with("_before-restore.json"));
    assert_eq!(storage.load_entries().expect("load").len(), 1);
    assert_eq!(storage.load_backup(&replaced).expect("load backup").entries.len(), 2);

    let err = storage.restore("billing_19990101_000000.json").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn backup_writes_leave_no_temporary_files() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(&dir);
    storage.save_contract(&contract()).expect("save contract");
    storage.backup(None).expect("backup");

    let leftovers: Vec<_> = fs::read_dir(storage.backups_dir())
        .expect("read backups")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("tmp"))
        .collect();
    assert!(leftovers.is_empty());
    assert_eq!(storage.list_backups().expect("list").len(), 1);
}
