#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use energy_core::storage::BillingStorage;
use energy_domain::{ContractSetup, Month, CURRENT_SCHEMA_VERSION};
use energy_storage_json::{JsonBillingStorage, StoragePaths};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh home directory that outlives the calling test.
pub fn temp_home() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// JSON storage rooted in an isolated directory.
pub fn json_storage() -> Arc<dyn BillingStorage> {
    let base = temp_home();
    let storage = JsonBillingStorage::new(StoragePaths {
        data_root: base.join("data"),
        backup_root: base.join("backups"),
    })
    .expect("create json storage");
    Arc::new(storage)
}

/// Rates used throughout the tests: 5.0/kWh, 100 supplier fee, 1000/500
/// distribution, even split, 50 breaker fee.
pub fn sample_contract(billing_end: Month, billing_start: Month) -> ContractSetup {
    ContractSetup {
        energy_price_per_kwh: 5.0,
        fixed_supplier_fee: 100.0,
        distribution_high_tariff: 1000.0,
        distribution_low_tariff: 500.0,
        high_tariff_ratio: 0.5,
        breaker_fee: 50.0,
        last_annual_kwh: 1200,
        monthly_payment: 1500.0,
        billing_start,
        billing_end,
        supplier: None,
        distributor: None,
        schema_version: CURRENT_SCHEMA_VERSION,
    }
}

pub const SETUP_LINE: &str = "setup price=5 supplier_fee=100 high_tariff=1000 low_tariff=500 \
     high_ratio=0.5 breaker_fee=50 annual_kwh=1200 payment=1500 start=may end=january \
     supplier='Example Energy'";
