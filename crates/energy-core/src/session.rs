//! Consumption-entry workflow for one contract.
//!
//! A session starts `AwaitingInitial` until the previous billing period is
//! imported as the protected initial group. From then on the user records
//! readings for the months still pending in the running period, and may undo
//! them one batch at a time.

use std::{fmt, sync::Arc};

use energy_domain::{
    round2, ContractSetup, GroupSummary, LedgerEntry, Month, Provenance, TariffConfig,
    TariffConstants,
};
use tracing::{info, warn};

use crate::{
    input::parse_whole_kwh,
    ledger_manager::LedgerManager,
    month_ring::{months_between, range_exclusive, range_full_cycle},
    reconciliation::{Reconciliation, ReconciliationSummary},
    storage::BillingStorage,
    tariff_engine::{calculate_tariff, tariff_breakdown, validate_config, TariffBreakdown},
    CoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    AwaitingInitial,
    Tracking,
    AllMonthsEntered,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::AwaitingInitial => "awaiting initial period",
            WorkflowState::Tracking => "tracking",
            WorkflowState::AllMonthsEntered => "all months entered",
        };
        f.write_str(label)
    }
}

pub struct BillingSession {
    storage: Arc<dyn BillingStorage>,
    contract: ContractSetup,
    config: TariffConfig,
    ledger: LedgerManager,
}

impl BillingSession {
    /// Opens the persisted contract. Fails with a validation error when no
    /// contract has been set up yet.
    pub fn open(
        storage: Arc<dyn BillingStorage>,
        constants: TariffConstants,
    ) -> Result<Self, CoreError> {
        let contract = storage.load_contract()?.ok_or_else(|| {
            CoreError::Validation("no contract is set up yet; run `setup` first".into())
        })?;
        Self::with_contract(storage, contract, constants)
    }

    /// Persists a fresh contract, drops any previous ledger and imports the
    /// initial period.
    ///
    /// The contract is written before the ledger is emptied. A failed contract
    /// write changes nothing; a failed ledger write puts the previous contract
    /// back so the old contract never pairs with an emptied ledger.
    pub fn start(
        storage: Arc<dyn BillingStorage>,
        contract: ContractSetup,
        constants: TariffConstants,
    ) -> Result<Self, CoreError> {
        validate_contract(&contract, &constants)?;
        let previous = storage.load_contract()?;
        storage.save_contract(&contract)?;
        if let Err(err) = storage.save_entries(&[]) {
            let rollback = match &previous {
                Some(previous) => storage.save_contract(previous),
                None => storage.clear(),
            };
            if let Err(rollback_err) = rollback {
                warn!(error = %rollback_err, "could not restore the previous contract");
            }
            return Err(err);
        }
        let mut session = Self::with_contract(storage, contract, constants)?;
        session.ensure_initialized()?;
        Ok(session)
    }

    fn with_contract(
        storage: Arc<dyn BillingStorage>,
        contract: ContractSetup,
        constants: TariffConstants,
    ) -> Result<Self, CoreError> {
        validate_contract(&contract, &constants)?;
        let config = contract.tariff_config(constants);
        let ledger = LedgerManager::load(Arc::clone(&storage))?;
        Ok(Self {
            storage,
            contract,
            config,
            ledger,
        })
    }

    pub fn contract(&self) -> &ContractSetup {
        &self.contract
    }

    pub fn tariff_config(&self) -> &TariffConfig {
        &self.config
    }

    pub fn state(&self) -> WorkflowState {
        if self.ledger.is_empty() {
            WorkflowState::AwaitingInitial
        } else if self.pending_months().is_empty() {
            WorkflowState::AllMonthsEntered
        } else {
            WorkflowState::Tracking
        }
    }

    /// Imports the initial group unless persisted entries already exist.
    /// Returns the initial group summary either way.
    pub fn ensure_initialized(&mut self) -> Result<GroupSummary, CoreError> {
        if self.state() == WorkflowState::AwaitingInitial {
            self.bootstrap()?;
        }
        self.ledger.ledger().initial_group().ok_or_else(|| {
            CoreError::Internal("ledger has entries but no initial group".into())
        })
    }

    fn bootstrap(&mut self) -> Result<(), CoreError> {
        let start = self.contract.billing_end;
        let end = self.contract.billing_start;
        let months = range_full_cycle(start, end);
        debug_assert_eq!(months.len(), months_between(start, end));
        let group = self.price_period(&months, self.contract.last_annual_kwh, Provenance::initial());
        self.ledger.append_group(group)?;
        info!(
            months = months.len(),
            kwh = self.contract.last_annual_kwh,
            "initial period imported"
        );
        Ok(())
    }

    /// Months of the running period that have no reading yet, in order.
    pub fn pending_months(&self) -> Vec<Month> {
        let ledger = self.ledger.ledger();
        match (ledger.latest_month(), ledger.earliest_month()) {
            (Some(latest), Some(earliest)) => range_exclusive(latest.succ(), earliest),
            _ => range_exclusive(self.contract.billing_start, self.contract.billing_end),
        }
    }

    /// Records `consumption` (typed text, whole kWh) for every pending month
    /// up to and including `upto`.
    pub fn add_reading(&mut self, consumption: &str, upto: Month) -> Result<GroupSummary, CoreError> {
        let kwh = parse_whole_kwh(consumption)?;
        self.add_reading_kwh(kwh, upto)
    }

    pub fn add_reading_kwh(&mut self, kwh: u32, upto: Month) -> Result<GroupSummary, CoreError> {
        if self.state() == WorkflowState::AwaitingInitial {
            return Err(CoreError::Validation(
                "the initial period has not been imported yet".into(),
            ));
        }
        let pending = self.pending_months();
        if pending.is_empty() {
            return Err(CoreError::Validation(
                "all months have already been entered".into(),
            ));
        }
        let Some(position) = pending.iter().position(|month| *month == upto) else {
            return Err(CoreError::Validation(format!(
                "{upto} is not a pending month (next is {})",
                pending[0]
            )));
        };
        let months = &pending[..=position];
        let provenance = Provenance::user(self.ledger.ledger().next_batch());
        let group = self.price_period(months, kwh, provenance);
        self.ledger.append_group(group)?;
        info!(batch = provenance.batch, months = months.len(), kwh, "reading added");
        self.last_group()
    }

    /// Undoes the most recent reading batch.
    pub fn remove_last_reading(&mut self) -> Result<Vec<LedgerEntry>, CoreError> {
        self.ledger.remove_last_group()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        self.ledger.all_entries()
    }

    pub fn groups(&self) -> Vec<GroupSummary> {
        self.ledger.ledger().groups()
    }

    pub fn recalculation(&self) -> Result<f64, CoreError> {
        Reconciliation::recalculation(self.ledger.ledger())
    }

    pub fn yearly_recalculation(&self) -> Result<f64, CoreError> {
        Reconciliation::yearly_recalculation(self.ledger.ledger())
    }

    pub fn summary(&self) -> Result<ReconciliationSummary, CoreError> {
        Reconciliation::summarize(self.ledger.ledger())
    }

    /// Prices a hypothetical period without recording it.
    pub fn quote(&self, kwh: u32, month_count: u32) -> TariffBreakdown {
        tariff_breakdown(month_count, kwh, &self.config)
    }

    /// Removes the contract and every ledger entry. The session must not be
    /// used for further readings once this succeeds.
    pub fn reset(&self) -> Result<(), CoreError> {
        self.storage.clear()?;
        info!("billing data reset");
        Ok(())
    }

    fn last_group(&self) -> Result<GroupSummary, CoreError> {
        self.groups()
            .pop()
            .ok_or_else(|| CoreError::Internal("ledger is unexpectedly empty".into()))
    }

    /// Splits one period's bill evenly across its months.
    fn price_period(&self, months: &[Month], kwh: u32, provenance: Provenance) -> Vec<LedgerEntry> {
        let count = months.len() as u32;
        let cost = calculate_tariff(count, kwh, &self.config);
        let cost_per_month = cost / f64::from(count);
        let delta = round2(self.contract.monthly_payment - cost_per_month);
        let cost = round2(cost_per_month);
        months
            .iter()
            .map(|month| LedgerEntry::new(*month, kwh, delta, cost, provenance))
            .collect()
    }
}

fn validate_contract(contract: &ContractSetup, constants: &TariffConstants) -> Result<(), CoreError> {
    validate_config(&contract.tariff_config(*constants))?;
    if !contract.monthly_payment.is_finite() || contract.monthly_payment < 0.0 {
        return Err(CoreError::Validation(
            "monthly payment must be a non-negative number".into(),
        ));
    }
    Ok(())
}
