//! `setup`: capture contract details and import the previously billed period.
//!
//! Fields come as `key=value` arguments. In an interactive shell every
//! missing field is prompted for; in script mode missing required fields are
//! an error.

use std::collections::HashMap;

use energy_core::{
    input::{parse_amount, parse_decimal, parse_whole_kwh},
    storage::BillingStorage,
    BillingSession, CoreError,
};
use energy_domain::{ContractSetup, Month, CURRENT_SCHEMA_VERSION};
use tracing::info;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "setup",
        "Enter contract rates and the previous bill",
        "setup [price=<per kWh>] [supplier_fee=..] [high_tariff=<per MWh>] [low_tariff=..] \
         [high_ratio=<0-1>] [breaker_fee=..] [annual_kwh=..] [payment=..] [start=<month>] \
         [end=<month>] [supplier=..] [distributor=..]",
        cmd_setup,
    )]
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Amount,
    Ratio,
    Kwh,
    Month,
    Text,
}

struct SetupField {
    key: &'static str,
    prompt: &'static str,
    kind: FieldKind,
    required: bool,
}

const fn field(key: &'static str, prompt: &'static str, kind: FieldKind) -> SetupField {
    SetupField {
        key,
        prompt,
        kind,
        required: true,
    }
}

const FIELDS: [SetupField; 12] = [
    field("price", "Energy price per kWh", FieldKind::Amount),
    field("supplier_fee", "Fixed supplier fee per month", FieldKind::Amount),
    field("high_tariff", "Distribution high tariff per MWh", FieldKind::Amount),
    field("low_tariff", "Distribution low tariff per MWh", FieldKind::Amount),
    field("high_ratio", "Share billed at high tariff (0-1)", FieldKind::Ratio),
    field("breaker_fee", "Circuit breaker fee per month", FieldKind::Amount),
    field("annual_kwh", "kWh billed in the previous period", FieldKind::Kwh),
    field("payment", "Monthly advance payment", FieldKind::Amount),
    field("start", "Month the current billing period began", FieldKind::Month),
    field("end", "Month the next billing period begins", FieldKind::Month),
    SetupField {
        key: "supplier",
        prompt: "Supplier name (optional)",
        kind: FieldKind::Text,
        required: false,
    },
    SetupField {
        key: "distributor",
        prompt: "Distributor name (optional)",
        kind: FieldKind::Text,
        required: false,
    },
];

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Number(f64),
    Kwh(u32),
    Month(Month),
    Text(String),
}

fn parse_field(kind: FieldKind, raw: &str) -> Result<FieldValue, CoreError> {
    match kind {
        FieldKind::Amount => parse_amount(raw).map(FieldValue::Number),
        FieldKind::Ratio => {
            let ratio = parse_decimal(raw)?;
            if (0.0..=1.0).contains(&ratio) {
                Ok(FieldValue::Number(ratio))
            } else {
                Err(CoreError::Validation(format!(
                    "`{}` is not a share between 0 and 1",
                    raw.trim()
                )))
            }
        }
        FieldKind::Kwh => parse_whole_kwh(raw).map(FieldValue::Kwh),
        FieldKind::Month => raw
            .parse::<Month>()
            .map(FieldValue::Month)
            .map_err(|err| CoreError::Validation(err.to_string())),
        FieldKind::Text => Ok(FieldValue::Text(raw.trim().to_string())),
    }
}

fn parse_assignments<'a>(args: &[&'a str]) -> Result<HashMap<&'a str, &'a str>, CommandError> {
    let mut provided = HashMap::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(CommandError::InvalidArguments(format!(
                "expected `field=value`, got `{}`",
                arg
            )));
        };
        let key = key.trim();
        if !FIELDS.iter().any(|field| field.key == key) {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setup field `{}`",
                key
            )));
        }
        provided.insert(key, value);
    }
    Ok(provided)
}

fn collect_values(
    context: &ShellContext,
    provided: &HashMap<&str, &str>,
) -> Result<HashMap<&'static str, FieldValue>, CommandError> {
    let mut values = HashMap::new();
    let mut missing = Vec::new();
    for field in &FIELDS {
        let value = match provided.get(field.key) {
            Some(raw) => Some(parse_field(field.kind, raw).map_err(|err| {
                CommandError::InvalidArguments(format!("{}: {}", field.key, message_of(err)))
            })?),
            None if context.is_interactive() => prompt_field(context, field)?,
            None if field.required => {
                missing.push(field.key);
                None
            }
            None => None,
        };
        if let Some(value) = value {
            values.insert(field.key, value);
        }
    }
    if !missing.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "missing setup fields: {}",
            missing.join(", ")
        )));
    }
    Ok(values)
}

fn prompt_field(context: &ShellContext, field: &SetupField) -> Result<Option<FieldValue>, CommandError> {
    if !field.required {
        return Ok(io::prompt_optional(&context.theme, field.prompt)?.map(FieldValue::Text));
    }
    let kind = field.kind;
    let raw = io::prompt_validated(&context.theme, field.prompt, |value: &String| {
        parse_field(kind, value).map(|_| ()).map_err(message_of)
    })?;
    parse_field(kind, &raw)
        .map(Some)
        .map_err(|err| CommandError::InvalidArguments(message_of(err)))
}

fn message_of(err: CoreError) -> String {
    match err {
        CoreError::Validation(message) => message,
        other => other.to_string(),
    }
}

fn build_contract(values: &HashMap<&'static str, FieldValue>) -> Result<ContractSetup, CommandError> {
    let missing = |key: &str| CommandError::InvalidArguments(format!("missing setup field `{key}`"));
    let number = |key: &'static str| match values.get(key) {
        Some(FieldValue::Number(value)) => Ok(*value),
        _ => Err(missing(key)),
    };
    let month = |key: &'static str| match values.get(key) {
        Some(FieldValue::Month(value)) => Ok(*value),
        _ => Err(missing(key)),
    };
    let text = |key: &'static str| match values.get(key) {
        Some(FieldValue::Text(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    };
    let last_annual_kwh = match values.get("annual_kwh") {
        Some(FieldValue::Kwh(value)) => *value,
        _ => return Err(missing("annual_kwh")),
    };

    Ok(ContractSetup {
        energy_price_per_kwh: number("price")?,
        fixed_supplier_fee: number("supplier_fee")?,
        distribution_high_tariff: number("high_tariff")?,
        distribution_low_tariff: number("low_tariff")?,
        high_tariff_ratio: number("high_ratio")?,
        breaker_fee: number("breaker_fee")?,
        last_annual_kwh,
        monthly_payment: number("payment")?,
        billing_start: month("start")?,
        billing_end: month("end")?,
        supplier: text("supplier"),
        distributor: text("distributor"),
        schema_version: CURRENT_SCHEMA_VERSION,
    })
}

fn cmd_setup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let provided = parse_assignments(args)?;

    if context.session.is_some() && context.is_interactive() {
        let replace = io::confirm_action(
            &context.theme,
            "A contract already exists. Replace it and start a new ledger?",
            false,
        )?;
        if !replace {
            io::print_info("Setup cancelled.");
            return Ok(());
        }
    }

    let values = collect_values(context, &provided)?;
    let contract = build_contract(&values)?;

    if context.session.is_some() {
        if let Some(backup) = context.storage.backup(Some("before setup"))? {
            io::print_info(format!("Previous data saved as `{}`.", backup.id));
        }
    }

    let started = BillingSession::start(
        context.storage_handle(),
        contract,
        context.config.tariff_constants(),
    );
    let mut session = match started {
        Ok(session) => session,
        // Validation happens before any write, so the old session stays valid.
        Err(err) if err.is_validation() => return Err(err.into()),
        Err(err) => {
            context.session = None;
            return Err(err.into());
        }
    };
    let initial = session.ensure_initialized()?;
    info!(months = initial.month_count, "contract set up");

    io::print_success(format!("Contract saved. Previous period imported: {}.", initial.label()));
    io::print_info(format!(
        "  Per month: cost {}, balance {}",
        context.formatters.amount(initial.total_cost / initial.month_count as f64),
        context
            .formatters
            .signed(initial.total_delta / initial.month_count as f64)
    ));
    match session.pending_months().first() {
        Some(next) => io::print_info(format!("Next reading due for {}.", next)),
        None => io::print_info("No months are pending in the running period."),
    }
    context.session = Some(session);
    Ok(())
}
