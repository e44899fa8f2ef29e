use energy_core::{input::parse_whole_kwh, WorkflowState};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "status",
            "Show the contract, progress, reconciliation and readings",
            "status",
            cmd_status,
        ),
        CommandEntry::new(
            "entries",
            "List recorded months",
            "entries [--json]",
            cmd_entries,
        ),
        CommandEntry::new(
            "quote",
            "Price a consumption without recording it",
            "quote <kwh> [months]",
            cmd_quote,
        ),
    ]
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let contract = session.contract();
    let fmt = &context.formatters;

    output::section("Status");
    if let Some(supplier) = &contract.supplier {
        io::print_info(format!("  Supplier     : {}", supplier));
    }
    if let Some(distributor) = &contract.distributor {
        io::print_info(format!("  Distributor  : {}", distributor));
    }
    io::print_info(format!(
        "  Period       : {} to {} (exclusive)",
        contract.billing_start, contract.billing_end
    ));
    io::print_info(format!("  Advance      : {} / month", fmt.amount(contract.monthly_payment)));
    io::print_info(format!("  Today        : {}", context.clock.today()));
    io::print_info(format!("  State        : {}", session.state()));

    let summary = session.summary()?;
    let pending = session.pending_months();
    io::print_info(format!("  Recorded     : {} months", summary.months_recorded));
    match pending.first() {
        Some(next) => io::print_info(format!(
            "  Pending      : {} months, next {}",
            pending.len(),
            next
        )),
        None => io::print_info("  Pending      : none"),
    }
    io::print_info(format!("  Running      : {}", fmt.signed(summary.running)));
    io::print_info(format!(
        "  Yearly       : {} (estimate)",
        fmt.signed(summary.yearly_estimate)
    ));

    output::section("Readings");
    for group in session.groups() {
        output::line(format!(
            "  {:<8} {:<32} {:>16}",
            group.provenance.to_string(),
            group.label(),
            fmt.signed_plain(group.total_delta)
        ));
    }
    if session.state() == WorkflowState::AllMonthsEntered {
        io::print_hint("Every month is entered. Use `undo` to correct the last reading.");
    }
    Ok(())
}

fn cmd_entries(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session()?;
    if args.first() == Some(&"--json") {
        let json = serde_json::to_string_pretty(session.entries())
            .map_err(|err| CommandError::Message(err.to_string()))?;
        output::line(json);
        return Ok(());
    }

    let fmt = &context.formatters;
    output::section("Entries");
    output::line(format!(
        "  {:<10} {:>8} {:>16} {:>16}  {}",
        "Month", "kWh", "Cost", "Balance", "Batch"
    ));
    for entry in session.entries() {
        output::line(format!(
            "  {:<10} {:>8} {:>16} {:>16}  {}",
            entry.month.name(),
            entry.consumption_kwh,
            fmt.amount(entry.cost),
            fmt.signed_plain(entry.delta),
            entry.provenance
        ));
    }
    Ok(())
}

fn cmd_quote(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (kwh, months) = match args {
        [kwh] => (parse_whole_kwh(kwh)?, 1),
        [kwh, months] => {
            let months = months
                .parse::<u32>()
                .ok()
                .filter(|count| (1..=12).contains(count))
                .ok_or_else(|| {
                    CommandError::InvalidArguments("months must be between 1 and 12".into())
                })?;
            (parse_whole_kwh(kwh)?, months)
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: quote <kwh> [months]".into(),
            ))
        }
    };

    let breakdown = context.session()?.quote(kwh, months);
    let fmt = &context.formatters;
    output::section(format!("Quote: {} kWh over {} month(s)", kwh, months));
    io::print_info(format!("  Energy       : {}", fmt.amount(breakdown.energy)));
    io::print_info(format!("  Distribution : {}", fmt.amount(breakdown.distribution)));
    io::print_info(format!("  Regulatory   : {}", fmt.amount(breakdown.regulatory)));
    io::print_info(format!("  Fixed fees   : {}", fmt.amount(breakdown.fixed)));
    io::print_info(format!("  VAT          : {}", fmt.amount(breakdown.vat)));
    io::print_info(format!("  Total        : {}", fmt.amount(breakdown.total)));
    io::print_info(format!(
        "  Per month    : {}",
        fmt.amount(breakdown.total / f64::from(months))
    ));
    Ok(())
}
