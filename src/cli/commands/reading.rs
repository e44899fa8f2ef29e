use energy_domain::Month;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record consumption for every pending month up to <month>",
            "add <kwh> [month]",
            cmd_add,
        ),
        CommandEntry::new("undo", "Remove the most recent reading", "undo", cmd_undo),
        CommandEntry::new(
            "pending",
            "List months still waiting for a reading",
            "pending",
            cmd_pending,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (kwh, month) = match args {
        [kwh] => (*kwh, context.clock.current_month()),
        [kwh, month] => {
            let month = month
                .parse::<Month>()
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            (*kwh, month)
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: add <kwh> [month]".into(),
            ))
        }
    };

    let session = context.session_mut()?;
    let group = session.add_reading(kwh, month)?;
    let running = session.recalculation()?;
    let per_month = group.total_delta / group.month_count as f64;

    io::print_success(format!("Recorded {}.", group.label()));
    io::print_info(format!(
        "  Balance per month {}, running total {}",
        context.formatters.signed(per_month),
        context.formatters.signed(running)
    ));
    Ok(())
}

fn cmd_undo(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let removed = context.session_mut()?.remove_last_reading()?;
    match (removed.first(), removed.last()) {
        (Some(first), Some(last)) if first.month != last.month => io::print_success(format!(
            "Removed reading for {} - {} ({} kWh).",
            first.month, last.month, first.consumption_kwh
        )),
        (Some(first), _) => io::print_success(format!(
            "Removed reading for {} ({} kWh).",
            first.month, first.consumption_kwh
        )),
        _ => io::print_info("Nothing was removed."),
    }
    Ok(())
}

fn cmd_pending(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let pending = context.session()?.pending_months();
    if pending.is_empty() {
        io::print_info("All months of the running period have been entered.");
        return Ok(());
    }
    output::section(format!("Pending months ({})", pending.len()));
    let names: Vec<&str> = pending.iter().map(|month| month.name()).collect();
    output::line(format!("  {}", names.join(", ")));
    Ok(())
}
