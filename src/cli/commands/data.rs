use energy_config::Config;
use energy_core::storage::BillingStorage;
use tracing::info;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const RESET_BACKUP_NOTE: &str = "before reset";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "backup",
            "Snapshot the contract and ledger",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List saved snapshots", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Replace current data with a saved snapshot",
            "restore <backup> [--yes]",
            cmd_restore,
        ),
        CommandEntry::new(
            "reset",
            "Delete the contract and every entry",
            "reset [--yes]",
            cmd_reset,
        ),
        CommandEntry::new(
            "config",
            "Show or change preferences",
            "config [key [value]]",
            cmd_config,
        ),
    ]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    match context.storage.backup(note.as_deref())? {
        Some(info) => io::print_success(format!("Backup `{}` created.", info.id)),
        None => io::print_warning("This storage does not keep backups."),
    }
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.storage.list_backups()?;
    if backups.is_empty() {
        io::print_info("No backups yet.");
        return Ok(());
    }
    output::section("Backups");
    for backup in backups {
        output::line(format!("  {:<20} {}", backup.created_at, backup.id));
    }
    Ok(())
}

/// `--yes` skips the question; script mode cannot ask, so it requires the flag.
fn confirmed(
    context: &ShellContext,
    flags: &[&str],
    command: &str,
    usage: &str,
    question: &str,
) -> Result<bool, CommandError> {
    match flags {
        [] if context.is_interactive() => io::confirm_action(&context.theme, question, false),
        [] => Err(CommandError::InvalidArguments(format!(
            "{command} needs `--yes` in script mode"
        ))),
        ["--yes"] | ["-y"] => Ok(true),
        _ => Err(CommandError::InvalidArguments(format!("usage: {usage}"))),
    }
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((backup_id, flags)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: restore <backup> [--yes]".into(),
        ));
    };
    let question = format!("Replace the current data with `{backup_id}`? A backup is kept.");
    if !confirmed(context, flags, "restore", "restore <backup> [--yes]", &question)? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }

    if let Some(before) = context.storage.restore(backup_id)? {
        io::print_info(format!("Saved `{}` before restoring.", before.id));
    }
    context.reload_session()?;
    info!(backup = %backup_id, "backup restored from shell");
    io::print_success(format!("Restored `{}`.", backup_id));
    match &context.session {
        Some(session) => io::print_info(format!("State: {}", session.state())),
        None => io::print_hint("The backup holds no contract. Run `setup` to start again."),
    }
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let question = "Delete the contract and all entries? A backup is kept.";
    if !confirmed(context, args, "reset", "reset [--yes]", question)? {
        io::print_info("Reset cancelled.");
        return Ok(());
    }

    let Some(session) = context.session.as_ref() else {
        io::print_info("Nothing to reset.");
        return Ok(());
    };
    if let Some(backup) = context.storage.backup(Some(RESET_BACKUP_NOTE))? {
        io::print_info(format!("Saved `{}` before resetting.", backup.id));
    }
    session.reset()?;
    context.session = None;
    info!("ledger reset from shell");
    io::print_success("All billing data removed. Run `setup` to start again.");
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            output::section("Configuration");
            for key in Config::KEYS {
                let value = context.config.get(key, &context.home)?;
                io::print_info(format!("  {:<18} {}", key, value));
            }
            io::print_info(format!(
                "  {:<18} {}",
                "config_file",
                context.config_manager.config_path().display()
            ));
        }
        [key] => {
            let value = context.config.get(key, &context.home)?;
            io::print_info(format!("{} = {}", key, value));
        }
        [key, value @ ..] => {
            let updated = context.config_manager.update(key, &value.join(" "))?;
            let shown = updated.get(key, &context.home)?;
            context.apply_config(updated);
            io::print_success(format!("{} = {}", key, shown));
            if matches!(*key, "data_root" | "backup_root" | "backup_retention") {
                io::print_hint("Storage settings take effect the next time the shell starts.");
            }
        }
    }
    Ok(())
}
