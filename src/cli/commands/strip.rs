//! `strip` command

use crate::cli::error::CliError;
use crate::reminder::ReminderStripper;

use super::load_input;

/// Print `input` with reminder text removed
pub fn handle_strip(input: &str) -> Result<(), CliError> {
    let content = load_input(input)?;
    let stripped = ReminderStripper::standard().strip(&content);
    println!("{}", stripped.trim_end());
    Ok(())
}
