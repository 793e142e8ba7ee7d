//! `havenvault contact` — manage the single trusted contact.

use crate::cli::{open_unlocked, output, Cli};
use crate::errors::Result;
use crate::vault::record::TrustedContact;

/// Execute `contact set`.
pub fn execute_set(cli: &Cli, name: &str, handle: &str) -> Result<()> {
    let mut session = open_unlocked(cli)?;

    let had_contact = session.get_contact()?.is_some();
    session.upsert_contact(TrustedContact {
        name: name.to_string(),
        handle: handle.to_string(),
    })?;

    if had_contact {
        output::success(&format!("Trusted contact replaced with '{name}'"));
    } else {
        output::success(&format!("Trusted contact set to '{name}'"));
    }
    Ok(())
}

/// Execute `contact show`.
pub fn execute_show(cli: &Cli) -> Result<()> {
    let mut session = open_unlocked(cli)?;

    match session.get_contact()? {
        Some(contact) => {
            println!("{} — {}", contact.name, contact.handle);
            Ok(())
        }
        None => {
            output::info("No trusted contact stored.");
            output::tip("Run `havenvault contact set <name> <handle>` to add one.");
            Ok(())
        }
    }
}
