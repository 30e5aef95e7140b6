//! Secret entry for unseal shares
//!
//! Shares are read with hidden input when stdin is a terminal. Piped input
//! still works for scripting, but the entry is flagged so the caller can warn
//! that the share may have been echoed or recorded elsewhere.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Warning shown when a share could not be read from a non-echoing channel
pub const ECHO_WARNING: &str = "WARNING: stdin is not a terminal, so the share was read without \
hidden input. Piped or redirected shares can end up in shell history, logs or process \
listings. Run unseal from an interactive terminal for full protection.";

/// One share as entered by an operator
pub struct ShareEntry {
    value: Zeroizing<String>,
    echo_safe: bool,
}

impl ShareEntry {
    /// Trimmed share token
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.trim()
    }

    /// True when the share came from hidden terminal input
    #[must_use]
    pub fn is_echo_safe(&self) -> bool {
        self.echo_safe
    }

    /// True when the operator entered nothing, which ends entry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    #[must_use]
    pub fn into_value(self) -> Zeroizing<String> {
        self.value
    }
}

/// Reads one share from stdin
///
/// Returns `None` at end of input.
///
/// # Errors
/// Returns an error if reading from the terminal or stdin fails
pub fn read_share() -> Result<Option<ShareEntry>> {
    if atty::is(atty::Stream::Stdin) {
        eprint!("Key (will be hidden): ");
        let value = rpassword::read_password().context(
            "Failed to read share from the terminal. Shares can also be passed as arguments, \
             but may then live in your shell history",
        )?;
        Ok(Some(ShareEntry {
            value: Zeroizing::new(value),
            echo_safe: true,
        }))
    } else {
        read_share_from(&mut io::stdin().lock())
    }
}

/// Reads one share line from a non-interactive source
///
/// # Errors
/// Returns an error if the reader fails
pub fn read_share_from(reader: &mut impl BufRead) -> Result<Option<ShareEntry>> {
    let mut line = Zeroizing::new(String::new());
    let read = reader
        .read_line(&mut line)
        .context("Failed to read share from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(ShareEntry {
        value: line,
        echo_safe: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piped_share_is_flagged_and_trimmed() {
        let mut input = io::Cursor::new("  unseal army van  \nsecond\n");
        let entry = read_share_from(&mut input).unwrap().unwrap();
        assert_eq!(entry.value(), "unseal army van");
        assert!(!entry.is_echo_safe());

        let next = read_share_from(&mut input).unwrap().unwrap();
        assert_eq!(next.value(), "second");
        assert!(read_share_from(&mut input).unwrap().is_none());
    }

    #[test]
    fn test_blank_line_is_empty_entry() {
        let mut input = io::Cursor::new("\n");
        let entry = read_share_from(&mut input).unwrap().unwrap();
        assert!(entry.is_empty());
    }
}
