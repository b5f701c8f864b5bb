//! Shell completions command implementation.
//!
//! Generate shell completions for bash, zsh, fish, and powershell.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell as ClapShell};

use crate::cli::{Cli, Shell};

impl From<&Shell> for ClapShell {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::Powershell => ClapShell::PowerShell,
        }
    }
}

/// Generate shell completions for the given shell and write to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn execute(shell: &Shell) -> io::Result<()> {
    let mut cmd = Cli::command();
    generate(ClapShell::from(shell), &mut cmd, "hfilter", &mut io::stdout());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_mapping() {
        assert!(matches!(ClapShell::from(&Shell::Bash), ClapShell::Bash));
        assert!(matches!(ClapShell::from(&Shell::Zsh), ClapShell::Zsh));
        assert!(matches!(ClapShell::from(&Shell::Fish), ClapShell::Fish));
        assert!(matches!(ClapShell::from(&Shell::Powershell), ClapShell::PowerShell));
    }

    #[test]
    fn test_completions_mention_subcommands() {
        let mut buf = Vec::new();
        generate(ClapShell::Bash, &mut Cli::command(), "hfilter", &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("implied"));
        assert!(script.contains("v3"));
    }
}
