use std::path::PathBuf;

use clap::ArgMatches;
use tracing::error;

use oscli_core::config::ConfigStore;
use oscli_core::creds::{CredentialProvider, OsKeyring, PasswordSource};
use oscli_core::events;

use crate::prompts::TerminalPrompt;

mod completions;
mod config;
mod context;
mod remote;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("config", sub_matches)) => config::handle_config_command(sub_matches),
        Some(("context", sub_matches)) => context::handle_context_command(sub_matches),
        Some(("remote", sub_matches)) => remote::handle_remote_command(sub_matches),
        Some(("completions", sub_matches)) => {
            completions::handle_completions_command(sub_matches)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(e.as_ref());
    }
    result
}

/// Store for the `--config` path, or the default location.
pub(crate) fn config_store(matches: &ArgMatches) -> ConfigStore {
    ConfigStore::new(matches.get_one::<String>("config").map(PathBuf::from))
}

pub(crate) fn password_source(matches: &ArgMatches) -> PasswordSource {
    PasswordSource::from_option(matches.get_one::<String>("vault-password").cloned())
}

/// Provider backed by the OS keyring, prompting on the terminal.
pub(crate) fn credential_provider() -> CredentialProvider {
    CredentialProvider::new(Box::new(OsKeyring::new()), Box::new(TerminalPrompt))
}
