use clap::ArgMatches;
use tracing::{info, warn};

use super::config_store;

pub(crate) fn handle_config_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("init", sub_matches)) => handle_init(sub_matches),
        Some(("validate", sub_matches)) => handle_validate(sub_matches),
        _ => Err("Unknown config command".into()),
    }
}

fn handle_init(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let example = matches.get_flag("example");
    let store = config_store(matches);

    info!(
        event = "cli.config.init_started",
        path = %store.path().display(),
        example = example
    );

    if store.init(example)? {
        println!("✅ Configuration created at {}", store.path().display());
        info!(event = "cli.config.init_completed", path = %store.path().display());
    } else {
        println!(
            "Configuration already exists at {}, left unchanged.",
            store.path().display()
        );
    }
    Ok(())
}

fn handle_validate(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let store = config_store(matches);
    let registry = store.load()?;
    let issues = registry.validate();

    if issues.is_empty() {
        println!("✅ {} is consistent.", store.path().display());
        return Ok(());
    }

    for issue in &issues {
        println!("❌ {}", issue);
    }
    warn!(
        event = "cli.config.validate_failed",
        path = %store.path().display(),
        issues = issues.len()
    );
    Err(format!("{} issue(s) found in the configuration", issues.len()).into())
}
