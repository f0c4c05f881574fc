use std::io::Read;

use clap::ArgMatches;
use tracing::{error, info};

use oscli_core::settings::{
    ClusterSettings, RemoteClusterOpts, RemoteMode, SettingsTier, delete_remote_body,
    remote_settings,
};

pub(crate) fn handle_remote_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("create", sub_matches)) => handle_create(sub_matches),
        Some(("unset", sub_matches)) => handle_unset(sub_matches),
        Some(("show", sub_matches)) => handle_show(sub_matches),
        _ => Err("Unknown remote command".into()),
    }
}

fn handle_create(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let alias = matches
        .get_one::<String>("alias")
        .ok_or("Alias argument is required")?;
    let address = matches
        .get_one::<String>("address")
        .ok_or("Address argument is required")?;

    let mut opts = RemoteClusterOpts::new(alias, address);
    opts.mode = option_value(matches, "mode").parse::<RemoteMode>()?;
    opts.tier = option_value(matches, "tier").parse::<SettingsTier>()?;

    let body = opts.create_remote_body();
    println!("{}", serde_json::to_string_pretty(&body)?);
    info!(
        event = "cli.remote.create_completed",
        alias = %opts.alias,
        mode = opts.mode.as_str(),
        tier = opts.tier.as_str()
    );
    Ok(())
}

fn handle_unset(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let alias = matches
        .get_one::<String>("alias")
        .ok_or("Alias argument is required")?;
    let settings = read_settings(matches)?;

    match delete_remote_body(alias, &settings) {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            info!(event = "cli.remote.unset_completed", alias = %alias);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            error!(event = "cli.remote.unset_failed", alias = %alias, error = %e);
            Err(e.into())
        }
    }
}

fn handle_show(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let settings = read_settings(matches)?;
    match remote_settings(&settings) {
        Some(remotes) => println!("{}", serde_json::to_string_pretty(remotes)?),
        None => println!("No remote clusters configured."),
    }
    Ok(())
}

fn option_value<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

/// Settings document from `--settings`, where `-` reads stdin.
fn read_settings(matches: &ArgMatches) -> Result<ClusterSettings, Box<dyn std::error::Error>> {
    let source = matches
        .get_one::<String>("settings")
        .ok_or("Settings argument is required")?;

    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("cannot read settings '{}': {}", source, e))?
    };
    Ok(ClusterSettings::from_json(&text)?)
}
