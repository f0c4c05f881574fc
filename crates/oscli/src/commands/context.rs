use std::collections::BTreeMap;

use clap::ArgMatches;
use tracing::{error, info, warn};

use oscli_core::ContextResolver;
use oscli_core::config::{
    ClusterConfig, ConfigError, ConfigStore, ContextConfig, ContextInfo, CredentialSource,
    Registry, UserConfig, VaultConfig, default_context_name, derive_cluster_name, expand_home,
};
use oscli_core::creds::{CredentialProvider, Credentials, PasswordSource, vault};
use oscli_core::wildcard::Pattern;

use super::{config_store, credential_provider, password_source};
use crate::prompts;
use crate::table::TableFormatter;

const KEYRING_BACKEND: &str = "keyring";
const VAULT_BACKEND: &str = "vault";
const BIND_VAULT: &str = "bind";
const CREATE_VAULT: &str = "create";
const EMBED_VAULT: &str = "embed";
const SAVE_VAULT: &str = "save";

const LEGEND: &str = "Legend:\n\t✅ - entry found in the configuration file.\n\t❌ - entry not found in the configuration file.";

pub(crate) fn handle_context_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("add", sub_matches)) => handle_add(sub_matches),
        Some(("list", sub_matches)) => handle_list(sub_matches),
        Some(("show", sub_matches)) => handle_show(sub_matches),
        Some(("view", sub_matches)) => handle_view(sub_matches),
        Some(("switch", sub_matches)) => handle_switch(sub_matches),
        Some(("remove", sub_matches)) => handle_remove(sub_matches),
        Some(("check", sub_matches)) => handle_check(sub_matches),
        _ => Err("Unknown context command".into()),
    }
}

fn flag(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn handle_add(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let store = config_store(matches);
    let mut registry = store.load()?;
    // Without --server the command runs as a guided session and also asks
    // for the optional values.
    let interactive = matches.get_one::<String>("server").is_none();

    let cluster = cluster_entry(matches, interactive)?;
    let user_name = match flag(matches, "user") {
        Some(name) => name,
        None => prompts::required_text("User entry name")?,
    };
    let context_name = match flag(matches, "name") {
        Some(name) => Some(name),
        None if interactive => prompts::optional_text("(optional) Context name")?,
        None => None,
    }
    .unwrap_or_else(|| default_context_name(&user_name, &cluster.name));

    ensure_available(&registry, &cluster.name, &user_name, &context_name)?;

    let switch = matches.get_flag("switch")
        || (interactive && prompts::confirm("Switch to the created context?", true)?);

    info!(
        event = "cli.context.add_started",
        context = %context_name,
        cluster = %cluster.name,
        user = %user_name
    );

    let provider = credential_provider();
    let source = credential_source(matches, &provider)?;
    let user = UserConfig::new(user_name.clone(), source);
    let token = user.token().map(str::to_string);
    let context = ContextConfig::new(context_name.clone(), cluster.name.clone(), user_name);

    if let Err(e) = persist_new_context(&store, &mut registry, cluster, user, context, switch) {
        if let Some(token) = &token {
            roll_back_token(&provider, token);
        }
        eprintln!("❌ Failed to add context '{}': {}", context_name, e);
        error!(
            event = "cli.context.add_failed",
            context = %context_name,
            error = %e
        );
        return Err(e.into());
    }

    println!("✅ Context '{}' added.", context_name);
    if switch {
        println!("Switched to context '{}'.", context_name);
    }
    info!(
        event = "cli.context.add_completed",
        context = %context_name,
        switched = switch
    );
    Ok(())
}

fn persist_new_context(
    store: &ConfigStore,
    registry: &mut Registry,
    cluster: ClusterConfig,
    user: UserConfig,
    context: ContextConfig,
    switch: bool,
) -> Result<(), ConfigError> {
    let name = context.name.clone();
    registry.push(cluster, user, context)?;
    if switch {
        registry.switch_context(&name)?;
    }
    store.save(registry)
}

fn roll_back_token(provider: &CredentialProvider, token: &str) {
    match provider.forget_token(token) {
        Ok(()) => info!(event = "cli.context.add_rolled_back", token = token),
        Err(e) => warn!(
            event = "cli.context.add_rollback_failed",
            token = token,
            error = %e
        ),
    }
}

fn ensure_available(
    registry: &Registry,
    cluster: &str,
    user: &str,
    context: &str,
) -> Result<(), ConfigError> {
    let taken = [
        ("cluster", cluster, registry.has_cluster(cluster)),
        ("user", user, registry.has_user(user)),
        ("context", context, registry.has_context(context)),
    ];
    match taken.into_iter().find(|(_, _, exists)| *exists) {
        Some((kind, name, _)) => Err(ConfigError::AlreadyExists {
            kind,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn cluster_entry(
    matches: &ArgMatches,
    interactive: bool,
) -> Result<ClusterConfig, Box<dyn std::error::Error>> {
    let server = match flag(matches, "server") {
        Some(server) => server,
        None => prompts::required_text("Cluster url")?,
    };
    let name = match flag(matches, "cluster") {
        Some(name) => Some(name),
        None if interactive => prompts::optional_text("(optional) Cluster name")?,
        None => None,
    }
    .unwrap_or_else(|| derive_cluster_name(&server));
    let tls = matches.get_flag("tls")
        || (interactive && prompts::confirm("Verify the server's TLS certificate?", true)?);

    Ok(ClusterConfig::new(name, server, tls))
}

fn credential_source(
    matches: &ArgMatches,
    provider: &CredentialProvider,
) -> Result<CredentialSource, Box<dyn std::error::Error>> {
    let backend = match flag(matches, "backend") {
        Some(backend) => backend,
        None => prompts::select(
            "Choose credential backend",
            vec![VAULT_BACKEND.to_string(), KEYRING_BACKEND.to_string()],
            None,
        )?,
    };

    if backend == KEYRING_BACKEND {
        let username = match flag(matches, "username") {
            Some(username) => username,
            None => prompts::required_text("Username")?,
        };
        let password = prompts::secret("Password")?;
        let token = provider.register_token(&Credentials::new(username, password))?;
        return Ok(CredentialSource::Token { id: token });
    }

    let vault = match flag(matches, "vault-file") {
        Some(file) => bind_vault(matches, file)?,
        None => {
            let action = prompts::select(
                "Create vault or bind to existing",
                vec![BIND_VAULT.to_string(), CREATE_VAULT.to_string()],
                None,
            )?;
            if action == BIND_VAULT {
                let file = prompts::required_text("Vault file location")?;
                bind_vault(matches, file)?
            } else {
                create_vault(matches)?
            }
        }
    };
    Ok(CredentialSource::Vault(vault))
}

fn vault_keys(matches: &ArgMatches) -> Result<(String, String), Box<dyn std::error::Error>> {
    let username_key = match flag(matches, "username-key") {
        Some(key) => key,
        None => prompts::required_text("Vault username key")?,
    };
    let password_key = match flag(matches, "password-key") {
        Some(key) => key,
        None => prompts::required_text("Vault password key")?,
    };
    if username_key == password_key {
        return Err("Vault username and password keys must differ".into());
    }
    Ok((username_key, password_key))
}

fn bind_vault(
    matches: &ArgMatches,
    file: String,
) -> Result<VaultConfig, Box<dyn std::error::Error>> {
    let (username, password) = vault_keys(matches)?;
    if !expand_home(&file).exists() {
        warn!(event = "cli.context.vault_file_missing", file = %file);
        eprintln!("⚠️  Vault file '{}' does not exist yet.", file);
    }
    Ok(VaultConfig {
        file: Some(file),
        vault_string: None,
        username,
        password,
    })
}

fn create_vault(matches: &ArgMatches) -> Result<VaultConfig, Box<dyn std::error::Error>> {
    let (username_key, password_key) = vault_keys(matches)?;
    let username = prompts::required_text("Username")?;
    let password = prompts::secret("Password")?;
    let vault_password = match password_source(matches) {
        PasswordSource::Value(value) => value,
        PasswordSource::Prompt => prompts::secret("Set vault password")?,
    };

    let mut entries = BTreeMap::new();
    entries.insert(username_key.clone(), username);
    entries.insert(password_key.clone(), password);
    let vault_text = vault::create_vault(&entries, &vault_password)?;

    let mut config = VaultConfig {
        file: None,
        vault_string: None,
        username: username_key,
        password: password_key,
    };

    let placement = prompts::select(
        "How do you want to save vault credentials?",
        vec![EMBED_VAULT.to_string(), SAVE_VAULT.to_string()],
        None,
    )?;
    if placement == EMBED_VAULT {
        config.vault_string = Some(vault_text);
    } else {
        let location = prompts::required_text("Choose vault location")?;
        let path = expand_home(&location);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, vault_text)?;
        info!(event = "cli.context.vault_written", path = %path.display());
        config.file = Some(location);
    }
    Ok(config)
}

fn handle_list(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let registry = config_store(matches).load()?;
    let pattern = matches
        .get_one::<String>("pattern")
        .map(String::as_str)
        .unwrap_or("*");

    if registry.contexts.is_empty() {
        println!("No contexts configured. Use 'oscli context add' to create one.");
        return Ok(());
    }

    let names = Pattern::compile(pattern).filter(registry.context_names());
    if names.is_empty() {
        println!("No contexts match '{}'.", pattern);
        return Ok(());
    }

    let rows: Vec<ContextInfo<'_>> = names
        .iter()
        .map(|name| registry.context_info(name))
        .collect();
    TableFormatter::new(&rows).print_table(&rows);
    println!("Current context: {}", current_label(&registry));

    info!(
        event = "cli.context.list_completed",
        pattern = pattern,
        count = rows.len()
    );
    Ok(())
}

fn current_label(registry: &Registry) -> &str {
    if registry.current.is_empty() {
        "<none>"
    } else {
        &registry.current
    }
}

fn marker(found: bool) -> &'static str {
    if found { "✅" } else { "❌" }
}

fn status_lines(info: &ContextInfo<'_>) -> String {
    let mut lines = vec![format!(
        "{} Context: {}",
        marker(info.context.is_some()),
        info.name
    )];
    if let (Some(cluster), Some(user)) = (info.cluster_ref(), info.user_ref()) {
        lines.push(format!(
            "\t{} Cluster: {}",
            marker(info.cluster.is_some()),
            cluster
        ));
        lines.push(format!("\t{} User: {}", marker(info.user.is_some()), user));
    }
    lines.join("\n")
}

fn handle_show(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let registry = config_store(matches).load()?;
    if registry.current.is_empty() {
        println!("No active context. Use 'oscli context switch' to select one.");
        return Ok(());
    }

    println!("{}", status_lines(&registry.context_info(&registry.current)));
    println!();
    println!("{}", LEGEND);
    Ok(())
}

fn handle_view(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let registry = config_store(matches).load()?;
    let name = match matches.get_one::<String>("name") {
        Some(name) => name.as_str(),
        None if registry.current.is_empty() => return Err(ConfigError::NoActiveContext.into()),
        None => registry.current.as_str(),
    };

    let info = registry.context_info(name);
    if info.context.is_none() {
        println!("❌ Context is not found: {}", name);
        return Err(ConfigError::ContextNotFound {
            name: name.to_string(),
        }
        .into());
    }

    println!("Context: {}", info.name);
    match info.cluster {
        Some(cluster) => {
            println!("\tCluster: {}", cluster.name);
            println!("\t\tServer: {}", cluster.params.server);
            println!("\t\tVerify TLS: {}", cluster.params.tls);
        }
        None => println!(
            "\t❌ Cluster is not found: {}",
            info.cluster_ref().unwrap_or_default()
        ),
    }
    match info.user {
        Some(user) => {
            println!("\tUser: {}", user.name);
            println!("\t\tBackend: {}", user.user.kind());
            match &user.user {
                CredentialSource::Token { id } => println!("\t\tToken: {}", id),
                CredentialSource::Vault(vault) => {
                    match &vault.file {
                        Some(file) if !file.is_empty() => println!("\t\tVault file: {}", file),
                        _ => println!("\t\tVault: embedded"),
                    }
                    println!("\t\tUsername key: {}", vault.username);
                    println!("\t\tPassword key: {}", vault.password);
                }
                CredentialSource::None => {}
            }
        }
        None => println!(
            "\t❌ User is not found: {}",
            info.user_ref().unwrap_or_default()
        ),
    }
    Ok(())
}

fn handle_switch(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let store = config_store(matches);
    let mut registry = store.load()?;

    let name = match flag(matches, "name") {
        Some(name) => name,
        None => {
            if registry.contexts.is_empty() {
                return Err("No contexts configured. Use 'oscli context add' to create one.".into());
            }
            let options: Vec<String> = registry
                .context_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let current = options.iter().position(|n| *n == registry.current);
            prompts::select("Select context", options, current)?
        }
    };

    if let Err(e) = registry.switch_context(&name) {
        eprintln!("❌ Requested context '{}' is not found.", name);
        error!(event = "cli.context.switch_failed", context = %name, error = %e);
        return Err(e.into());
    }
    store.save(&registry)?;

    println!("Switched to context '{}'.", name);
    info!(event = "cli.context.switch_completed", context = %name);
    Ok(())
}

fn handle_remove(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let pattern = matches
        .get_one::<String>("pattern")
        .ok_or("Pattern argument is required")?;
    let store = config_store(matches);
    let mut registry = store.load()?;

    let targets: Vec<String> = Pattern::compile(pattern)
        .filter(registry.context_names())
        .into_iter()
        .map(str::to_string)
        .collect();
    if targets.is_empty() {
        println!("No contexts match '{}'.", pattern);
        info!(event = "cli.context.remove_no_match", pattern = %pattern);
        return Ok(());
    }

    if !matches.get_flag("yes") {
        let label = format!(
            "Remove {} context(s): {}? This cannot be undone.",
            targets.len(),
            targets.join(", ")
        );
        if !prompts::confirm(&label, false)? {
            println!("Aborted.");
            info!(event = "cli.context.remove_aborted");
            return Ok(());
        }
    }

    let removed = targets
        .iter()
        .map(|name| registry.remove_context(name))
        .collect::<Result<Vec<_>, _>>()?;
    let pruned = registry.prune_unreferenced(&removed);
    store.save(&registry)?;

    // Secrets go only after the configuration no longer references them.
    let tokens: Vec<(&str, &str)> = pruned
        .users
        .iter()
        .filter_map(|u| u.token().map(|t| (u.name.as_str(), t)))
        .collect();
    if !tokens.is_empty() {
        let provider = credential_provider();
        for (user, token) in tokens {
            if let Err(e) = provider.forget_token(token) {
                eprintln!("⚠️  Could not remove keyring entry of user '{}': {}", user, e);
                warn!(
                    event = "cli.context.keyring_cleanup_failed",
                    user = user,
                    error = %e
                );
            }
        }
    }

    for name in &targets {
        println!("✅ Context '{}' removed.", name);
    }
    for cluster in &pruned.clusters {
        println!("   Removed unused cluster '{}'.", cluster.name);
    }
    for user in &pruned.users {
        println!("   Removed unused user '{}'.", user.name);
    }

    info!(
        event = "cli.context.remove_completed",
        removed = targets.len(),
        pruned_clusters = pruned.clusters.len(),
        pruned_users = pruned.users.len()
    );
    Ok(())
}

fn handle_check(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let registry = config_store(matches).load()?;
    let provider = credential_provider();
    let resolver = ContextResolver::new(&registry, &provider);
    let name = matches.get_one::<String>("name").map(String::as_str);

    match resolver.resolve(name, &password_source(matches)) {
        Ok(resolved) => {
            println!("✅ Context '{}' is usable.", resolved.name);
            println!("\tServer: {}", resolved.server());
            println!(
                "\tUser: {} (username: {})",
                resolved.user.name, resolved.credentials.username
            );
            println!("\tTimeout: {}s", resolved.timeout.as_secs());
            info!(event = "cli.context.check_completed", context = %resolved.name);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            error!(event = "cli.context.check_failed", error = %e);
            Err(e.into())
        }
    }
}
