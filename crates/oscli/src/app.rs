use clap::{Arg, ArgAction, Command};
use clap_complete::Shell;

use oscli_core::settings::{RemoteMode, SettingsTier};
use oscli_core::wildcard::WILDCARD_HELP;

pub fn build_cli() -> Command {
    Command::new("oscli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage OpenSearch cluster contexts, credentials and replication settings")
        .long_about("oscli keeps a kubeconfig-style registry of clusters, users and contexts. Credentials live in the OS keyring or in Ansible-Vault encrypted files and are resolved when a context is used.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to the configuration file (default: ~/.oscli/config)")
                .global(true),
        )
        .arg(
            Arg::new("vault-password")
                .long("vault-password")
                .help("Password for vault-backed credentials (prompted when omitted)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(
                    Command::new("init")
                        .about("Create the configuration file if it does not exist")
                        .arg(
                            Arg::new("example")
                                .long("example")
                                .help("Populate the new file with an example context")
                                .action(ArgAction::SetTrue)
                        )
                )
                .subcommand(
                    Command::new("validate")
                        .about("Report duplicate names and dangling references")
                )
        )
        .subcommand(
            Command::new("context")
                .about("Manage cluster contexts")
                .visible_alias("ctx")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Add a cluster, a user and a context binding them")
                        .long_about("Add a cluster, a user and a context binding them. Values not given as flags are prompted for. Optional values are only prompted for when --server is omitted.")
                        .visible_alias("create")
                        .arg(
                            Arg::new("name")
                                .long("name")
                                .help("Context name (default: <user>@<cluster>)")
                        )
                        .arg(
                            Arg::new("cluster")
                                .long("cluster")
                                .help("Cluster entry name (default: derived from the server URL)")
                        )
                        .arg(
                            Arg::new("server")
                                .long("server")
                                .help("Cluster URL, e.g. https://localhost:9200")
                        )
                        .arg(
                            Arg::new("tls")
                                .long("tls")
                                .help("Verify the server's TLS certificate for this cluster")
                                .action(ArgAction::SetTrue)
                        )
                        .arg(
                            Arg::new("user")
                                .long("user")
                                .help("User entry name")
                        )
                        .arg(
                            Arg::new("backend")
                                .long("backend")
                                .help("Credential backend")
                                .value_parser(["keyring", "vault"])
                        )
                        .arg(
                            Arg::new("username")
                                .long("username")
                                .help("Username stored in the keyring")
                        )
                        .arg(
                            Arg::new("vault-file")
                                .long("vault-file")
                                .help("Existing vault file holding the credentials")
                        )
                        .arg(
                            Arg::new("username-key")
                                .long("username-key")
                                .help("Key of the username inside the vault")
                        )
                        .arg(
                            Arg::new("password-key")
                                .long("password-key")
                                .help("Key of the password inside the vault")
                        )
                        .arg(
                            Arg::new("switch")
                                .long("switch")
                                .help("Make the new context the active one")
                                .action(ArgAction::SetTrue)
                        )
                )
                .subcommand(
                    Command::new("list")
                        .about("List contexts")
                        .visible_alias("ls")
                        .after_help(WILDCARD_HELP)
                        .arg(
                            Arg::new("pattern")
                                .help("Only list contexts matching this pattern")
                                .index(1)
                        )
                )
                .subcommand(
                    Command::new("show")
                        .about("Show the active context and whether its entries exist")
                )
                .subcommand(
                    Command::new("view")
                        .about("Show details of a context, credentials excluded")
                        .arg(
                            Arg::new("name")
                                .help("Context to view (default: the active one)")
                                .index(1)
                        )
                )
                .subcommand(
                    Command::new("switch")
                        .about("Set the active context")
                        .arg(
                            Arg::new("name")
                                .help("Context to activate (prompted when omitted)")
                                .index(1)
                        )
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove contexts and the clusters and users only they used")
                        .visible_alias("rm")
                        .after_help(WILDCARD_HELP)
                        .arg(
                            Arg::new("pattern")
                                .help("Name or pattern of the contexts to remove")
                                .required(true)
                                .index(1)
                        )
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .short('y')
                                .help("Do not ask for confirmation")
                                .action(ArgAction::SetTrue)
                        )
                )
                .subcommand(
                    Command::new("check")
                        .about("Resolve the credentials of a context")
                        .arg(
                            Arg::new("name")
                                .help("Context to check (default: the active one)")
                                .index(1)
                        )
                )
        )
        .subcommand(
            Command::new("remote")
                .about("Build remote-cluster settings for cross-cluster replication")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Print the settings body registering a remote cluster")
                        .arg(
                            Arg::new("alias")
                                .help("Alias of the remote cluster")
                                .required(true)
                                .index(1)
                        )
                        .arg(
                            Arg::new("address")
                                .long("address")
                                .help("Proxy address of the remote cluster, e.g. 10.0.0.1:9300")
                                .required(true)
                        )
                        .arg(
                            Arg::new("mode")
                                .long("mode")
                                .help("Connection mode")
                                .value_parser(RemoteMode::VALUES.to_vec())
                        )
                        .arg(
                            Arg::new("tier")
                                .long("tier")
                                .help("Settings tier to write to")
                                .value_parser(SettingsTier::VALUES.to_vec())
                        )
                )
                .subcommand(
                    Command::new("unset")
                        .about("Print the settings patch removing a remote cluster")
                        .arg(
                            Arg::new("alias")
                                .help("Alias of the remote cluster")
                                .required(true)
                                .index(1)
                        )
                        .arg(
                            Arg::new("settings")
                                .long("settings")
                                .help("Cluster settings JSON (GET _cluster/settings), '-' for stdin")
                                .required(true)
                        )
                )
                .subcommand(
                    Command::new("show")
                        .about("Print the persistent remote-cluster settings")
                        .arg(
                            Arg::new("settings")
                                .long("settings")
                                .help("Cluster settings JSON (GET _cluster/settings), '-' for stdin")
                                .required(true)
                        )
                )
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Target shell")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(Shell))
                )
        )
}
