use oscli_core::init_logging;

mod app;
mod commands;
mod prompts;
mod table;

fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Logs stay at error level unless --verbose is given
    let quiet = !matches.get_flag("verbose");
    init_logging(quiet);

    if let Err(e) = commands::run_command(&matches) {
        eprintln!("oscli: {}", e);
        std::process::exit(1);
    }
}
