use std::path::Path;
use std::process;
use log::{error, LevelFilter};

use semcrop::batch::BatchSettings;
use semcrop::utils::logger::Logger;
use semcrop::commands::{build_cli, CommandFactory, SemcropCommandFactory};

fn main() {
    let matches = build_cli().get_matches();

    // The config file may ask for debug output too, errors surface later
    let verbose_config = matches.get_one::<String>("config")
        .and_then(|path| BatchSettings::from_file(Path::new(path)).ok())
        .map(|settings| settings.verbose)
        .unwrap_or(false);

    let level = if matches.get_flag("debug") || verbose_config {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file = "semcrop.log";
    let logger = match Logger::new(log_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("semcrop-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = SemcropCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
