//! hrm-marketplace - Main entry point.
//!
//! Command-line front end for the marketplace add-on client.
//!
//! Usage: hrm-marketplace [--config PATH] <COMMAND>
//!
//! Run with `--help` for the command list.

use std::env;
use std::fs;
use std::process;

use hrm_marketplace::cli::{self, Command, Invocation, USAGE};
use hrm_marketplace::config::Config;
use hrm_marketplace::logging;
use hrm_marketplace::marketplace::{
    ApiManager, InstanceConfig, MarketplaceError, MarketplaceSettings, PurchaseRequest,
    ReqwestTransport, SettingsFile,
};

/// Version of this binary.
const VERSION: &str = env!("CARGO_PKG_VERSION");

type Manager = ApiManager<ReqwestTransport, SettingsFile, SettingsFile>;

fn main() {
    let invocation = match cli::parse_args(env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = run(invocation) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(invocation: Invocation) -> Result<(), Box<dyn std::error::Error>> {
    match invocation.command {
        Command::Version => {
            println!("hrm-marketplace v{}", VERSION);
            return Ok(());
        }
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let config = match &invocation.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Logging failures must not stop the command itself
    if let Err(e) = logging::init(&config.log_config) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match invocation.command {
        Command::List => {
            let mut manager = build_manager(&config)?;
            for addon in manager.list_addons()? {
                println!("{}", serde_json::to_string(addon.as_json())?);
            }
        }
        Command::Describe { addon_ref } => {
            let mut manager = build_manager(&config)?;
            let description = manager.addon_description(&addon_ref)?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Command::Download { addon_ref, output } => {
            let mut manager = build_manager(&config)?;
            let file = manager.addon_file(&addon_ref)?;
            match output {
                Some(path) => {
                    let bytes = file.decode()?;
                    fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => println!("{}", file.as_str()),
            }
        }
        Command::Buy {
            addon_id,
            company,
            email,
            phone,
        } => {
            let mut manager = build_manager(&config)?;
            let request = PurchaseRequest::new(addon_id, company, email, phone);
            let outcome = manager.submit_purchase(&request)?;
            println!("{}", outcome);
        }
        Command::Handshake => {
            let mut manager = build_manager(&config)?;
            let credentials = manager.handshake()?;
            println!("Registered with client id {}", credentials.client_id);
        }
        Command::Status => print_status(&config)?,
        Command::Version | Command::Help => {}
    }

    Ok(())
}

fn build_manager(config: &Config) -> Result<Manager, MarketplaceError> {
    let settings = SettingsFile::open(&config.config_path)?;
    let transport = ReqwestTransport::new(config.request_timeout)?;
    ApiManager::new(transport, settings.clone(), settings)
}

fn print_status(config: &Config) -> Result<(), MarketplaceError> {
    let settings = SettingsFile::open(&config.config_path)?;
    let registered = settings.client_id().is_some() && settings.client_secret().is_some();
    let identity = settings.instance_identifier().is_ok()
        && settings.instance_identifier_checksum().is_ok();

    println!("Config file:       {}", config.config_path.display());
    println!("Marketplace:       {}", settings.base_url()?);
    println!(
        "Instance identity: {}",
        if identity { "configured" } else { "missing" }
    );
    println!("Request timeout:   {}s", config.request_timeout.as_secs());
    println!(
        "Registration:      {}",
        if registered { "registered" } else { "unregistered" }
    );
    Ok(())
}
