//! Smoke probe for `shoplist_core` wiring.
//!
//! Opens the store under the given data directory (or in memory when none is
//! given), prints the current list and closes the store again.

use log::error;
use shoplist_core::{init_logging, CoreConfig, ListController, SqliteItemStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("shoplist: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("shoplist_core version={}", shoplist_core::core_version());

    let store = match std::env::args_os().nth(1) {
        Some(data_dir) => {
            let config = CoreConfig::for_data_dir(std::path::absolute(data_dir)?);
            config.validate()?;
            init_logging(&config.log)?;
            SqliteItemStore::open(&config.db_path)?
        }
        None => SqliteItemStore::open_in_memory()?,
    };

    let controller = ListController::new(store);
    let view = controller.current_view()?;
    println!("items={}", view.len());
    for item in &view {
        let mark = if item.is_checked { 'x' } else { ' ' };
        println!("[{mark}] {}", item.name);
    }

    controller.into_store().close()?;
    Ok(())
}
