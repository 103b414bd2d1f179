//! Offline queries against the snapshot file.

use studybear_core::commands::facade;
use studybear_core::{Config, Reply, SnapshotStore, StudentRegistry};

fn load_registry(config: &Config) -> Result<StudentRegistry, Box<dyn std::error::Error>> {
    let store = SnapshotStore::new(config.snapshot_file()?);
    Ok(StudentRegistry::from_members(store.load()))
}

pub fn leaderboard(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_env()?;
    let registry = load_registry(&config)?;
    let entries = facade::leaderboard(&registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let reply = Reply::Leaderboard { entries };
        println!("{}", reply.render(&config.command_prefix, &config.currency_name));
    }
    Ok(())
}

pub fn balance(id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_env()?;
    let registry = load_registry(&config)?;
    let units = facade::balance_of(&registry, id);

    if json {
        let value = serde_json::json!({
            "id": id,
            "units": units,
            "balance_ms": registry.find(id).map(|m| m.balance).unwrap_or(0),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let reply = Reply::Balance { units };
        println!("{}", reply.render(&config.command_prefix, &config.currency_name));
    }
    Ok(())
}
