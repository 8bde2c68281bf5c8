use clap::Subcommand;
use studygarden_core::{Config, ConfigError};

use super::CmdResult;
use crate::render::Output;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.focus_minutes", "notifications.bell")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction, out: Output) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;
            out.value(&value, || value.clone())?;
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            out.say("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            if out.is_json() {
                out.value(&config, String::new)?;
            } else {
                println!("{}", dotted_lines(&config)?);
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            out.say("config reset to defaults");
        }
    }
    Ok(())
}

fn dotted_lines(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    let value = serde_json::to_value(config)?;
    let mut lines = Vec::new();
    if let serde_json::Value::Object(sections) = value {
        for (section, fields) in sections {
            if let serde_json::Value::Object(fields) = fields {
                for (key, v) in fields {
                    lines.push(format!("{section}.{key} = {v}"));
                }
            }
        }
    }
    Ok(lines.join("\n"))
}
