//! Config commands

use crate::config::Config;
use crate::ConfigCommands;

fn not_set(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(not set)".into())
}

pub fn handle(action: ConfigCommands, config: &mut Config, profile: Option<&str>) -> Result<(), String> {
    match action {
        ConfigCommands::Init => {
            Config::default().save(profile)?;
            println!(
                "Configuration initialized at {}",
                Config::config_path(profile)?.display()
            );
        }
        ConfigCommands::Set { key, value } => {
            match key.as_str() {
                "api_url" => config.api_url = Some(value),
                "upload_dir" => config.upload_dir = Some(value.into()),
                "upload_base_url" => config.upload_base_url = Some(value),
                _ => return Err(format!("Unknown config key: {}", key)),
            }
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let value = match key.as_str() {
                "api_url" => config.api_url.clone(),
                "upload_dir" => Some(config.upload_dir().display().to_string()),
                "upload_base_url" => config.upload_base_url.clone(),
                _ => return Err(format!("Unknown config key: {}", key)),
            };
            println!("{}: {}", key, not_set(value));
        }
        ConfigCommands::List => {
            println!("api_url: {}", not_set(config.api_url.clone()));
            println!("upload_dir: {}", config.upload_dir().display());
            println!("upload_base_url: {}", not_set(config.upload_base_url.clone()));
            println!(
                "session: {}",
                not_set(config.session.as_ref().map(|s| s.user.email.clone()))
            );
        }
    }
    Ok(())
}
