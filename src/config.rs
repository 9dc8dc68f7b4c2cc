use anyhow::{anyhow, ensure, Result};
use serenity::all::ChannelId;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/classbot/config.toml";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
    pub command_prefix: String,
    /// One-line text file holding the id of the channel all bot responses
    /// are posted to.  Read fresh on every command so the channel can be
    /// repointed without restarting the bot.
    pub spam_channel_file: PathBuf,
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(config)
    }

    /// The channel all command responses are posted to.
    pub async fn spam_channel(&self) -> Result<ChannelId> {
        let path = &self.general.spam_channel_file;

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow!(
                "Could not read spam channel file `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let id: u64 = contents.trim().parse().map_err(|e| {
            anyhow!(
                "Spam channel file `{}` does not contain a channel id: {}",
                path.to_string_lossy(),
                e
            )
        })?;
        ensure!(
            id != 0,
            "Spam channel file `{}` contains a zero channel id",
            path.to_string_lossy()
        );

        Ok(ChannelId::new(id))
    }
}
