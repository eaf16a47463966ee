use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "HUDDLE_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub security: SecuritySettings,
    pub presence: PresenceSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct StorageSettings {
    pub upload_dir: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    // 该账号可以删除任意帖子和评论
    pub admin_username: String,
}

#[derive(Deserialize, Clone)]
pub struct PresenceSettings {
    pub online_window_secs: i64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load(&run_mode, collect_env_vars(std::env::vars()))
    }

    fn load(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Message(format!("Failed to encode environment: {}", e)))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/huddle.db")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("security.admin_username", "admin")?
            .set_default(
                "presence.online_window_secs",
                domain::presence::DEFAULT_ONLINE_WINDOW_SECS,
            )?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

// HUDDLE_SERVER__PORT=8080 -> server.port
fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::load("test-defaults", HashMap::new()).unwrap();
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.database.url, "sqlite://data/huddle.db");
        assert_eq!(s.security.admin_username, "admin");
        assert_eq!(s.presence.online_window_secs, 10);
    }

    #[test]
    fn env_overrides() {
        let vars = vec![
            ("HUDDLE_SERVER__PORT".to_string(), "8080".to_string()),
            ("HUDDLE_SECURITY__ADMIN_USERNAME".to_string(), "root".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let env_map = collect_env_vars(vars.into_iter());
        assert_eq!(env_map.len(), 2);

        let s = Settings::load("test-env", env_map).unwrap();
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.security.admin_username, "root");
    }
}
