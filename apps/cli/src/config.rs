use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "usage-tracker";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_INTERVAL_SECS: u64 = 15 * 60;
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_BACKOFF_SECS: u64 = 60 * 60;
const DEFAULT_PLATFORM_VERSION: u32 = 34;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Seconds between scheduled reconciliations.
    pub interval_secs: u64,
    pub run_timeout_secs: u64,
    pub max_backoff_secs: u64,
    /// Whether the user granted usage access on this host.
    pub usage_access: bool,
    pub platform_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_log: Option<PathBuf>,
    /// Display names by package.
    pub labels: BTreeMap<String, String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
            usage_access: true,
            platform_version: DEFAULT_PLATFORM_VERSION,
            foreground_log: None,
            labels: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad, String> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);
    let paths = ConfigPaths { file };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .map_err(|err| format!("read config {}: {}", paths.file.display(), err))?;
        let config = parse_config(&contents)
            .map_err(|err| format!("parse config {}: {}", paths.file.display(), err))?;
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write config {}: {}", paths.file.display(), err))?;

    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}

fn parse_config(contents: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(contents)
}

fn config_dir() -> Result<PathBuf, String> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir).join(CONFIG_DIR_NAME));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}
