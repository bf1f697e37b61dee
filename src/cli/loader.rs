use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::TimeDelta;

use crate::{
    error::RirmapError,
    lookup::{
        batch::{CachePaths, Pacing},
        workflow::RetryPolicy,
    },
};

use super::{
    args::Args,
    config::ConfigFile,
    input::{EXCLUDED_LIST_FILES, newest_with_extension},
};

/// Everything a run needs, after merging defaults, config file and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub paths: CachePaths,
    pub ttl: TimeDelta,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    pub rdap_url: String,
    pub registry_timeout: Duration,
    pub sheets: Vec<String>,
    pub list: Option<PathBuf>,
    pub excel: Option<PathBuf>,
    pub excel_export: Option<PathBuf>,
    pub json_export: Option<PathBuf>,
    pub addresses: Vec<String>,
}

impl Settings {
    /// Settings described by a configuration file alone
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            paths: CachePaths {
                cache: config.cache.path.clone(),
                unresolved: config.cache.unresolved_path.clone(),
            },
            ttl: TimeDelta::days(i64::from(config.cache.ttl_days)),
            retry: RetryPolicy {
                max_attempts: config.lookup.max_attempts,
                timeout_cooldown: Duration::from_secs(config.lookup.timeout_cooldown_secs),
            },
            pacing: Pacing {
                pause_every: config.lookup.pause_every,
                pause: Duration::from_secs(config.lookup.pause_secs),
                save_every: config.lookup.save_every,
            },
            rdap_url: config.registry.rdap_url.clone(),
            registry_timeout: Duration::from_secs(config.registry.timeout_secs),
            sheets: config.spreadsheet.sheets.clone(),
            list: None,
            excel: None,
            excel_export: None,
            json_export: None,
            addresses: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}

/// Load and merge settings from command line arguments and config file
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load complete settings from CLI arguments
    pub fn load(args: &Args) -> Result<Settings, RirmapError> {
        Self::load_in(args, Path::new("."))
    }

    /// Same as [`SettingsLoader::load`], discovering default inputs in `dir`
    pub fn load_in(args: &Args, dir: &Path) -> Result<Settings, RirmapError> {
        let config = match args.config.as_ref() {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let mut settings = Settings::from_config(&config);

        if let Some(cache) = args.cache.as_ref() {
            settings.paths.cache = cache.clone();
        }

        settings.list = match args.list.as_ref() {
            Some(None) => {
                let found = newest_with_extension(dir, "txt", EXCLUDED_LIST_FILES)?;
                if found.is_none() {
                    log::info!(
                        "No .txt file was found in {}, IP list search is not used",
                        dir.display()
                    );
                }
                found
            }
            Some(Some(path)) => Some(path.clone()),
            None => None,
        };

        settings.excel = match args.excel.as_ref() {
            Some(None) => {
                let found = newest_with_extension(dir, "xlsx", &[])?;
                if found.is_none() {
                    log::info!(
                        "No .xlsx file was found in {}, spreadsheet search is not used",
                        dir.display()
                    );
                }
                found
            }
            Some(Some(path)) => Some(path.clone()),
            None => None,
        };

        settings.excel_export = args.excel_export.clone();
        settings.json_export = args.json_export.clone();
        settings.addresses = args.addresses.clone();

        Ok(settings)
    }
}
