use std::path::PathBuf;

use crate::Result;

pub const DB_FILE: &str = "usage-tracker.sqlite";

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub app_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub foreground_log_path: PathBuf,
}

impl AppPaths {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let db_path = app_data_dir.join(DB_FILE);
        let foreground_log_path = reconcile::default_foreground_log(&app_data_dir);
        Self {
            app_data_dir,
            db_path,
            foreground_log_path,
        }
    }
}

pub fn ensure_app_data_dir(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.app_data_dir)?;
    Ok(())
}
