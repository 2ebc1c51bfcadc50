use std::path::PathBuf;

use tracker_app::startup::DB_FILE;

const DATA_DIR_NAME: &str = "usage-tracker";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

pub fn resolve_data_dir() -> Result<DataDirResolution, String> {
    let base = match std::env::var_os("XDG_DATA_HOME").filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
            PathBuf::from(home).join(".local").join("share")
        }
    };
    let dir = base.join(DATA_DIR_NAME);
    Ok(DataDirResolution {
        matched_existing: dir.join(DB_FILE).exists(),
        dir,
    })
}
