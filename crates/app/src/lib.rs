pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::RangeParams;
pub use error::{AppError, Result};
pub use services::{
    AppServices, GoalsService, PairStatus, RefreshReport, RefreshService, SettingsService,
    SettingsSnapshot, TrackingService, UsageService,
};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{resolve_range, resolve_range_at};
