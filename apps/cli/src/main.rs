mod args;
mod config;
mod dirs;
mod host;
mod scheduler;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use args::Command;
use chrono::Local;
use log::info;
use reconcile::{ForegroundLogProvider, JobOutcome, StaticLabels, UsageDataSource, select_access};
use tracker_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};
use tracker_core::{UsageRecord, UsageStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;
    if command == Command::Help {
        args::print_help();
        return Ok(());
    }

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        info!("created config at {}", config.paths.file.display());
    }
    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    if !data_dir.matched_existing {
        info!("using data dir {}", data_dir.dir.display());
    }

    let paths = AppPaths::new(data_dir.dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    let app_state = open_app(&config.config, &paths)?;
    let cli = config.config;

    match command {
        Command::Run => {
            let schedule = scheduler::Schedule {
                interval: Duration::from_secs(cli.interval_secs.max(1)),
                run_timeout: Duration::from_secs(cli.run_timeout_secs.max(1)),
                max_backoff: Duration::from_secs(cli.max_backoff_secs.max(1)),
            };
            info!(
                "reconciling every {:?}; press Ctrl+C to stop",
                schedule.interval
            );
            scheduler::run_periodic(app_state.job(), schedule).await;
        }
        Command::Once { json } => {
            let refresh = app_state.services.refresh.clone();
            let report = tokio::task::spawn_blocking(move || refresh.refresh_all()).await??;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_outcome(&report.outcome);
                for record in &report.records {
                    print_record(record);
                }
            }
        }
        Command::Status { json } => {
            let board = app_state
                .services
                .usage
                .status_board(Local::now().date_naive())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else if board.is_empty() {
                println!("Nothing tracked yet. Use `usage-tracker track <goal_id> <package>`.");
            } else {
                for entry in board {
                    let name = entry.app_name.as_deref().unwrap_or(&entry.package_name);
                    println!(
                        "goal {:>3}  {:<32} {:<28} streak {}",
                        entry.goal_id,
                        name,
                        describe_status(&entry.status),
                        entry.streak
                    );
                }
            }
        }
        Command::GoalAdd {
            name,
            description,
            limit,
        } => {
            let goal = app_state.services.goals.create(&name, &description, limit)?;
            println!(
                "Created goal {} \"{}\" ({} min/day)",
                goal.id, goal.name, goal.daily_limit_minutes
            );
        }
        Command::GoalList => {
            let goals = app_state.services.goals.list()?;
            if goals.is_empty() {
                println!("No goals yet. Use `usage-tracker goal add <name>`.");
            }
            for goal in goals {
                println!(
                    "{:>3}  {:<32} {:>4} min/day",
                    goal.id, goal.name, goal.daily_limit_minutes
                );
            }
        }
        Command::GoalRemove { goal_id } => {
            app_state.services.goals.delete(goal_id)?;
            println!("Removed goal {} and its usage history", goal_id);
        }
        Command::GoalLimit { goal_id, minutes } => {
            app_state.services.goals.set_limit(goal_id, minutes)?;
            println!("Goal {} now allows {} min/day", goal_id, minutes);
        }
        Command::Track {
            goal_id,
            package_name,
        } => {
            let record = app_state
                .services
                .tracking
                .track_app(goal_id, &package_name)?;
            print_record(&record);
        }
        Command::Untrack {
            goal_id,
            package_name,
        } => {
            app_state.services.tracking.untrack(goal_id, &package_name)?;
            println!("Stopped tracking {} under goal {}", package_name, goal_id);
        }
        Command::Streak {
            goal_id,
            package_name,
        } => {
            let streak = app_state.services.usage.streak(goal_id, &package_name)?;
            println!("{}: {} day(s) within limit", package_name, streak);
        }
        Command::History { goal_id, range } => {
            let usage = &app_state.services.usage;
            let records = usage.range(goal_id, &range)?.current()?;
            for record in &records {
                print_record(record);
            }
            match usage.average(goal_id, &range)? {
                Some(average) => println!("average {:.1} min/day", average),
                None => println!("no usage recorded in range"),
            }
            if let Some(date) = usage.last_compliant(goal_id)? {
                println!("last day within limit: {}", date);
            }
        }
        Command::Help => args::print_help(),
    }
    Ok(())
}

fn open_app(cli: &config::CliConfig, paths: &AppPaths) -> Result<AppState, io::Error> {
    let log_path = cli
        .foreground_log
        .clone()
        .unwrap_or_else(|| paths.foreground_log_path.clone());
    let access = select_access(
        cli.platform_version,
        Arc::new(host::ConfigHost::new(cli.usage_access)),
    );
    let source = UsageDataSource::new(
        Some(Arc::new(ForegroundLogProvider::new(log_path))),
        access,
    );
    let labels = cli
        .labels
        .iter()
        .map(|(package, label)| (package.clone(), label.clone()))
        .collect::<StaticLabels>();
    AppState::open(
        AppConfig {
            db_path: paths.db_path.clone(),
        },
        source,
        Arc::new(labels),
    )
    .map_err(|err| io::Error::other(format!("failed to initialize database: {}", err)))
}

fn describe_status(status: &UsageStatus) -> String {
    match status {
        UsageStatus::PermissionMissing => "usage access not granted".to_string(),
        UsageStatus::NoData => "no data today".to_string(),
        UsageStatus::WithinLimit { used, limit } => format!("{}/{} min, within limit", used, limit),
        UsageStatus::OverLimit { used, limit } => format!("{}/{} min, over limit", used, limit),
    }
}

fn print_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Success(stats) => {
            println!(
                "Reconciled {} pair(s): {} updated, {} skipped, {} failed",
                stats.pairs_total, stats.records_upserted, stats.pairs_skipped, stats.pairs_failed
            );
            for issue in &stats.issues {
                println!(
                    "  goal {} {}: {}",
                    issue.goal_id, issue.package_name, issue.message
                );
            }
        }
        JobOutcome::Failed { message } => println!("Reconciliation failed: {}", message),
        JobOutcome::SkippedNoPermission => {
            println!("Skipped: usage access is not granted (set usage_access in config.toml)")
        }
        JobOutcome::SkippedNothingTracked => println!("Skipped: nothing is tracked"),
    }
}

fn print_record(record: &UsageRecord) {
    println!(
        "{}  goal {:>3}  {:<32} {:>4}/{:<4} min  {}",
        record.usage_date,
        record.goal_id,
        record.app_name,
        record.duration_minutes,
        record.daily_limit_minutes,
        if record.is_compliant() { "ok" } else { "over" }
    );
}
