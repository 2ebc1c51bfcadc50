use std::env;

use tracker_app::RangeParams;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run,
    Once { json: bool },
    GoalAdd {
        name: String,
        description: String,
        limit: Option<u32>,
    },
    GoalList,
    GoalRemove { goal_id: i64 },
    GoalLimit { goal_id: i64, minutes: u32 },
    Track { goal_id: i64, package_name: String },
    Untrack { goal_id: i64, package_name: String },
    Status { json: bool },
    Streak { goal_id: i64, package_name: String },
    History { goal_id: i64, range: RangeParams },
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    parse_from(env::args().skip(1))
}

pub fn parse_from<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };
    let mut rest = Rest { args };
    let parsed = match command.as_str() {
        "run" => Command::Run,
        "once" => Command::Once {
            json: rest.flag("--json")?,
        },
        "status" => Command::Status {
            json: rest.flag("--json")?,
        },
        "goal" => parse_goal(&mut rest)?,
        "track" => Command::Track {
            goal_id: rest.positional_id("goal id")?,
            package_name: rest.positional("package")?,
        },
        "untrack" => Command::Untrack {
            goal_id: rest.positional_id("goal id")?,
            package_name: rest.positional("package")?,
        },
        "streak" => Command::Streak {
            goal_id: rest.positional_id("goal id")?,
            package_name: rest.positional("package")?,
        },
        "history" => {
            let goal_id = rest.positional_id("goal id")?;
            let mut range = RangeParams::default();
            while let Some(arg) = rest.args.next() {
                match arg.as_str() {
                    "--range" => range.range = Some(rest.value("--range")?),
                    "--start" => range.start = Some(rest.value("--start")?),
                    "--end" => range.end = Some(rest.value("--end")?),
                    _ => return Err(format!("unknown argument: {arg}")),
                }
            }
            Command::History { goal_id, range }
        }
        "--help" | "-h" | "help" => Command::Help,
        _ => return Err(format!("unknown command: {command}")),
    };
    rest.finish()?;
    Ok(parsed)
}

fn parse_goal<I: Iterator<Item = String>>(rest: &mut Rest<I>) -> Result<Command, String> {
    let sub = rest.positional("goal subcommand")?;
    match sub.as_str() {
        "add" => {
            let name = rest.positional("goal name")?;
            let mut limit = None;
            let mut description = String::new();
            while let Some(arg) = rest.args.next() {
                match arg.as_str() {
                    "--limit" => limit = Some(parse_minutes(&rest.value("--limit")?)?),
                    "--description" => description = rest.value("--description")?,
                    _ => return Err(format!("unknown argument: {arg}")),
                }
            }
            Ok(Command::GoalAdd {
                name,
                description,
                limit,
            })
        }
        "list" => Ok(Command::GoalList),
        "remove" => Ok(Command::GoalRemove {
            goal_id: rest.positional_id("goal id")?,
        }),
        "limit" => {
            let goal_id = rest.positional_id("goal id")?;
            let minutes = parse_minutes(&rest.positional("minutes")?)?;
            Ok(Command::GoalLimit { goal_id, minutes })
        }
        _ => Err(format!("unknown goal subcommand: {sub}")),
    }
}

struct Rest<I> {
    args: I,
}

impl<I: Iterator<Item = String>> Rest<I> {
    fn positional(&mut self, what: &str) -> Result<String, String> {
        self.args.next().ok_or_else(|| format!("missing {what}"))
    }

    fn positional_id(&mut self, what: &str) -> Result<i64, String> {
        let value = self.positional(what)?;
        value
            .parse::<i64>()
            .map_err(|_| format!("invalid {what}: {value}"))
    }

    fn value(&mut self, flag: &str) -> Result<String, String> {
        self.args
            .next()
            .ok_or_else(|| format!("missing value for {flag}"))
    }

    fn flag(&mut self, flag: &str) -> Result<bool, String> {
        match self.args.next() {
            None => Ok(false),
            Some(arg) if arg == flag => Ok(true),
            Some(arg) => Err(format!("unknown argument: {arg}")),
        }
    }

    fn finish(mut self) -> Result<(), String> {
        match self.args.next() {
            None => Ok(()),
            Some(arg) => Err(format!("unexpected argument: {arg}")),
        }
    }
}

fn parse_minutes(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("invalid minutes value: {value}"))
}

const HELP: &str = "\
Usage Tracker CLI

Usage:
  usage-tracker <command>

Commands:
  run                          Reconcile periodically until Ctrl+C
  once [--json]                Reconcile once and print the outcome
  status [--json]              Today's status of every tracked app
  goal add <name> [--limit N] [--description D]
  goal list
  goal remove <id>
  goal limit <id> <minutes>    Daily limit applied to the goal's apps
  track <goal_id> <package>    Start tracking an app under a goal
  untrack <goal_id> <package>  Stop tracking (history is kept)
  streak <goal_id> <package>   Consecutive days within the limit
  history <goal_id> [--range R] [--start YYYY-MM-DD] [--end YYYY-MM-DD]
                               R: today, last7days, last14days, thismonth, alltime
  -h, --help                   Show this help message

Set RUST_LOG to change log verbosity.
";

pub fn print_help() {
    println!("{HELP}");
}
