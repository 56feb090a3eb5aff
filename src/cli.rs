//! Argument parsing for the `bugtrack` binary.
//!
//! Hand-rolled: one command word, a few flags per command, and a global
//! `--json`. A token that follows a value-taking flag is always that flag's
//! value, never a global flag. Anything unexpected is a [`UsageError`].

use bugtrack_client::client::BugFilter;
use bugtrack_client::schema::{BugUpdate, NewBug, ParseEnumError};
use thiserror::Error;

/// Flags that consume the next token.
const VALUE_FLAGS: &[&str] = &[
    "--status",
    "--priority",
    "--assignee",
    "--limit",
    "--description",
    "--reporter",
    "--title",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Run(Args),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Check,
    Ping,
    List(BugFilter),
    Show { id: String },
    Create(NewBug),
    Update { id: String, patch: BugUpdate },
    Delete { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub json: bool,
    pub command: Command,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{command}: unknown flag {flag}")]
    UnknownFlag { command: &'static str, flag: String },
    #[error("{0} requires a value")]
    MissingValue(String),
    #[error("{command}: missing <{what}>")]
    MissingArgument { command: &'static str, what: &'static str },
    #[error("unexpected argument: {0}")]
    Unexpected(String),
    #[error("invalid --limit '{0}'")]
    InvalidLimit(String),
    #[error("update: nothing to change")]
    EmptyUpdate,
    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),
}

pub fn parse<I>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut json = false;
    let mut rest = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--help" | "-h" => return Ok(Invocation::Help),
            flag if VALUE_FLAGS.contains(&flag) => {
                rest.push(arg);
                rest.extend(args.next());
            }
            _ => rest.push(arg),
        }
    }

    let mut iter = rest.into_iter();
    let name = iter.next().ok_or(UsageError::MissingCommand)?;
    let command = match name.as_str() {
        "help" => return Ok(Invocation::Help),
        "check" => {
            no_more(iter)?;
            Command::Check
        }
        "ping" => {
            no_more(iter)?;
            Command::Ping
        }
        "list" => parse_list(iter)?,
        "show" => Command::Show { id: single_id("show", iter)? },
        "create" => parse_create(iter)?,
        "update" => parse_update(iter)?,
        "delete" => Command::Delete { id: single_id("delete", iter)? },
        _ => return Err(UsageError::UnknownCommand(name)),
    };

    Ok(Invocation::Run(Args { json, command }))
}

fn value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, UsageError> {
    iter.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| UsageError::MissingValue(flag.to_string()))
}

fn no_more(mut iter: impl Iterator<Item = String>) -> Result<(), UsageError> {
    match iter.next() {
        Some(extra) => Err(UsageError::Unexpected(extra)),
        None => Ok(()),
    }
}

fn single_id(command: &'static str, mut iter: impl Iterator<Item = String>) -> Result<String, UsageError> {
    let id = iter
        .next()
        .filter(|a| !a.starts_with("--"))
        .ok_or(UsageError::MissingArgument { command, what: "id" })?;
    no_more(iter)?;
    Ok(id)
}

fn parse_list(mut iter: impl Iterator<Item = String>) -> Result<Command, UsageError> {
    let mut filter = BugFilter::default();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--status" => filter.status = Some(value(&arg, &mut iter)?.parse()?),
            "--priority" => filter.priority = Some(value(&arg, &mut iter)?.parse()?),
            "--assignee" => filter.assigned_to = Some(value(&arg, &mut iter)?),
            "--limit" => {
                let raw = value(&arg, &mut iter)?;
                let n = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(UsageError::InvalidLimit(raw))?;
                filter.limit = Some(n);
            }
            _ => return Err(UsageError::UnknownFlag { command: "list", flag: arg }),
        }
    }
    Ok(Command::List(filter))
}

fn parse_create(mut iter: impl Iterator<Item = String>) -> Result<Command, UsageError> {
    let mut title = None;
    let mut description = None;
    let mut status = None;
    let mut priority = None;
    let mut assignee = None;
    let mut reporter = None;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--description" => description = Some(value(&arg, &mut iter)?),
            "--status" => status = Some(value(&arg, &mut iter)?.parse()?),
            "--priority" => priority = Some(value(&arg, &mut iter)?.parse()?),
            "--assignee" => assignee = Some(value(&arg, &mut iter)?),
            "--reporter" => reporter = Some(value(&arg, &mut iter)?),
            flag if flag.starts_with("--") => {
                return Err(UsageError::UnknownFlag { command: "create", flag: arg });
            }
            _ if title.is_none() => title = Some(arg),
            _ => return Err(UsageError::Unexpected(arg)),
        }
    }

    let title = title.ok_or(UsageError::MissingArgument { command: "create", what: "title" })?;
    let mut bug = NewBug::new(title);
    if let Some(d) = description {
        bug = bug.with_description(d);
    }
    if let Some(s) = status {
        bug = bug.with_status(s);
    }
    if let Some(p) = priority {
        bug = bug.with_priority(p);
    }
    if let Some(u) = assignee {
        bug = bug.with_assignee(u);
    }
    if let Some(u) = reporter {
        bug = bug.with_reporter(u);
    }
    Ok(Command::Create(bug))
}

fn parse_update(mut iter: impl Iterator<Item = String>) -> Result<Command, UsageError> {
    let mut id = None;
    let mut patch = BugUpdate::default();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" => patch = patch.title(value(&arg, &mut iter)?),
            "--description" => patch = patch.description(Some(value(&arg, &mut iter)?)),
            "--clear-description" => patch = patch.description(None),
            "--status" => patch = patch.status(value(&arg, &mut iter)?.parse()?),
            "--priority" => patch = patch.priority(value(&arg, &mut iter)?.parse()?),
            "--assignee" => patch = patch.assigned_to(Some(value(&arg, &mut iter)?)),
            "--unassign" => patch = patch.assigned_to(None),
            flag if flag.starts_with("--") => {
                return Err(UsageError::UnknownFlag { command: "update", flag: arg });
            }
            _ if id.is_none() => id = Some(arg),
            _ => return Err(UsageError::Unexpected(arg)),
        }
    }

    let id = id.ok_or(UsageError::MissingArgument { command: "update", what: "id" })?;
    if patch.is_empty() {
        return Err(UsageError::EmptyUpdate);
    }
    Ok(Command::Update { id, patch })
}

pub fn print_help() {
    eprintln!("usage: bugtrack [--json] <command> [args]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  check                      validate config and print the target URL");
    eprintln!("  ping                       check the REST endpoint is reachable");
    eprintln!("  list   [--status S] [--priority P] [--assignee U] [--limit N]");
    eprintln!("  show   <id>");
    eprintln!("  create <title> [--description D] [--status S] [--priority P]");
    eprintln!("                 [--assignee U] [--reporter U]");
    eprintln!("  update <id> [--title T] [--description D | --clear-description]");
    eprintln!("              [--status S] [--priority P] [--assignee U | --unassign]");
    eprintln!("  delete <id>");
    eprintln!();
    eprintln!("status:   open | in_progress | resolved | closed");
    eprintln!("priority: low | medium | high | critical");
    eprintln!();
    eprintln!("environment:");
    eprintln!("  PUBLIC_SUPABASE_URL, PUBLIC_SUPABASE_ANON_KEY   required (.env is read if present)");
    eprintln!("  BUGTRACK_CONFIG      TOML config path (default: config/default.toml)");
    eprintln!("  BUGTRACK_LOG_LEVEL   overrides [app].log_level");
}
