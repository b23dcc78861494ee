//! glreview: merge request line mapping and review ids from the command line.
//!
//! Entry point for the `glreview` binary. Loads `config.toml`, installs the
//! stderr log subscriber, and runs one subcommand against local files:
//!
//! - `hunks <diff-file>`: parse raw hunk text and list every line record.
//! - `added <old> <new>`: new line numbers added between two files.
//! - `map <old> <new> <old-line>`: new line for an old line.
//! - `ranges <old> <new>`: commentable lines on each side.
//! - `uri <path> <commit>`: the review resource id of a file version.
//! - `show <repo> <rev> <path>`: file content at a revision, through the
//!   review content provider.

mod config;
mod local;

use std::process::ExitCode;

use glreview_core::content::{ContentCache, ContentProvider};
use glreview_core::error::{ContentError, DiffError};
use glreview_core::hunk::parse_hunks;
use glreview_core::identity::{encode, review_identities, ChangeType, ReviewContext, ReviewIdentity};
use glreview_core::line_map::{added_lines_for_file, new_line_for_old_unchanged_line_within};
use glreview_core::ranges::{ranges_for, ReviewDocument};
use glreview_core::types::HunkLine;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

const USAGE: &str = "usage: glreview <hunks|added|map|ranges|uri|show> [args...]";

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Git(#[from] git2::Error),
}

fn read(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, CliError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("missing <{name}>\n{USAGE}")))
}

fn cmd_hunks(args: &[String]) -> Result<(), CliError> {
    let raw = read(arg(args, 0, "diff-file")?)?;
    for (i, hunk) in parse_hunks(&raw)?.iter().enumerate() {
        println!("hunk {} (-{} +{})", i + 1, hunk.old_start, hunk.new_start);
        for line in &hunk.lines {
            match line {
                HunkLine::Removed { old_line } => println!("  - {old_line:>5}      "),
                HunkLine::Added { new_line } => println!("  +       {new_line:>5}"),
                HunkLine::Unchanged { old_line, new_line } => println!("    {old_line:>5} {new_line:>5}"),
            }
        }
    }
    Ok(())
}

/// Reads `<old> <new>` and builds a one-file review context named after `<new>`.
fn load_pair(args: &[String], config: &Config) -> Result<(String, ReviewContext), CliError> {
    let old_path = arg(args, 0, "old")?;
    let new_path = arg(args, 1, "new")?;
    let old = read(old_path)?;
    let new = read(new_path)?;
    let ctx = local::local_context(new_path, &old, &new, config);
    debug!(diff = %ctx.version.diffs[0].diff, "local diff");
    Ok((new_path.to_owned(), ctx))
}

fn cmd_added(args: &[String], config: &Config) -> Result<(), CliError> {
    let (path, ctx) = load_pair(args, config)?;
    let added = added_lines_for_file(&ctx.version, &path)?;
    let list: Vec<String> = added.iter().map(u32::to_string).collect();
    println!("{}", list.join(" "));
    Ok(())
}

fn cmd_map(args: &[String], config: &Config) -> Result<(), CliError> {
    let (path, ctx) = load_pair(args, config)?;
    let line: u32 = arg(args, 2, "old-line")?
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| CliError::Usage("<old-line> must be a positive number".to_owned()))?;
    let old_len = u32::try_from(read(arg(args, 0, "old")?)?.lines().count()).unwrap_or(u32::MAX);
    match new_line_for_old_unchanged_line_within(&ctx.version, &path, line, old_len)? {
        Some(new_line) => println!("{new_line}"),
        None if line > old_len => println!("line {line} is past the end of the old file ({old_len} lines)"),
        None => println!("line {line} was removed"),
    }
    Ok(())
}

fn cmd_ranges(args: &[String], config: &Config) -> Result<(), CliError> {
    let (_, ctx) = load_pair(args, config)?;
    let (old_id, new_id) = review_identities(&ctx.version.diffs[0], &ctx);
    let old_doc = ReviewDocument::new(encode(&old_id), read(arg(args, 0, "old")?)?);
    let new_doc = ReviewDocument::new(encode(&new_id), read(arg(args, 1, "new")?)?);

    for (side, doc) in [("old", &old_doc), ("new", &new_doc)] {
        let ranges: Vec<String> = ranges_for(doc, &ctx)?
            .iter()
            .map(|r| if r.start == r.end { r.start.to_string() } else { format!("{}-{}", r.start, r.end) })
            .collect();
        println!("{side}: {}", ranges.join(","));
    }
    Ok(())
}

fn cmd_uri(args: &[String], config: &Config) -> Result<(), CliError> {
    let identity = ReviewIdentity {
        path: arg(args, 0, "path")?.to_owned(),
        exists: true,
        commit: Some(arg(args, 1, "commit")?.to_owned()),
        repository_root: std::env::current_dir()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_else(|_| ".".to_owned()),
        project_id: config.project_id,
        mr_id: config.mr_id,
        change_type: ChangeType::Modified,
    };
    println!("{}", encode(&identity));
    Ok(())
}

async fn cmd_show(args: &[String], config: &Config) -> Result<(), CliError> {
    // The repository handle is dropped before the provider runs.
    let (root, commit) = {
        let repo = git2::Repository::discover(arg(args, 0, "repo")?)?;
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_string_lossy()
            .into_owned();
        let commit = repo.revparse_single(arg(args, 1, "rev")?)?.peel_to_commit()?.id().to_string();
        (root, commit)
    };
    let identity = ReviewIdentity {
        path: arg(args, 2, "path")?.to_owned(),
        exists: true,
        commit: Some(commit),
        repository_root: root,
        project_id: config.project_id,
        mr_id: config.mr_id,
        change_type: ChangeType::Modified,
    };

    let api = local::OfflineApi;
    let mut cache = ContentCache::new();
    let text = ContentProvider::new(&api, &mut cache).provide(&encode(&identity)).await?;
    print!("{text}");
    Ok(())
}

async fn run(args: Vec<String>, config: &Config) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(CliError::Usage(USAGE.to_owned()));
    };
    info!(command = %command, "running");
    match command.as_str() {
        "hunks" => cmd_hunks(rest),
        "added" => cmd_added(rest, config),
        "map" => cmd_map(rest, config),
        "ranges" => cmd_ranges(rest, config),
        "uri" => cmd_uri(rest, config),
        "show" => cmd_show(rest, config).await,
        other => Err(CliError::Usage(format!("unknown command {other:?}\n{USAGE}"))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Config first: it decides the log level.
    let config = config::load();
    tracing_subscriber::fmt()
        .with_max_level(config.level())
        .with_writer(std::io::stderr)
        .init();

    match run(std::env::args().skip(1).collect(), &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("glreview: {e}");
            ExitCode::FAILURE
        }
    }
}
