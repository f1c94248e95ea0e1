use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use tracing::info;

use navtree_diff::{diff_trees, DiffAction, NavDiff};
use navtree_render::{render_diff, RenderConfig, ViewHierarchy};
use navtree_tree::NavTree;
use navtree_types::NodeKey;

use crate::cli::*;
use crate::config::{CliConfig, OutputFormat};

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, config),
        Command::Validate(args) => cmd_validate(args, config),
        Command::Show(args) => cmd_show(args, config),
    }
}

/// Read a JSON tree file; `-` stands for an absent tree.
fn load_tree(path: &str) -> anyhow::Result<Option<NavTree>> {
    if path == "-" {
        return Ok(None);
    }
    read_tree(Path::new(path)).map(Some)
}

fn read_tree(path: &Path) -> anyhow::Result<NavTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading tree {}", path.display()))?;
    let tree = serde_json::from_str(&text)
        .with_context(|| format!("invalid tree {}", path.display()))?;
    info!(path = %path.display(), "loaded navigation tree");
    Ok(tree)
}

#[derive(Debug, Serialize)]
struct DiffReport {
    actions: Vec<DiffAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verified: Option<bool>,
}

fn cmd_diff(args: DiffArgs, config: &CliConfig) -> anyhow::Result<()> {
    let last = load_tree(&args.last)?;
    let current = load_tree(&args.current)?;
    let diff = diff_trees(last.as_ref(), current.as_ref());

    let verified = if args.verify {
        let render = if args.lenient {
            RenderConfig::lenient()
        } else {
            config.render.clone()
        };
        Some(verify_diff(&diff, last.as_ref(), current.as_ref(), render)?)
    } else {
        None
    };

    match config.format {
        OutputFormat::Json => {
            let report = DiffReport {
                actions: diff.into_actions(),
                verified,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if args.outline {
                let old = last.as_ref().map(NavTree::outline).unwrap_or_default();
                let new = current.as_ref().map(NavTree::outline).unwrap_or_default();
                for (tag, line) in outline_diff(&old, &new) {
                    match tag {
                        ChangeTag::Delete => println!("{}", format!("- {line}").red()),
                        ChangeTag::Insert => println!("{}", format!("+ {line}").green()),
                        ChangeTag::Equal => println!("  {line}"),
                    }
                }
                println!();
            }

            if diff.is_empty() {
                println!("No changes.");
            }
            for (i, action) in diff.iter().enumerate() {
                println!("{:>3}. {}", i + 1, styled_action(action));
            }

            match verified {
                Some(true) => println!("{} View model matches the current tree.", "✓".green().bold()),
                Some(false) => println!("{} View model diverges from the current tree.", "✗".red().bold()),
                None => {}
            }
        }
    }

    if verified == Some(false) {
        anyhow::bail!("replaying the diff did not reproduce the current tree");
    }
    Ok(())
}

/// Replay `diff` on a view model of `last` and compare it with `current`.
fn verify_diff(
    diff: &NavDiff,
    last: Option<&NavTree>,
    current: Option<&NavTree>,
    render: RenderConfig,
) -> anyhow::Result<bool> {
    let mut view = match last {
        Some(tree) => ViewHierarchy::from_tree(tree, render),
        None => ViewHierarchy::new(render),
    };
    render_diff(diff, &mut view).context("replaying diff on view model")?;
    Ok(match current {
        Some(tree) => view.structure_matches(tree),
        None => view.is_empty(),
    })
}

/// Line diff of two tree outlines.
fn outline_diff(old: &str, new: &str) -> Vec<(ChangeTag, String)> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .map(|change| (change.tag(), change.value().trim_end_matches('\n').to_string()))
        .collect()
}

fn styled_action(action: &DiffAction) -> String {
    let top = |parent: &Option<NodeKey>| {
        parent
            .as_ref()
            .map_or_else(|| "<top>".to_string(), NodeKey::to_string)
    };
    fn list(keys: &[NodeKey]) -> String {
        keys.iter().map(NodeKey::as_str).collect::<Vec<_>>().join(", ")
    }

    match action {
        DiffAction::Pop { node, parent } => {
            format!("{} {} from {}", "pop".red().bold(), node.as_str().yellow(), top(parent))
        }
        DiffAction::Push { node, parent } => {
            format!("{} {} onto {}", "push".green().bold(), node.as_str().yellow(), top(parent))
        }
        DiffAction::Changed {
            parent,
            popped,
            pushed,
        } => format!(
            "{} {}: popped [{}], children [{}]",
            "changed".cyan().bold(),
            top(parent).yellow(),
            list(popped).red(),
            list(pushed).green()
        ),
        DiffAction::ChangedActiveChild { parent, active } => match active {
            Some(active) => format!(
                "{} {} under {}",
                "activate".blue().bold(),
                active.as_str().yellow(),
                parent
            ),
            None => format!("{} under {}", "clear active".blue().bold(), parent),
        },
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct TreeSummary {
    root: String,
    nodes: usize,
    depth: usize,
    active_path: Vec<String>,
}

fn summarize(tree: &NavTree) -> TreeSummary {
    TreeSummary {
        root: tree.root().key().to_string(),
        nodes: tree.len(),
        depth: tree.depth(),
        active_path: tree
            .active_path()
            .iter()
            .map(|n| n.key().to_string())
            .collect(),
    }
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    file: String,
    #[serde(flatten)]
    outcome: ValidationOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ValidationOutcome {
    Valid(TreeSummary),
    Invalid { error: String },
}

fn cmd_validate(args: ValidateArgs, config: &CliConfig) -> anyhow::Result<()> {
    let reports: Vec<ValidationReport> = args
        .files
        .iter()
        .map(|path| ValidationReport {
            file: path.display().to_string(),
            outcome: match read_tree(path) {
                Ok(tree) => ValidationOutcome::Valid(summarize(&tree)),
                Err(e) => ValidationOutcome::Invalid {
                    error: format!("{e:#}"),
                },
            },
        })
        .collect();
    let failed = reports
        .iter()
        .filter(|r| matches!(r.outcome, ValidationOutcome::Invalid { .. }))
        .count();

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                match &report.outcome {
                    ValidationOutcome::Valid(s) => println!(
                        "{} {}: {} nodes, depth {}, active path {}",
                        "✓".green().bold(),
                        report.file.bold(),
                        s.nodes,
                        s.depth,
                        s.active_path.join(" > ").cyan()
                    ),
                    ValidationOutcome::Invalid { error } => {
                        println!("{} {}: {}", "✗".red().bold(), report.file.bold(), error)
                    }
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} trees failed validation", reports.len());
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: &CliConfig) -> anyhow::Result<()> {
    let tree = read_tree(&args.file)?;

    match config.format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Show<'a> {
                tree: &'a NavTree,
                #[serde(flatten)]
                summary: TreeSummary,
            }
            let show = Show {
                tree: &tree,
                summary: summarize(&tree),
            };
            println!("{}", serde_json::to_string_pretty(&show)?);
        }
        OutputFormat::Text => {
            let on_path: Vec<&NodeKey> = tree.active_path().iter().map(|n| n.key()).collect();
            for node in tree.pre_order() {
                let indent = "  ".repeat(node.depth());
                let label = if on_path.contains(&node.key()) {
                    node.key().as_str().green().bold()
                } else {
                    node.key().as_str().normal()
                };
                let marker = if node.is_active() { " *" } else { "" };
                println!("{indent}{label}{}", marker.yellow());
            }
            println!();
            let path: Vec<&str> = on_path.iter().map(|k| k.as_str()).collect();
            println!("Active path: {}", path.join(" > ").cyan());
        }
    }
    Ok(())
}
