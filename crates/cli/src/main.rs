use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use firecheck_checklist::{ChecklistTree, Findings, MergeKey, extract, merge, tree_modified};

#[derive(Parser)]
#[command(name = "firecheck")]
#[command(about = "Vehicle inventory checklist tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a session tree with its template and previous submission
    Merge {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        session: PathBuf,
        /// Merged tree of the latest submission
        #[arg(long)]
        previous: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = KeyArg::Id)]
        key: KeyArg,
    },
    /// List defects and progress figures of a tree
    Defects {
        #[arg(long)]
        tree: PathBuf,
        /// Print summary lines instead of JSON
        #[arg(long)]
        lines: bool,
    },
    /// Check sibling id uniqueness and item field shapes
    Validate {
        #[arg(long)]
        tree: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyArg {
    Id,
    Position,
}

impl From<KeyArg> for MergeKey {
    fn from(value: KeyArg) -> Self {
        match value {
            KeyArg::Id => MergeKey::Id,
            KeyArg::Position => MergeKey::Position,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeOutput {
    modified: bool,
    merged_tree: ChecklistTree,
    findings: Findings,
}

fn main() -> Result<()> {
    firecheck_observability::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            template,
            session,
            previous,
            key,
        } => merge_command(&template, &session, previous.as_deref(), key.into()),
        Commands::Defects { tree, lines } => defects_command(&tree, lines),
        Commands::Validate { tree } => {
            read_tree(&tree)?.validate()?;
            println!("{} is valid", tree.display());
            Ok(())
        }
    }
}

fn read_tree(path: &Path) -> Result<ChecklistTree> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn merge_command(
    template: &Path,
    session: &Path,
    previous: Option<&Path>,
    key: MergeKey,
) -> Result<()> {
    let template = read_tree(template)?;
    let session = read_tree(session)?;
    let previous = previous.map(read_tree).transpose()?;

    let modified = tree_modified(&session, &template, key);
    if !modified {
        tracing::warn!("session does not differ from the template");
    }
    let merged_tree = merge(&template, previous.as_ref(), &session, key);
    merged_tree.validate()?;
    let findings = extract(&merged_tree);

    let output = MergeOutput {
        modified,
        merged_tree,
        findings,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn defects_command(tree: &Path, lines: bool) -> Result<()> {
    let findings = extract(&read_tree(tree)?);
    if lines {
        for defect in &findings.defects {
            println!("{}", defect.summary_line());
        }
        println!("{}% complete", findings.progress.percent_complete);
    } else {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    }
    Ok(())
}
