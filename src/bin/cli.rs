//! Outline synchronizer CLI
//!
//! Review a course translation pairing from the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use outline_sync::{
    error::{AppError, Result},
    models::{Config, Node, Outline, VersionId},
    outline::{self, NodePath},
    services::Synchronizer,
    utils::log as report,
};

/// outline-sync - course translation outline review
#[derive(Parser, Debug)]
#[command(
    name = "outline-sync",
    version,
    about = "Review and approve translated course outlines"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "outline-sync.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List base courses and their translated reruns
    Courses,

    /// Print the outline of a rerun with approval state
    Outline {
        /// Rerun course id
        rerun: String,

        /// Fetch the content of every unit before printing
        #[arg(long)]
        units: bool,
    },

    /// Approve everything eligible at or below a node
    Approve {
        /// Rerun course id
        rerun: String,

        /// `course_info` or `section[/subsection[/unit[/content]]]`
        path: NodePath,
    },

    /// Apply a historical version to a block
    Apply {
        /// Rerun course id
        rerun: String,

        /// Node path, see `approve`
        path: NodePath,

        /// Version id to apply
        #[arg(long)]
        version: VersionId,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    report::init(if cli.verbose { "debug" } else { &config.logging.level });

    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Courses => {
            let sync = Synchronizer::from_config(&config)?;
            let pairings = sync.course_pairings().await?;

            report::header("Course pairings");
            for pairing in &pairings {
                report::info(&format!(
                    "{} ({}) [{}]",
                    pairing.title,
                    pairing.id,
                    pairing.language.as_deref().unwrap_or("-")
                ));
                for rerun in pairing.rerun.values() {
                    report::sub_item(
                        0,
                        &format!(
                            "{} ({}) [{}]",
                            rerun.title,
                            rerun.id,
                            rerun.language.as_deref().unwrap_or("-")
                        ),
                    );
                }
            }
            report::summary(
                "Pairings",
                &[
                    ("Base courses", pairings.len().to_string()),
                    (
                        "Reruns",
                        pairings.iter().map(|p| p.rerun.len()).sum::<usize>().to_string(),
                    ),
                ],
            );
        }

        Command::Outline { rerun, units } => {
            let sync = Synchronizer::from_config(&config)?;
            let total = if units { 2 } else { 1 };

            report::step(1, total, &format!("Loading outline for {rerun}"));
            sync.load(&rerun).await?;
            if units {
                report::step(2, total, "Loading unit content");
                sync.load_all_units(&NodePath::course_info()).await?;
            }

            if let Some(outline) = sync.outline().await {
                print_outline(&outline);
            }
        }

        Command::Approve { rerun, path } => {
            let sync = Synchronizer::from_config(&config)?;
            sync.load(&rerun).await?;
            if !path.is_course_info() {
                let scope = unit_of(&path).unwrap_or_else(|| path.clone());
                sync.load_all_units(&scope).await?;
            }

            match sync.approve(&path).await {
                Ok(Some(count)) => report::info(&format!("Approved {count} blocks under {path}")),
                Ok(None) => {}
                Err(e @ AppError::EmptyApprovalSet(_)) => {
                    report::warn(&e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        Command::Apply {
            rerun,
            path,
            version,
        } => {
            let sync = Synchronizer::from_config(&config)?;
            sync.load(&rerun).await?;
            if let Some(unit) = unit_of(&path) {
                sync.load_all_units(&unit).await?;
            }

            sync.select_version(&path, version).await?;
            if sync.apply_version(&path).await? {
                report::info(&format!("Applied version {version} to {path}"));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}

/// Unit that has to be loaded before a content node can be addressed.
fn unit_of(path: &NodePath) -> Option<NodePath> {
    path.parent().filter(NodePath::is_unit)
}

fn print_outline(outline: &Outline) {
    fn marker(node: &Node) -> &'static str {
        if node.is_approved() {
            "[x]"
        } else if node.is_approval_eligible() {
            "[ ]"
        } else {
            "[-]"
        }
    }

    fn line(id: &str, node: &Node) -> String {
        let mut text = format!(
            "{} {} {} ({})",
            marker(node),
            id,
            node.display_name().unwrap_or(&node.usage_key),
            node.kind().as_str()
        );
        if let Some(vs) = node.version_status.as_ref().filter(|vs| vs.applied) {
            if let Some(version) = vs.applied_version {
                text.push_str(&format!(" v{version}"));
            }
        }
        let choices = outline::version_choices(node);
        if !choices.other.is_empty() {
            text.push_str(&format!(" (+{} versions)", choices.other.len()));
        }
        text
    }

    fn descend(id: &str, node: &Node, depth: usize) {
        report::sub_item(depth, &line(id, node));
        for (child_id, child) in node.child_map().into_iter().flatten() {
            descend(child_id, child, depth + 1);
        }
    }

    let tree = &outline.rerun;
    report::header(&line("course", &tree.course_info));
    for (id, section) in &tree.course_outline {
        descend(id, section, 0);
    }

    let stats = tree.stats();
    report::summary(
        "Outline",
        &[
            ("Sections", stats.sections.to_string()),
            ("Subsections", stats.subsections.to_string()),
            (
                "Units",
                format!("{} ({} loaded)", stats.units, stats.units_loaded),
            ),
            ("Contents", stats.contents.to_string()),
            ("Approved", stats.approved.to_string()),
            ("Eligible", stats.eligible.to_string()),
        ],
    );
}
