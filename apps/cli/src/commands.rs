//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use dashtree_core::{DocumentPlan, Event, PagePlan, load_layout, plan_document};
use dashtree_shared::{
    AppConfig, BuildOptions, UnresolvedPolicy, config_file_path, init_config, load_config,
    load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// dashtree: organize dashboard content into pages and tabs.
#[derive(Parser)]
#[command(
    name = "dashtree",
    version,
    about = "Inspect how a dashboard layout is split into pages and nested tabs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.dashtree/dashtree.toml.
    #[arg(long, env = "DASHTREE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Fallback for deep items with no same-filter slot.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum PolicyArg {
    SharedContainer,
    EarliestCandidate,
}

impl From<PolicyArg> for UnresolvedPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::SharedContainer => Self::SharedContainer,
            PolicyArg::EarliestCandidate => Self::EarliestCandidate,
        }
    }
}

/// Options shared by the layout-inspecting commands.
#[derive(clap::Args)]
pub(crate) struct LayoutArgs {
    /// Layout document (JSON).
    pub layout: PathBuf,

    /// Only show this page (1-based).
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Override the configured unresolved-attachment policy.
    #[arg(long)]
    pub policy: Option<PolicyArg>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Summarize each page of a layout.
    Pages {
        #[command(flatten)]
        args: LayoutArgs,
    },

    /// Print the tab outline of each page.
    Outline {
        #[command(flatten)]
        args: LayoutArgs,
    },

    /// Print the renderer event stream as JSON lines.
    Events {
        #[command(flatten)]
        args: LayoutArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dashtree=info",
        1 => "dashtree=debug",
        _ => "dashtree=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Pages { args } => cmd_pages(&config, &args),
        Command::Outline { args } => cmd_outline(&config, &args),
        Command::Events { args } => cmd_events(&config, &args),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config, cli.config.as_deref()),
        },
    }
}

/// Load the layout and plan every page.
fn plan(config: &AppConfig, args: &LayoutArgs) -> Result<DocumentPlan> {
    let mut options = BuildOptions::from(config);
    if let Some(policy) = args.policy {
        options.unresolved_policy = policy.into();
    }

    let collection = load_layout(&args.layout)?;
    info!(
        layout = %args.layout.display(),
        items = collection.len(),
        policy = %options.unresolved_policy,
        "planning layout"
    );
    Ok(plan_document(&collection, &options)?)
}

/// The pages selected by `--page`, or all of them.
fn selected<'a>(plan: &'a DocumentPlan, page: Option<usize>) -> Result<Vec<&'a PagePlan>> {
    match page {
        None => Ok(plan.pages.iter().collect()),
        Some(n) => plan
            .pages
            .iter()
            .find(|p| p.page_index == n)
            .map(|p| vec![p])
            .ok_or_else(|| eyre!("page {n} out of range (1..={})", plan.pages.len())),
    }
}

fn cmd_pages(config: &AppConfig, args: &LayoutArgs) -> Result<()> {
    let plan = plan(config, args)?;

    println!();
    for page in selected(&plan, args.page)? {
        println!(
            "  Page {}/{}: {} leaves, depth {}, {} unresolved",
            page.page_index,
            page.total_pages,
            page.tree.leaf_count(),
            page.tree.depth(),
            page.unresolved.len(),
        );
        for unresolved in &page.unresolved {
            println!("    ! {unresolved}");
        }
    }
    if plan.single_page {
        println!("  (no pagination markers: single artifact)");
    }
    println!();

    Ok(())
}

fn cmd_outline(config: &AppConfig, args: &LayoutArgs) -> Result<()> {
    let plan = plan(config, args)?;

    for page in selected(&plan, args.page)? {
        println!("== Page {}/{}", page.page_index, page.total_pages);
        print!("{}", render_outline(&page.events()));
    }

    Ok(())
}

fn cmd_events(config: &AppConfig, args: &LayoutArgs) -> Result<()> {
    let plan = plan(config, args)?;

    for page in selected(&plan, args.page)? {
        for event in page.events() {
            let line = serde_json::json!({ "page": page.page_index, "event": event });
            println!("{line}");
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    println!("# {}", path.display());
    let content = toml::to_string_pretty(config)
        .map_err(|e| eyre!("failed to serialize config: {e}"))?;
    println!("{content}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Outline rendering
// ---------------------------------------------------------------------------

/// Indented text outline of an event stream. Tabs show their label; leaves
/// show a short description of their payload.
fn render_outline(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    let mut indent = 0usize;

    for event in events {
        match event {
            Event::OpenTab { name, label, .. } => {
                out.push_str(&"  ".repeat(indent));
                if label == name {
                    out.push_str(&format!("[{label}]\n"));
                } else {
                    out.push_str(&format!("[{label}] ({name})\n"));
                }
                indent += 1;
            }
            Event::CloseTab => indent = indent.saturating_sub(1),
            Event::RenderPayload { item } => {
                out.push_str(&"  ".repeat(indent));
                out.push_str(&format!("- #{} {}\n", item.insertion_index, describe(&item.payload)));
            }
        }
    }

    out
}

fn describe(payload: &serde_json::Value) -> String {
    let text = match payload.get("type").and_then(|t| t.as_str()) {
        Some(kind) => kind.to_string(),
        None => payload.to_string(),
    };
    if text.chars().count() > 48 {
        let short: String = text.chars().take(47).collect();
        format!("{short}…")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashtree_shared::ContentItem;
    use serde_json::json;

    #[test]
    fn outline_indents_nested_tabs() {
        let mut item = ContentItem::new(json!({ "type": "bar" }));
        item.insertion_index = 3;
        let events = vec![
            Event::OpenTab {
                name: "sis",
                label: "Siblings",
                depth: 1,
            },
            Event::OpenTab {
                name: "age",
                label: "age",
                depth: 2,
            },
            Event::RenderPayload { item: &item },
            Event::CloseTab,
            Event::CloseTab,
        ];

        assert_eq!(
            render_outline(&events),
            "[Siblings] (sis)\n  [age]\n    - #3 bar\n"
        );
    }

    #[test]
    fn describe_truncates_long_payloads() {
        let long = json!({ "text": "x".repeat(100) });
        assert!(describe(&long).ends_with('…'));
        assert_eq!(describe(&json!({ "type": "table" })), "table");
    }
}
