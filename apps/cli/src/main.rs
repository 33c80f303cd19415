use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use docs_search_core::{bootstrap, interactive, SearchSession, ViewerConfig};
use indicatif::ProgressBar;
use output::{OutputFormat, Renderer};
use progress::spinner;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "docs-search",
    version,
    about = "Prefix search over generated API documentation search shards."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "markdown")]
    format: OutputFormat,
    /// Configuration file (defaults to ./docs-search.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the directory holding the `search/*.js` shards.
    #[arg(long, global = true)]
    shard_dir: Option<PathBuf>,
    /// Override the base URL links are resolved against.
    #[arg(long, global = true)]
    site_root: Option<String>,
    /// Disable ANSI colors in CLI output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators while shards load.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Look up every symbol starting with QUERY.
    Search {
        query: String,
        /// Maximum number of hits to display (0 = all).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the search keys starting with PREFIX.
    Keys {
        /// Key prefix; omit to list every key.
        prefix: Option<String>,
    },
    /// Report which shards were merged or rejected.
    Shards,
    /// Answer one query per stdin line with one JSON line on stdout.
    Interactive,
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = ViewerConfig::load(self.config.as_deref())
            .context("failed to load configuration")?;
        if let Some(dir) = &self.shard_dir {
            config.shard_dir = dir.clone();
        }
        if let Some(root) = &self.site_root {
            config.site_root = root.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    if let Command::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "docs-search", &mut std::io::stdout());
        return Ok(());
    }

    let config = cli.viewer_config()?;
    let session = load_session(&cli, config).await?;
    let renderer = Renderer::new(cli.format);

    match &cli.command {
        Command::Search { query, limit } => {
            let page = match limit {
                Some(limit) => session.search_with_limit(query, *limit),
                None => session.search(query),
            };
            renderer.search_page(&page)?;
        }
        Command::Keys { prefix } => {
            let prefix = prefix.as_deref().unwrap_or_default();
            let keys = session.keys(prefix);
            renderer.keys(prefix, &keys)?;
        }
        Command::Shards => {
            if !cli.quiet {
                renderer.load_report(session.report())?;
            }
        }
        Command::Interactive => {
            let answered = interactive::serve_stdio(&session).await?;
            info!(target: "docs_search_cli", answered, "interactive session closed");
        }
        Command::Completions { .. } => {}
    }

    Ok(())
}

async fn load_session(cli: &Cli, config: ViewerConfig) -> Result<SearchSession> {
    let label = format!("Loading shards from {}...", config.shard_dir.display());
    let spinner = spinner(cli.progress_enabled(), label);
    match bootstrap(config).await {
        Ok(session) => {
            let report = session.report();
            let message = if report.is_complete() {
                format!("Loaded {} shards", report.loaded.len())
            } else {
                format!(
                    "Loaded {} shards ({} rejected)",
                    report.loaded.len(),
                    report.rejected.len()
                )
            };
            finish_spinner(spinner, Some(message));
            Ok(session)
        }
        Err(error) => {
            finish_spinner(spinner, None);
            Err(error)
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,docs_search_cli=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod output {
    use std::fmt::Write;

    use anyhow::Result;
    use clap::ValueEnum;
    use docs_search_core::{markdown, KeySummary, SearchPage};
    use docs_search_index::LoadReport;
    use serde_json::json;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Table,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn search_page(&self, page: &SearchPage) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(page)?);
                }
                OutputFormat::Markdown => {
                    println!("{}", markdown::search_page(page));
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = page
                        .hits
                        .iter()
                        .map(|hit| {
                            vec![
                                hit.label.clone(),
                                truncate(hit.scope.as_deref().unwrap_or("-"), 60),
                                hit.url.clone(),
                            ]
                        })
                        .collect();
                    render_table(&["Label", "Scope", "Link"], &rows);
                    if page.truncated() {
                        println!("({} of {} matches shown)", page.hits.len(), page.total);
                    }
                }
                OutputFormat::Text => {
                    if page.hits.is_empty() {
                        println!("No matches for \"{}\".", page.query);
                    }
                    for hit in &page.hits {
                        match &hit.scope {
                            Some(scope) => println!("• {} ({}) — {}", hit.label, scope, hit.url),
                            None => println!("• {} — {}", hit.label, hit.url),
                        }
                    }
                    if page.truncated() {
                        println!("… {} more", page.total - page.hits.len());
                    }
                }
            }
            Ok(())
        }

        pub fn keys(&self, prefix: &str, keys: &[KeySummary]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload = json!({ "prefix": prefix, "keys": keys });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    println!("| Key | Results |");
                    println!("| --- | ---: |");
                    for entry in keys {
                        println!("| `{}` | {} |", entry.key, entry.results);
                    }
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = keys
                        .iter()
                        .map(|entry| vec![entry.key.clone(), entry.results.to_string()])
                        .collect();
                    render_table(&["Key", "Results"], &rows);
                }
                OutputFormat::Text => {
                    for entry in keys {
                        println!("{} ({})", entry.key, entry.results);
                    }
                }
            }
            Ok(())
        }

        pub fn load_report(&self, report: &LoadReport) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(report)?);
                }
                OutputFormat::Markdown => {
                    println!("| Shard | Status | Entries | Results |");
                    println!("| --- | --- | ---: | ---: |");
                    for summary in &report.loaded {
                        println!(
                            "| `{}` | loaded | {} | {} |",
                            summary.shard, summary.entries, summary.results
                        );
                    }
                    for rejected in &report.rejected {
                        println!(
                            "| `{}` | rejected: {} | - | - |",
                            rejected.shard,
                            sanitize(&rejected.reason)
                        );
                    }
                    println!();
                    println!(
                        "**Keys:** {} · **Results:** {}",
                        report.key_count, report.result_count
                    );
                }
                OutputFormat::Table => {
                    let mut rows: Vec<Vec<String>> = report
                        .loaded
                        .iter()
                        .map(|summary| {
                            vec![
                                summary.shard.to_string(),
                                "loaded".to_string(),
                                summary.entries.to_string(),
                                summary.results.to_string(),
                            ]
                        })
                        .collect();
                    rows.extend(report.rejected.iter().map(|rejected| {
                        vec![
                            rejected.shard.to_string(),
                            truncate(&format!("rejected: {}", sanitize(&rejected.reason)), 60),
                            "-".to_string(),
                            "-".to_string(),
                        ]
                    }));
                    render_table(&["Shard", "Status", "Entries", "Results"], &rows);
                }
                OutputFormat::Text => {
                    println!("Loaded at: {}", report.loaded_at);
                    println!("Shards loaded: {}", report.loaded.len());
                    println!("Shards rejected: {}", report.rejected.len());
                    for rejected in &report.rejected {
                        println!("  {}: {}", rejected.shard, rejected.reason);
                    }
                    println!("Keys: {}", report.key_count);
                    println!("Results: {}", report.result_count);
                }
            }
            Ok(())
        }
    }

    fn render_table(headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
        for row in rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        fn render_line(columns: &[&str], widths: &[usize]) -> String {
            let mut line = String::new();
            for (idx, value) in columns.iter().enumerate() {
                let width = widths[idx];
                let _ = write!(line, "| {:width$} ", value, width = width);
            }
            line.push('|');
            line
        }

        println!("{}", render_line(headers, &widths));
        let separator: String = widths
            .iter()
            .map(|width| format!("|{:-^1$}", "", width + 2))
            .collect::<Vec<_>>()
            .join("");
        println!("{separator}|");

        for row in rows {
            let cols: Vec<&str> = row.iter().map(String::as_str).collect();
            println!("{}", render_line(&cols, &widths));
        }
    }

    fn sanitize(value: &str) -> String {
        value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn truncate(value: &str, max: usize) -> String {
        if value.chars().count() <= max {
            value.to_string()
        } else {
            let mut truncated = value
                .chars()
                .take(max.saturating_sub(1))
                .collect::<String>();
            truncated.push('…');
            truncated
        }
    }

}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
