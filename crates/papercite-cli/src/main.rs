//! papercite CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use papercite::OutputFormat;
use papercite::style::Layout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Reporter;

#[derive(Parser)]
#[command(name = "papercite")]
#[command(version)]
#[command(about = "Label-style citations and bibliographies for standards proposals", long_about = None)]
struct Cli {
    /// Print diagnostics as JSON, one object per line
    #[arg(long, global = true)]
    json_errors: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace citations in a Markdown document and append its bibliography
    Render {
        /// Markdown document
        document: PathBuf,

        /// CSL-JSON reference database
        #[arg(short, long)]
        bibliography: PathBuf,

        #[command(flatten)]
        style: StyleArgs,

        /// Write output to FILE instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the formatted bibliography of a reference database
    Bibliography {
        /// CSL-JSON reference database
        references: PathBuf,

        #[command(flatten)]
        style: StyleArgs,

        /// Only include these reference ids (all references by default)
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,
    },

    /// Validate a reference database and, optionally, the citations of a document
    Check {
        /// CSL-JSON reference database
        references: PathBuf,

        /// Markdown document whose citations must all resolve
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Style file to validate alongside the references
        #[arg(short, long)]
        style: Option<PathBuf>,
    },
}

/// Style selection shared by the formatting commands.
#[derive(clap::Args, Debug)]
struct StyleArgs {
    /// Style file (.toml, .yaml, .yml or .json)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Output format
    #[arg(short = 't', long, value_enum, default_value_t = FormatArg::Text)]
    to: FormatArg,

    /// Override the style's bibliography layout
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    HangingIndent,
    ColumnAligned,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::HangingIndent => Layout::HangingIndent,
            LayoutArg::ColumnAligned => Layout::ColumnAligned,
        }
    }
}

impl StyleArgs {
    fn options(&self) -> commands::StyleOptions {
        commands::StyleOptions {
            path: self.style.clone(),
            layout: self.layout.map(Into::into),
        }
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papercite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut reporter = Reporter::new(cli.json_errors);

    if let Err(err) = run(cli.command, &mut reporter) {
        reporter.report_error(&err);
        std::process::exit(1);
    }
}

fn run(command: Commands, reporter: &mut Reporter) -> Result<()> {
    match command {
        Commands::Render {
            document,
            bibliography,
            style,
            output,
        } => commands::render::execute(
            commands::render::RenderArgs {
                document,
                bibliography,
                style: style.options(),
                to: style.to.into(),
                output,
            },
            reporter,
        ),
        Commands::Bibliography {
            references,
            style,
            ids,
        } => commands::bibliography::execute(commands::bibliography::BibliographyArgs {
            references,
            style: style.options(),
            to: style.to.into(),
            ids,
        }),
        Commands::Check {
            references,
            document,
            style,
        } => commands::check::execute(
            commands::check::CheckArgs {
                references,
                document,
                style: commands::StyleOptions {
                    path: style,
                    layout: None,
                },
            },
            reporter,
        ),
    }
}
