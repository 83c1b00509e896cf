//! Survey Shift CLI - Before/after Likert survey analysis
//!
//! # Main Commands
//!
//! ```bash
//! survey-shift run --config survey.toml        # Full analysis, all artefacts
//! survey-shift example-config > survey.toml    # Default configuration
//! ```
//!
//! # Single Analyses
//!
//! ```bash
//! survey-shift transitions pre.csv post.csv    # Before/after transition table
//! survey-shift compare post.csv                # Chi-square, Group 1 vs Group 2
//! survey-shift summary pre.csv post.csv        # Per-item Likert distributions
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use survey_shift::{
    export::{write_chi_square_csv, write_contingency_csv, write_likert_csv},
    likert_summary, load_table, run, run_group_comparison, run_transitions, AnalysisConfig,
    Alignment, Binning, GroupComparison, NodeLayout, RespondentGroup, TransitionOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "survey-shift")]
#[command(about = "Analyze before/after Likert survey responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a before/after transition table and Sankey description
    Transitions {
        /// Sheet answered before the intervention
        before: PathBuf,

        /// Sheet answered after the intervention
        after: PathBuf,

        /// Response scale
        #[arg(short, long, value_enum, default_value = "five-point")]
        binning: BinningArg,

        /// How before/after responses are paired
        #[arg(short, long, value_enum, default_value = "source-row")]
        alignment: AlignmentArg,

        /// Column compared on both sheets (0-based)
        #[arg(short, long, default_value = "7")]
        column: usize,

        /// Respondent key column, required by --alignment key
        #[arg(short, long)]
        key_column: Option<usize>,

        /// Pin 3-point nodes (Disagree top, Agree bottom)
        #[arg(long)]
        pinned: bool,

        /// Write the transition table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output file for the Sankey JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two respondent groups with a chi-square test per question group
    Compare {
        /// Sheet holding every question group (usually the post sheet)
        input: PathBuf,

        /// Configuration supplying groups and column layout
        #[arg(long, env = "SURVEY_SHIFT_CONFIG")]
        config: Option<PathBuf>,

        /// Output CSV file (default: JSON on stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Per-item Likert distributions in figure order
    Summary {
        /// Sheet answered before the intervention
        before: PathBuf,

        /// Sheet answered after the intervention
        after: PathBuf,

        /// Output CSV file (default: JSON on stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the full analysis and write every artefact
    Run {
        /// TOML configuration (defaults apply when omitted)
        #[arg(short, long, env = "SURVEY_SHIFT_CONFIG")]
        config: Option<PathBuf>,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the default configuration as TOML
    ExampleConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum BinningArg {
    FivePoint,
    ThreePoint,
}

impl From<BinningArg> for Binning {
    fn from(arg: BinningArg) -> Self {
        match arg {
            BinningArg::FivePoint => Binning::FivePoint,
            BinningArg::ThreePoint => Binning::ThreePoint,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignmentArg {
    Dense,
    SourceRow,
    Key,
}

impl From<AlignmentArg> for Alignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Dense => Alignment::Dense,
            AlignmentArg::SourceRow => Alignment::SourceRow,
            AlignmentArg::Key => Alignment::Key,
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survey_shift=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transitions {
            before,
            after,
            binning,
            alignment,
            column,
            key_column,
            pinned,
            csv,
            output,
        } => {
            let layout = if pinned {
                NodeLayout::pinned_three_point()
            } else {
                NodeLayout::Auto
            };
            let options = TransitionOptions {
                binning: binning.into(),
                alignment: alignment.into(),
                before_column: column,
                after_column: column,
                key_column,
                layout,
            };
            cmd_transitions(&before, &after, &options, csv.as_deref(), output.as_deref())
        }

        Commands::Compare {
            input,
            config,
            output,
        } => cmd_compare(&input, config.as_deref(), output.as_deref()),

        Commands::Summary {
            before,
            after,
            output,
        } => cmd_summary(&before, &after, output.as_deref()),

        Commands::Run { config, output_dir } => cmd_run(config.as_deref(), output_dir),

        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transitions(
    before: &Path,
    after: &Path,
    options: &TransitionOptions,
    csv: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Before: {}", before.display());
    eprintln!("📄 After:  {}", after.display());

    let before = load_table(before)?;
    let after = load_table(after)?;
    eprintln!(
        "   Rows: {} before, {} after",
        before.table.height(),
        after.table.height()
    );

    let report = run_transitions(&before.table, &after.table, options)?;

    eprintln!("\n🔀 Transitions ({:?}, {:?} alignment):", options.binning, options.alignment);
    eprintln!(
        "   Valid: {} before, {} after",
        report.before_valid, report.after_valid
    );
    eprintln!(
        "   Dropped: {} before, {} after",
        report.before_dropped, report.after_dropped
    );
    eprintln!("   Pairs: {}", report.pairs);

    if let Some(path) = csv {
        write_contingency_csv(&report.table, "before", path)?;
        eprintln!("   💾 Table saved to: {}", path.display());
    }

    let json = serde_json::to_string_pretty(&report.diagram)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_compare(
    input: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let (group_a, group_b) = two_groups(&config.groups)?;

    eprintln!("📊 Comparing: {}", input.display());
    eprintln!(
        "   {} (rows {}..{}) vs {} (rows {}..{})",
        group_a.name, group_a.start, group_a.end, group_b.name, group_b.start, group_b.end
    );

    let sheet = load_table(input)?;
    let comparisons = run_group_comparison(
        &sheet.table,
        &config.instrument.question_groups(),
        group_a,
        group_b,
    )?;

    for comparison in &comparisons {
        eprintln!(
            "   {}: χ²({}) = {:.3}, p = {:.4}",
            comparison.question_group,
            comparison.result.degrees_of_freedom,
            comparison.result.statistic,
            comparison.result.p_value
        );
    }

    let records: Vec<_> = comparisons.iter().map(GroupComparison::record).collect();
    match output {
        Some(path) => {
            write_chi_square_csv(&records, path)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    Ok(())
}

fn two_groups(groups: &[RespondentGroup]) -> Result<(&RespondentGroup, &RespondentGroup), String> {
    match groups {
        [a, b, ..] => Ok((a, b)),
        _ => Err(format!(
            "Need two respondent groups to compare, found {}",
            groups.len()
        )),
    }
}

fn cmd_summary(
    before: &Path,
    after: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📊 Summarizing: {} / {}", before.display(), after.display());

    let before = load_table(before)?;
    let after = load_table(after)?;
    let summary = likert_summary(&Default::default(), &before.table, &after.table)?;

    eprintln!("   {} items", summary.items.len());

    match output {
        Some(path) => {
            write_likert_csv(&summary, path)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn cmd_run(
    config: Option<&Path>,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config {
        Some(path) => {
            eprintln!("⚙️  Config: {}", path.display());
            AnalysisConfig::load(path)?
        }
        None => {
            eprintln!("⚙️  Config: defaults");
            AnalysisConfig::default()
        }
    };
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    eprintln!("📄 Before: {}", config.before.display());
    eprintln!("📄 After:  {}", config.after.display());

    let summary = run(&config)?;

    eprintln!("\n📊 Chi-square:");
    for record in &summary.comparisons {
        eprintln!(
            "   {}: χ²({}) = {:.3}, p = {:.4}",
            record.question_group, record.degrees_of_freedom, record.statistic, record.p_value
        );
    }

    eprintln!(
        "\n💾 {} files written to: {}",
        summary.files.len(),
        config.output_dir.display()
    );
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    let toml = AnalysisConfig::default().to_toml()?;
    println!("{}", toml);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
