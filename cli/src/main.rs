//! docflow CLI - batch text replacement and font normalization for Word documents

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docflow::{
    BatchEvent, BatchReport, DocFlow, DocxDocument, FileStatus, FontPolicy, ReplacementRule,
    RuleSet,
};

#[derive(Parser)]
#[command(name = "docflow")]
#[command(version)]
#[command(about = "Batch find/replace and font normalization for Word documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace text in every document of a folder and rename the outputs
    Replace {
        /// Folder holding the source documents
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Folder receiving the processed documents
        #[arg(value_name = "DEST")]
        dest: PathBuf,

        /// Replacement rule (repeatable, applied in order)
        #[arg(short = 'r', long = "rule", value_name = "OLD=NEW")]
        rules: Vec<String>,

        /// Rules file (JSON array or OLD=NEW lines)
        #[arg(long = "rules", value_name = "FILE")]
        rules_file: Option<PathBuf>,

        /// Also normalize fonts to this family
        #[arg(long, value_name = "NAME")]
        font: Option<String>,

        /// Body and table font size in points
        #[arg(long, value_name = "PT", env = "DOCFLOW_SIZE", default_value_t = 12.0)]
        size: f32,

        /// Footer font size in points
        #[arg(long, value_name = "PT", env = "DOCFLOW_FOOTER_SIZE", default_value_t = 8.0)]
        footer_size: f32,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Normalize fonts in every document of a folder
    Font {
        /// Folder holding the source documents
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Folder receiving the processed documents
        #[arg(value_name = "DEST")]
        dest: PathBuf,

        /// Font family
        #[arg(long, value_name = "NAME", env = "DOCFLOW_FONT", default_value = "Calibri")]
        font: String,

        /// Body and table font size in points
        #[arg(long, value_name = "PT", env = "DOCFLOW_SIZE", default_value_t = 12.0)]
        size: f32,

        /// Footer font size in points
        #[arg(long, value_name = "PT", env = "DOCFLOW_FOOTER_SIZE", default_value_t = 8.0)]
        footer_size: f32,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show document structure and fonts
    Inspect {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the document model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Process documents one at a time
    #[arg(long)]
    sequential: bool,

    /// Include documents in sub-folders
    #[arg(long)]
    recursive: bool,

    /// Write a JSON report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replace {
            source,
            dest,
            rules,
            rules_file,
            font,
            size,
            footer_size,
            run,
        } => cmd_replace(
            &source,
            &dest,
            &rules,
            rules_file.as_deref(),
            font.map(|f| (f, size, footer_size)),
            &run,
        ),
        Commands::Font {
            source,
            dest,
            font,
            size,
            footer_size,
            run,
        } => cmd_font(&source, &dest, &font, size, footer_size, &run),
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_rules(pairs: &[String], file: Option<&Path>) -> docflow::Result<RuleSet> {
    let mut rules = RuleSet::new(
        pairs
            .iter()
            .map(|pair| ReplacementRule::parse(pair))
            .collect::<docflow::Result<Vec<_>>>()?,
    )?;
    if let Some(path) = file {
        rules.extend(RuleSet::load(path)?);
    }
    Ok(rules)
}

fn cmd_replace(
    source: &Path,
    dest: &Path,
    pairs: &[String],
    rules_file: Option<&Path>,
    font: Option<(String, f32, f32)>,
    run: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = build_rules(pairs, rules_file)?;
    if rules.is_empty() && font.is_none() {
        return Err("no replacement rules given (use -r OLD=NEW or --rules FILE)".into());
    }

    let mut flow = DocFlow::new().with_rules(rules);
    if let Some((family, size, footer_size)) = font {
        flow = flow.with_font_policy(FontPolicy::new(family, size, footer_size)?);
    }
    run_flow(flow, source, dest, run)
}

fn cmd_font(
    source: &Path,
    dest: &Path,
    font: &str,
    size: f32,
    footer_size: f32,
    run: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = FontPolicy::new(font, size, footer_size)?;
    println!(
        "{} {} {}pt (footers {}pt)",
        "Normalizing to".cyan(),
        font,
        size,
        footer_size
    );
    run_flow(DocFlow::new().with_font_policy(policy), source, dest, run)
}

fn run_flow(
    mut flow: DocFlow,
    source: &Path,
    dest: &Path,
    run: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if run.sequential {
        flow = flow.sequential();
    }
    if run.recursive {
        flow = flow.recursive();
    }

    let report = run_with_progress(flow, source, dest)?;
    print_summary(&report);

    if let Some(path) = &run.report {
        report.save_json(path)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    if report.has_failures() {
        return Err(format!("{} of {} documents failed", report.failed(), report.total()).into());
    }
    Ok(())
}

fn run_with_progress(
    flow: DocFlow,
    source: &Path,
    dest: &Path,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let flow = flow.with_progress(tx);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let result = std::thread::scope(|scope| {
        let pb = &pb;
        scope.spawn(move || {
            for event in rx.iter() {
                match event {
                    BatchEvent::Started { total } => pb.set_length(total as u64),
                    BatchEvent::FileStarted { source } => pb.set_message(file_label(&source)),
                    BatchEvent::FileFinished(outcome) => {
                        if let FileStatus::Failed { reason, .. } = &outcome.status {
                            pb.println(format!("{} {}", "✗".red(), reason));
                        }
                        pb.inc(1);
                    }
                    BatchEvent::Finished { .. } => pb.finish_and_clear(),
                }
            }
        });

        let result = flow.run(source, dest);
        // Closes the channel so the progress thread exits.
        drop(flow);
        result
    });
    pb.finish_and_clear();

    Ok(result?)
}

fn print_summary(report: &BatchReport) {
    let headline = if report.has_failures() {
        "Finished with errors:".yellow().bold()
    } else {
        "Done!".green().bold()
    };
    println!("{} {}", headline, report.summary());

    for outcome in &report.files {
        match &outcome.status {
            FileStatus::Succeeded {
                output,
                replacements,
            } => println!(
                "  {} {} ({} replacements)",
                "├─".dimmed(),
                output.display(),
                replacements
            ),
            FileStatus::Failed { kind, reason } => println!(
                "  {} {} [{}] {}",
                "├─".dimmed(),
                file_label(&outcome.source).red(),
                kind,
                reason
            ),
            FileStatus::Skipped => println!(
                "  {} {} skipped",
                "├─".dimmed(),
                file_label(&outcome.source).yellow()
            ),
        }
    }
    println!(
        "  {} {:.1}s",
        "└─".dimmed(),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let docx = DocxDocument::open(input)?;
    let doc = docx.to_model()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Size".bold(), fs::metadata(input)?.len());
    println!("{}: {}", "Parts".bold(), docx.part_names().len());
    println!("{}: {}", "Footers".bold(), docx.footer_count());

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let runs: usize = doc.paragraphs().map(|p| p.run_count()).sum();
    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Runs".bold(), runs);
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    let mut fonts: BTreeMap<String, usize> = BTreeMap::new();
    let paragraphs = doc
        .paragraphs()
        .chain(doc.tables().flat_map(|t| t.cells().flat_map(|c| c.paragraphs.iter())))
        .chain(doc.footers.iter().flat_map(|f| f.paragraphs.iter()));
    for paragraph in paragraphs {
        for run in &paragraph.runs {
            let family = run.style.font_name.as_deref().unwrap_or("(inherited)");
            let label = match run.style.font_size {
                Some(size) => format!("{} {}pt", family, size),
                None => family.to_string(),
            };
            *fonts.entry(label).or_default() += 1;
        }
    }

    if !fonts.is_empty() {
        println!();
        println!("{}", "Fonts".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (font, count) in fonts {
            println!("{}: {} runs", font.bold(), count);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docflow".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Batch find/replace and font normalization for Word documents");
    println!();
    println!("License: MIT");
}
