use std::time::Instant;

use clap::{Parser, Subcommand};

use occ_corpus::{corpus, extract, meta, CorpusBuild, Record, Settings, TagMap, Value};

#[derive(Parser)]
#[command(name = "occ_corpus", about = "BERUFENET occupation XML to analysis tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the occupation corpus and show its field partitions
    Parse {
        /// Max preview rows
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Parse the occupation metadata dumps
    Meta {
        /// Max preview rows
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Corpus + metadata in one pipeline
    Run {
        /// Max preview rows
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Write records as JSON lines to stdout
    Export {
        /// Export one field partition instead of the whole corpus
        /// (the task field comes out exploded, one row per task)
        #[arg(short, long)]
        tag: Option<String>,
        /// Export metadata records instead of the corpus
        #[arg(long)]
        meta: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // logs go to stderr so `export` can stream records on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load();

    let result = match cli.command {
        Commands::Parse { limit } => run_parse(&settings, limit),
        Commands::Meta { limit } => run_meta(&settings, limit),
        Commands::Run { limit } => {
            let t_corpus = Instant::now();
            run_parse(&settings, limit)?;
            println!("\nCorpus phase took {:.1}s", t_corpus.elapsed().as_secs_f64());

            let t_meta = Instant::now();
            run_meta(&settings, limit)?;
            println!("\nMetadata phase took {:.1}s", t_meta.elapsed().as_secs_f64());
            Ok(())
        }
        Commands::Export { tag, meta } => run_export(&settings, tag.as_deref(), meta),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn build(settings: &Settings, tags: &TagMap) -> anyhow::Result<CorpusBuild> {
    let built = corpus::build_corpus(
        &settings.raw_data_dir,
        &settings.occ_prefix,
        tags,
        &settings.exclude_set(),
        &settings.columns,
    )?;
    Ok(built)
}

fn run_parse(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let tags = TagMap::berufenet();
    let built = build(settings, &tags)?;
    println!(
        "Corpus: {} files, {} skipped, {} rows, {} columns",
        built.files,
        built.skipped,
        built.table.len(),
        built.table.columns().len()
    );
    if built.table.is_empty() {
        println!("No documents found under {}.", settings.raw_data_dir.display());
        return Ok(());
    }

    let parts = built.table.partition_by_field(tags.tags());
    println!("\n{:<8} | {:>5} | {}", "field", "rows", "columns");
    println!("{}", "-".repeat(72));
    for (tag, part) in &parts {
        println!("{:<8} | {:>5} | {}", tag, part.len(), part.columns().join(", "));
    }

    let Some(field) = tags.list_field() else {
        return Ok(());
    };
    if let Some((_, part)) = parts.iter().find(|(tag, _)| *tag == field.tag) {
        let column = format!("{}{}", field.tag, extract::TEXT_SUFFIX);
        let tasks = part.explode(&column);
        println!("\n{} rows after exploding {}", tasks.len(), column);
        for (i, row) in tasks.rows().iter().take(limit).enumerate() {
            println!(
                "{:>3} | {:>7} | {:>4} | {}",
                i + 1,
                cell(row, &settings.columns.id),
                cell(row, &settings.columns.date),
                truncate(&cell(row, &column), 60)
            );
        }
    }
    Ok(())
}

fn run_meta(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let built = meta::build_meta(&settings.raw_data_dir, &settings.meta_prefix);
    println!(
        "Metadata: {} files, {} skipped, {} occupations",
        built.files,
        built.skipped,
        built.records.len()
    );
    if built.records.is_empty() {
        return Ok(());
    }

    println!("\n{:>8} | {:>6} | {:<28} | {:<12}", "dkz_id", "group", "kurzbezeichnung", "codenr");
    println!("{}", "-".repeat(64));
    for rec in built.records.iter().take(limit) {
        let group = rec.fuenfsteller.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:>8} | {:>6} | {:<28} | {:<12}",
            rec.dkz_id,
            group,
            truncate(rec.kurzbezeichnung.as_deref().unwrap_or("-"), 28),
            rec.codenr.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn run_export(settings: &Settings, tag: Option<&str>, export_meta: bool) -> anyhow::Result<()> {
    if export_meta {
        let built = meta::build_meta(&settings.raw_data_dir, &settings.meta_prefix);
        for rec in &built.records {
            println!("{}", serde_json::to_string(rec)?);
        }
        return Ok(());
    }

    let tags = TagMap::berufenet();
    let built = build(settings, &tags)?;
    let table = match tag {
        None => built.table,
        Some(tag) => {
            let mut parts = built.table.partition_by_field([tag]);
            let Some((_, part)) = parts.pop() else {
                anyhow::bail!("no columns for field {tag}");
            };
            if tags.list_field().is_some_and(|f| f.tag == tag) {
                part.explode(&format!("{}{}", tag, extract::TEXT_SUFFIX))
            } else {
                part
            }
        }
    };
    for row in table.rows() {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn cell(row: &Record, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::Int(v)) => v.to_string(),
        Some(Value::Text(s)) => s.clone(),
        Some(Value::List(items)) => items.join("; "),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
