mod output;
mod plot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use risk_core::config::YEAR_RANGE;
use risk_core::pipeline::PipelineInputs;
use risk_core::PipelineConfig;
use risk_ingestion::{benchmark, employment, taxonomy, tool_sources, CachingHttpFetcher};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "risk-cli", about = "AI occupational replacement risk pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: fetch/load inputs, compute every stage, write outputs.
    Run {
        /// Directory holding the three taxonomy TSVs (tasks.tsv, ratings.tsv, occupations.tsv).
        #[arg(long)]
        taxonomy_dir: PathBuf,

        /// Directory holding per-year employment workbooks, named
        /// `industry_<year>.xlsx` and `national_<year>.xlsx`.
        #[arg(long)]
        employment_dir: PathBuf,

        /// URL of the compiled leaderboard asset blob.
        #[arg(long)]
        benchmark_url: String,

        /// Path to the gold task-prompt CSV.
        #[arg(long)]
        gold_prompts: PathBuf,

        /// Source A index page URL.
        #[arg(long)]
        tool_a_index_url: Option<String>,
        /// Source A data base URL (paired with `tool_a_index_url`).
        #[arg(long)]
        tool_a_data_base_url: Option<String>,
        /// Source B paginated API base URL.
        #[arg(long)]
        tool_b_base_url: Option<String>,
        /// Source C Markdown README URL.
        #[arg(long)]
        tool_c_readme_url: Option<String>,

        /// Directory for the HTTP fetch disk cache.
        #[arg(long, default_value = "data/tool_cache")]
        tool_cache_dir: PathBuf,

        /// Bypass the fetch cache.
        #[arg(long)]
        force_refresh: bool,

        /// Cap on tool-detail fetches for source A.
        #[arg(long)]
        detail_limit: Option<usize>,

        /// Output directory for CSV/JSON artifacts.
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Optional sector-risk bar chart PNG path.
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            taxonomy_dir,
            employment_dir,
            benchmark_url,
            gold_prompts,
            tool_a_index_url,
            tool_a_data_base_url,
            tool_b_base_url,
            tool_c_readme_url,
            tool_cache_dir,
            force_refresh,
            detail_limit,
            out_dir,
            chart,
        } => {
            let fetcher = CachingHttpFetcher::new(&tool_cache_dir, force_refresh);

            eprintln!("Crawling tool sources…");
            let mut raw_tools = Vec::new();
            if let (Some(index_url), Some(data_base_url)) = (tool_a_index_url, tool_a_data_base_url) {
                raw_tools.extend(
                    tool_sources::crawl_source_a(&fetcher, &index_url, &data_base_url, detail_limit)
                        .await
                        .context("crawling tool source A")?,
                );
            }
            if let Some(base_url) = tool_b_base_url {
                raw_tools.extend(
                    tool_sources::crawl_source_b(&fetcher, &base_url, 50)
                        .await
                        .context("crawling tool source B")?,
                );
            }
            if let Some(readme_url) = tool_c_readme_url {
                raw_tools.extend(
                    tool_sources::crawl_source_c(&fetcher, &readme_url)
                        .await
                        .context("crawling tool source C")?,
                );
            }
            eprintln!("  {} raw tool rows", raw_tools.len());

            eprintln!("Loading taxonomy…");
            let raw_task_rows = taxonomy::load_task_text(&taxonomy_dir.join("tasks.tsv")).context("loading task text")?;
            let raw_rating_rows =
                taxonomy::load_task_ratings(&taxonomy_dir.join("ratings.tsv")).context("loading task ratings")?;
            let occupations =
                taxonomy::load_occupations(&taxonomy_dir.join("occupations.tsv")).context("loading occupations")?;
            eprintln!(
                "  {} task rows, {} rating rows, {} occupations",
                raw_task_rows.len(),
                raw_rating_rows.len(),
                occupations.len()
            );

            eprintln!("Loading employment workbooks for {}..={}…", YEAR_RANGE.start(), YEAR_RANGE.end());
            let mut emp_records = Vec::new();
            for year in YEAR_RANGE {
                let industry_path = employment_dir.join(format!("industry_{year}.xlsx"));
                if industry_path.exists() {
                    emp_records.extend(
                        employment::load_industry_occupation(&industry_path, year)
                            .with_context(|| format!("loading {}", industry_path.display()))?,
                    );
                }
                let national_path = employment_dir.join(format!("national_{year}.xlsx"));
                if national_path.exists() {
                    emp_records.extend(
                        employment::load_national_occupation(&national_path, year)
                            .with_context(|| format!("loading {}", national_path.display()))?,
                    );
                }
            }
            eprintln!("  {} employment records", emp_records.len());

            eprintln!("Fetching benchmark asset…");
            let benchmark_blob = benchmark::fetch_benchmark_blob(&fetcher, &benchmark_url)
                .await
                .context("fetching benchmark blob")?;
            let gold_prompts = benchmark::load_gold_prompts(&gold_prompts).context("loading gold prompts")?;
            eprintln!("  {} gold prompts", gold_prompts.len());

            let inputs = PipelineInputs {
                raw_tools,
                raw_task_rows,
                raw_rating_rows,
                occupations,
                employment: emp_records,
                benchmark_blob,
                gold_prompts,
            };
            let config = PipelineConfig::default();

            eprintln!("Running pipeline…");
            let result = tokio::task::spawn_blocking(move || risk_core::run(inputs, &config))
                .await
                .context("pipeline task panicked")?
                .context("running pipeline")?;

            output::write_all(&out_dir, &result).context("writing outputs")?;
            println!("Wrote pipeline outputs to {}", out_dir.display());

            if let Some(chart_path) = chart {
                if let Some(best) = risk_core::engine::risk_composer::best_model(&result.national_risk) {
                    plot::render_sector_risk_chart(&result.sector_risk, &best.model_id, &chart_path)
                        .context("rendering sector risk chart")?;
                    println!("Wrote chart {}", chart_path.display());
                }
            }
        }
    }

    Ok(())
}
