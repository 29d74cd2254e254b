use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use credit_lens::render::{self, DEFAULT_MAX_ROWS, OutputFormat};
use credit_lens::schema::columns;
use credit_lens::utils::logging::{abandon_load, finish_load, load_spinner};
use credit_lens::{CorrelationMethod, DashboardConfig, DatasetStore, FilterCommand, PAGES, Session};

#[derive(Parser, Debug)]
#[command(name = "credit-lens", version)]
#[command(about = "Filter a credit-application table and recompute the dashboard pages")]
struct Args {
    /// Application table (.csv or .parquet)
    #[arg(long)]
    data: PathBuf,
    /// JSON file overriding configuration defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Page number (1-5) or "all"
    #[arg(long, default_value = "all")]
    page: String,
    #[arg(long, value_delimiter = ',')]
    gender: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    education: Vec<String>,
    #[arg(long = "family-status", value_delimiter = ',')]
    family_status: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    housing: Vec<String>,
    #[arg(long = "income-bracket", value_delimiter = ',')]
    income_bracket: Vec<String>,
    /// Age range in years as MIN:MAX
    #[arg(long, value_parser = parse_range)]
    age: Option<(f64, f64)>,
    /// Employment tenure range in years as MIN:MAX
    #[arg(long, value_parser = parse_range)]
    employment: Option<(f64, f64)>,
    /// Drop rows with missing employment tenure
    #[arg(long, default_value_t = false)]
    exclude_unemployed: bool,
    /// Correlation method: spearman or pearson
    #[arg(long, value_parser = parse_method, default_value = "spearman")]
    method: CorrelationMethod,
    /// Features shown in the target-correlation chart (5-40)
    #[arg(long = "top-n")]
    top_n: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the filtered rows to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn parse_range(s: &str) -> Result<(f64, f64), String> {
    let (min, max) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX, got '{s}'"))?;
    let min: f64 = min.trim().parse().map_err(|e| format!("bad minimum '{min}': {e}"))?;
    let max: f64 = max.trim().parse().map_err(|e| format!("bad maximum '{max}': {e}"))?;
    Ok((min, max))
}

fn parse_method(s: &str) -> Result<CorrelationMethod, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_pages(s: &str) -> anyhow::Result<Vec<usize>> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(PAGES.iter().map(|p| p.number).collect());
    }
    let number: usize = s.parse().with_context(|| format!("invalid page '{s}'"))?;
    if !(1..=PAGES.len()).contains(&number) {
        bail!("page must be between 1 and {}, got {number}", PAGES.len());
    }
    Ok(vec![number])
}

fn commands(args: &Args) -> Vec<FilterCommand> {
    let mut out = Vec::new();
    let categories = [
        (columns::CODE_GENDER, &args.gender),
        (columns::NAME_EDUCATION_TYPE, &args.education),
        (columns::NAME_FAMILY_STATUS, &args.family_status),
        (columns::NAME_HOUSING_TYPE, &args.housing),
        (columns::INCOME_BRACKET, &args.income_bracket),
    ];
    for (column, values) in categories {
        if !values.is_empty() {
            out.push(FilterCommand::SetCategories {
                column: column.to_string(),
                values: values.clone(),
            });
        }
    }
    if let Some((min, max)) = args.age {
        out.push(FilterCommand::SetRange {
            column: columns::AGE_YEARS.to_string(),
            min,
            max,
        });
    }
    if let Some((min, max)) = args.employment {
        out.push(FilterCommand::SetRange {
            column: columns::EMPLOYMENT_YEARS.to_string(),
            min,
            max,
        });
    }
    if args.exclude_unemployed {
        out.push(FilterCommand::SetIncludeMissing {
            column: columns::EMPLOYMENT_YEARS.to_string(),
            include: false,
        });
    }
    out.push(FilterCommand::SetMethod(args.method));
    if let Some(top_n) = args.top_n {
        out.push(FilterCommand::SetTopN(top_n));
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let pages = parse_pages(&args.page)?;

    let config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => DashboardConfig::default().with_env_overrides(),
    };

    let start = Instant::now();
    let spinner = load_spinner(&args.data);
    let store = match DatasetStore::load_async(&args.data, config).await {
        Ok(store) => store,
        Err(e) => {
            abandon_load(&spinner);
            return Err(e).with_context(|| format!("loading {}", args.data.display()));
        }
    };
    finish_load(&spinner, &store.dataset());
    info!("Loaded dataset in {:?}", start.elapsed());

    let mut session = Session::from_store(&store);
    session
        .apply_all(commands(&args))
        .context("applying filters")?;

    if let Some(path) = &args.export {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let rows = session.export_csv(BufWriter::new(file))?;
        info!("Wrote {rows} rows to {}", path.display());
    }

    let reports = pages
        .into_iter()
        .map(|n| session.render_page(n))
        .collect::<credit_lens::Result<Vec<_>>>()?;

    match args.format {
        OutputFormat::Text => {
            print!("{}", render::dataset_summary(session.dataset()));
            for report in &reports {
                println!();
                print!("{}", render::render_text(report, DEFAULT_MAX_ROWS));
            }
        }
        OutputFormat::Json => println!("{}", render::render_json(&reports)?),
    }

    let stats = session.cache_stats();
    info!(
        "Done in {:?} (view cache {} hits / {} misses, chart cache {} hits / {} misses)",
        start.elapsed(),
        stats.view_hits,
        stats.view_misses,
        stats.chart_hits,
        stats.chart_misses
    );
    Ok(())
}
