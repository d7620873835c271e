//! Salesdash CLI - Sales analytics over an order/seller CSV
//!
//! # Main Commands
//!
//! ```bash
//! salesdash serve --data main_data.csv          # Start HTTP server (port 3000)
//! salesdash summary main_data.csv               # Full dashboard as JSON
//! salesdash info main_data.csv                  # Columns and date bounds
//! ```
//!
//! # Single Views
//!
//! ```bash
//! salesdash daily main_data.csv --start 2017-01-01 --end 2017-12-31
//! salesdash categories main_data.csv --top 5
//! salesdash demographics main_data.csv --by city
//! salesdash rfm main_data.csv --sort monetary --top 10
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use salesdash::{
    best_performing, build_dashboard, category_quantity, customer_count, daily_orders,
    filter_by_date, load_dataset, rfm, AppConfig, Dataset, DateRange, LocationLevel,
    REQUIRED_COLUMNS,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salesdash")]
#[command(about = "Sales analytics dashboard over an order/seller dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Inclusive date filter, `YYYY-MM-DD`. Missing sides default to the dataset bounds.
#[derive(Args)]
struct RangeArgs {
    /// First day to include
    #[arg(long)]
    start: Option<String>,

    /// Last day to include
    #[arg(long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show columns, row counts and date bounds of a dataset
    Info {
        /// Input CSV file
        input: PathBuf,
    },

    /// Compute every dashboard view
    Summary {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Daily order count and revenue
    Daily {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Product categories ranked by quantity
    Categories {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Only the best and worst N categories
        #[arg(long)]
        top: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Customer count by seller state or city
    Demographics {
        /// Input CSV file
        input: PathBuf,

        /// Grouping level
        #[arg(long, value_enum, default_value = "state")]
        by: ByLocation,

        #[command(flatten)]
        range: RangeArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Recency, frequency and monetary metrics per seller
    Rfm {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Order sellers by one metric (best first)
        #[arg(long, value_enum)]
        sort: Option<RfmSort>,

        /// Keep only the first N sellers
        #[arg(long)]
        top: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Input CSV file (default: $SALESDASH_DATA)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Port to listen on (default: $SALESDASH_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ByLocation {
    State,
    City,
}

impl From<ByLocation> for LocationLevel {
    fn from(by: ByLocation) -> Self {
        match by {
            ByLocation::State => LocationLevel::State,
            ByLocation::City => LocationLevel::City,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RfmSort {
    Recency,
    Frequency,
    Monetary,
}

#[derive(Serialize)]
struct CategoriesOutput<'a> {
    best: &'a [salesdash::CategoryQuantity],
    worst: &'a [salesdash::CategoryQuantity],
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { input } => cmd_info(&input),

        Commands::Summary {
            input,
            range,
            output,
        } => cmd_summary(&input, &range, output.as_deref()),

        Commands::Daily {
            input,
            range,
            output,
        } => cmd_daily(&input, &range, output.as_deref()),

        Commands::Categories {
            input,
            range,
            top,
            output,
        } => cmd_categories(&input, &range, top, output.as_deref()),

        Commands::Demographics {
            input,
            by,
            range,
            output,
        } => cmd_demographics(&input, by.into(), &range, output.as_deref()),

        Commands::Rfm {
            input,
            range,
            sort,
            top,
            output,
        } => cmd_rfm(&input, &range, sort, top, output.as_deref()),

        Commands::Serve { data, port } => cmd_serve(data, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load(input: &Path) -> Result<Dataset, Box<dyn std::error::Error>> {
    eprintln!("📄 Loading: {}", input.display());

    let dataset = load_dataset(input)?;
    let info = dataset.info();
    eprintln!("   Encoding: {}", info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(info.delimiter));
    eprintln!("✅ Loaded {} transactions", dataset.len());
    if info.skipped_rows > 0 {
        eprintln!("   ⚠️  {} rows without approval date skipped", info.skipped_rows);
    }

    Ok(dataset)
}

/// Load the dataset and resolve the requested range against its bounds.
fn load_with_range(
    input: &Path,
    range: &RangeArgs,
) -> Result<(Dataset, Option<DateRange>), Box<dyn std::error::Error>> {
    let dataset = load(input)?;
    let range = DateRange::resolve(
        range.start.as_deref(),
        range.end.as_deref(),
        dataset.date_bounds(),
    )?;

    if let Some(r) = range {
        eprintln!("   Range: {} → {} ({} days)", r.start, r.end, r.num_days());
        let overlaps = dataset.date_bounds().and_then(|b| r.clamp_to(&b)).is_some();
        if !overlaps {
            eprintln!("   ⚠️  Range lies outside the dataset, views will be empty");
        }
    }

    Ok((dataset, range))
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load(input)?;
    let info = dataset.info();

    println!("Columns: {}", info.headers.join(", "));
    println!("Required:");
    for name in REQUIRED_COLUMNS {
        let resolved = salesdash::parser::resolve_column(&info.headers, name)
            .map(|i| info.headers[i].as_str())
            .unwrap_or("-");
        println!("  {:<24} ← {}", name, resolved);
    }
    println!("Rows: {} ({} skipped)", info.row_count, info.skipped_rows);

    match dataset.date_bounds() {
        Some(b) => println!("Dates: {} → {} ({} days)", b.start, b.end, b.num_days()),
        None => println!("Dates: no data"),
    }

    Ok(())
}

fn cmd_summary(
    input: &Path,
    range: &RangeArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, range) = load_with_range(input, range)?;
    let dashboard = build_dashboard(&dataset, range);

    eprintln!("\n📊 Total orders:  {}", dashboard.metrics.total_orders);
    eprintln!("   Total revenue: {}", dashboard.metrics.total_revenue);
    eprintln!("   Sellers:       {}", dashboard.metrics.seller_count);

    write_json(&dashboard, output)
}

fn cmd_daily(
    input: &Path,
    range: &RangeArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, range) = load_with_range(input, range)?;
    let rows = filter_by_date(&dataset, range.as_ref());
    write_json(&daily_orders(&rows), output)
}

fn cmd_categories(
    input: &Path,
    range: &RangeArgs,
    top: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, range) = load_with_range(input, range)?;
    let rows = filter_by_date(&dataset, range.as_ref());
    let ranked = category_quantity(&rows);

    match top {
        Some(n) => {
            let out = CategoriesOutput {
                best: best_performing(&ranked, n),
                worst: salesdash::worst_performing(&ranked, n),
            };
            write_json(&out, output)
        }
        None => write_json(&ranked, output),
    }
}

fn cmd_demographics(
    input: &Path,
    level: LocationLevel,
    range: &RangeArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, range) = load_with_range(input, range)?;
    let rows = filter_by_date(&dataset, range.as_ref());
    eprintln!("   Grouping by seller {}", level);

    let counts = salesdash::transform::sort_by_count(customer_count(&rows, level));
    write_json(&counts, output)
}

fn cmd_rfm(
    input: &Path,
    range: &RangeArgs,
    sort: Option<RfmSort>,
    top: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use salesdash::transform::{top_by_frequency, top_by_monetary, top_by_recency};

    let (dataset, range) = load_with_range(input, range)?;
    let rows = filter_by_date(&dataset, range.as_ref());
    let mut sellers = rfm(&rows);
    let n = top.unwrap_or(sellers.len());

    sellers = match sort {
        Some(RfmSort::Recency) => top_by_recency(&sellers, n),
        Some(RfmSort::Frequency) => top_by_frequency(&sellers, n),
        Some(RfmSort::Monetary) => top_by_monetary(&sellers, n),
        None => {
            sellers.truncate(n);
            sellers
        }
    };

    let averages = salesdash::rfm_averages(&sellers);
    eprintln!("   Sellers:       {}", sellers.len());
    eprintln!("   Avg recency:   {} days", averages.recency);
    eprintln!("   Avg frequency: {}", averages.frequency);
    eprintln!("   Avg monetary:  {}", averages.monetary);

    write_json(&sellers, output)
}

async fn cmd_serve(
    data: Option<PathBuf>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?.with_overrides(data, port);
    let path = config.require_data_path()?;

    let dataset = load(path)?;
    salesdash::server::start_server(dataset, config.port).await
}

fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(p) => {
            fs::write(p, &json)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}
