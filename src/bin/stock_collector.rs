use stock_collector::config::{self, Config, API_KEY_ENV, API_KEY_PLACEHOLDER};
use stock_collector::services::collector_service::CollectorService;
use stock_collector::sources::alpha_vantage::AlphaVantageClient;
use stock_collector::sources::base::StockSource;
use stock_collector::sources::yahoo::YahooScraper;
use stock_collector::util::{self, csv_utils};
use stock_collector::logging::LogHandle;

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use std::path::Path;
use std::sync::Arc;

fn symbols_arg() -> Arg<'static> {
    Arg::with_name("symbols")
        .short('s')
        .long("symbols")
        .value_name("SYMBOLS")
        .help("Comma separated symbols (default: AAPL,MSFT,GOOGL,AMZN,META,TSLA,NVDA,JPM,JNJ,V)")
        .takes_value(true)
}

fn output_dir_arg() -> Arg<'static> {
    Arg::with_name("output-dir")
        .short('o')
        .long("output-dir")
        .value_name("DIR")
        .help("Directory for CSV output")
        .takes_value(true)
        .default_value("data")
}

fn output_file_arg() -> Arg<'static> {
    Arg::with_name("output")
        .long("output")
        .value_name("FILE")
        .help("Output file name (default: timestamped)")
        .takes_value(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log = LogHandle::from_env("stock_collector");

    let app = App::new("StockCollector")
        .version("1.0.0")
        .about("Collects stock quotes by page scraping or API and saves them as CSV");

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enable debug mode")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("debug-limit")
                .long("debug-limit")
                .help("Limit the number of symbols to process in debug mode")
                .takes_value(true)
                .default_value("2"),
        );

    let app = app
        .subcommand(
            SubCommand::with_name("scrape")
                .about("Scrape quote pages")
                .arg(symbols_arg())
                .arg(output_dir_arg())
                .arg(output_file_arg()),
        )
        .subcommand(
            SubCommand::with_name("api")
                .about("Query the Alpha Vantage API")
                .arg(
                    Arg::with_name("api-key")
                        .short('k')
                        .long("api-key")
                        .value_name("KEY")
                        .help("Alpha Vantage API key (falls back to ALPHA_VANTAGE_API_KEY)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("no-overview")
                        .long("no-overview")
                        .help("Only request GLOBAL_QUOTE, skip the company overview")
                        .takes_value(false),
                )
                .arg(symbols_arg())
                .arg(output_dir_arg())
                .arg(output_file_arg()),
        )
        .subcommand(
            SubCommand::with_name("explore")
                .about("Print records from a saved CSV file")
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("FILE")
                        .help("CSV file to read")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Only show symbols containing this text")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_symbol_limit = matches.value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_symbol_limit = usize::MAX;

    let base_config = Config::new()
        .with_debug_mode(debug_mode)
        .with_debug_symbol_limit(debug_symbol_limit);

    let result = if let Some(matches) = matches.subcommand_matches("scrape") {
        let config = apply_output_args(base_config, matches);
        let source = YahooScraper::new(&config, log.clone())?;
        run_collection(config, Arc::new(source), matches, &log).await
    } else if let Some(matches) = matches.subcommand_matches("api") {
        let api_key = matches
            .value_of("api-key")
            .map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_else(|| API_KEY_PLACEHOLDER.to_string());

        let config = apply_output_args(base_config, matches)
            .with_api_key(&api_key)
            .with_include_overview(!matches.is_present("no-overview"));
        let source = AlphaVantageClient::new(&config, log.clone())?;
        run_collection(config, Arc::new(source), matches, &log).await
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        explore(matches, &log)
    } else {
        log.info(format_args!("No command specified. Use --help for usage information."));
        Ok(())
    };

    log.flush();
    result
}

fn apply_output_args(config: Config, matches: &ArgMatches) -> Config {
    match matches.value_of("output-dir") {
        Some(dir) => config.with_output_dir(dir),
        None => config,
    }
}

async fn run_collection(
    config: Config,
    source: Arc<dyn StockSource + Send + Sync>,
    matches: &ArgMatches,
    log: &LogHandle,
) -> anyhow::Result<()> {
    let symbols = match matches.value_of("symbols") {
        Some(raw) => config::parse_symbols(raw),
        None => config::default_symbols(),
    };
    if symbols.is_empty() {
        bail!("No symbols given");
    }
    let filename = matches.value_of("output");

    let service = CollectorService::new(config, source, log.clone());
    match service.run(&symbols, filename).await? {
        Some((path, records)) => {
            println!("\nData collected successfully!");
            println!("Saved to {}\n", path.display());
            println!("{}", util::render_table(&records));
        }
        None => {
            println!("No data collected.");
        }
    }
    Ok(())
}

fn explore(matches: &ArgMatches, log: &LogHandle) -> anyhow::Result<()> {
    let file = matches.value_of("file").context("--file is required")?;
    let symbol_filter = matches.value_of("symbol").map(str::to_uppercase);
    let limit = matches.value_of("limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);

    let records = csv_utils::read_records_from_csv(Path::new(file))
        .with_context(|| format!("Failed to read {}", file))?;
    log.info(format_args!("Found {} records in {}", records.len(), file));

    let filtered: Vec<_> = records
        .into_iter()
        .filter(|r| match &symbol_filter {
            Some(s) => r.symbol.contains(s.as_str()),
            None => true,
        })
        .collect();

    log.info(format_args!("Filtered to {} records", filtered.len()));

    let shown = &filtered[..filtered.len().min(limit)];
    println!("{}", util::render_table(shown));
    if filtered.len() > limit {
        println!("... and {} more records", filtered.len() - limit);
    }
    Ok(())
}
