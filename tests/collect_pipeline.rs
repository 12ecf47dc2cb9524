//! End-to-end collection against a local mock server: fetch, parse, collect,
//! save and read back.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use stock_collector::logging::MemoryLog;
use stock_collector::util::csv_utils;
use stock_collector::{
    AlphaVantageClient, CollectorService, Config, LogHandle, StockRecord, YahooScraper, NOT_AVAILABLE,
};

fn quote_page(symbol: &str, name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
<h1 class="D(ib) Fz(18px)">{name} ({symbol})</h1>
<fin-streamer data-field="regularMarketPrice" data-symbol="{symbol}">{price}</fin-streamer>
<fin-streamer data-field="regularMarketChange" data-symbol="{symbol}">-0.42</fin-streamer>
<table><tr><td data-test="MARKET_CAP-value">1.2T</td></tr></table>
</body></html>"#
    )
}

#[tokio::test]
async fn test_scrape_skips_failed_symbol_and_round_trips() {
    let mut server = mockito::Server::new_async().await;
    let _aapl = server
        .mock("GET", "/quote/AAPL")
        .with_status(200)
        .with_body(quote_page("AAPL", "Apple Inc.", "189.84"))
        .create_async()
        .await;
    let _bad = server
        .mock("GET", "/quote/BADSYM")
        .with_status(404)
        .create_async()
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let config = Config::new()
        .with_yahoo_base_url(&format!("{}/quote/", server.url()))
        .with_scrape_delay(Duration::ZERO, Duration::ZERO)
        .with_output_dir(dir.to_str().unwrap());

    let memory = MemoryLog::new();
    let log = LogHandle::new(memory.clone(), "it");
    let source = YahooScraper::new(&config, log.clone()).unwrap();
    let service = CollectorService::new(config, Arc::new(source), log);

    let symbols = vec!["AAPL".to_string(), "BADSYM".to_string()];
    let (path, records) = service.run(&symbols, Some("quotes.csv")).await.unwrap().unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.symbol, "AAPL");
    assert_eq!(record.name, "Apple Inc.");
    assert_eq!(record.price, "189.84");
    assert_eq!(record.change, "-0.42");
    assert_eq!(record.market_cap, "1.2T");
    assert_eq!(record.volume, NOT_AVAILABLE);
    assert_eq!(record.fields().len(), StockRecord::KEYS.len());

    assert_eq!(path, dir.join("quotes.csv"));
    let back = csv_utils::read_records_from_csv(&path).unwrap();
    assert_eq!(back, records);

    assert!(memory.contains("Status code 404 for BADSYM"));
    assert!(memory.contains("Skipping BADSYM"));
}

#[tokio::test]
async fn test_api_collects_and_merges() {
    let mut server = mockito::Server::new_async().await;
    let _quote_ok = server
        .mock("GET", "/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("function".into(), "GLOBAL_QUOTE".into()),
            Matcher::UrlEncoded("symbol".into(), "MSFT".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"Global Quote": {"05. price": "410.20", "06. volume": "19000000", "09. change": "2.10", "10. change percent": "0.5146%"}}"#)
        .create_async()
        .await;
    let _overview_ok = server
        .mock("GET", "/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("function".into(), "OVERVIEW".into()),
            Matcher::UrlEncoded("symbol".into(), "MSFT".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"Symbol": "MSFT", "Name": "Microsoft Corporation", "MarketCapitalization": "3050000000000", "PERatio": "36.1"}"#)
        .create_async()
        .await;
    let _quote_bad = server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("symbol".into(), "BADSYM".into()))
        .with_status(200)
        .with_body(r#"{"Error Message": "Invalid API call."}"#)
        .create_async()
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let config = Config::new()
        .with_api_key("demo")
        .with_alpha_vantage_base_url(&format!("{}/query", server.url()))
        .with_api_delay(Duration::ZERO)
        .with_output_dir(dir.to_str().unwrap());

    let log = LogHandle::silent();
    let source = AlphaVantageClient::new(&config, log.clone()).unwrap();
    let service = CollectorService::new(config, Arc::new(source), log);

    let symbols = vec!["BADSYM".to_string(), "MSFT".to_string()];
    let (path, records) = service.run(&symbols, None).await.unwrap().unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.symbol, "MSFT");
    assert_eq!(record.name, "MSFT");
    assert_eq!(record.price, "410.20");
    assert_eq!(record.market_cap, "3050000000000");
    assert_eq!(record.pe_ratio, "36.1");
    assert_eq!(record.source, "Alpha Vantage API");

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("stocks_api_data_"), "{}", name);
}

#[tokio::test]
async fn test_scrape_skips_symbol_when_page_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("out");
    let config = Config::new()
        .with_yahoo_base_url(&format!("http://{}/quote/", addr))
        .with_page_timeout(Duration::from_millis(50))
        .with_scrape_delay(Duration::ZERO, Duration::ZERO)
        .with_output_dir(dir.to_str().unwrap());

    let memory = MemoryLog::new();
    let log = LogHandle::new(memory.clone(), "it");
    let source = YahooScraper::new(&config, log.clone()).unwrap();
    let service = CollectorService::new(config, Arc::new(source), log);

    let outcome = service.run(&["AAPL".to_string()], None).await.unwrap();

    assert!(outcome.is_none());
    assert!(memory.contains("Error fetching data for AAPL"));
    assert!(memory.contains("Skipping AAPL"));
    assert!(!dir.exists());
}
