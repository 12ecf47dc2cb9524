// 公开导出的模块，供外部使用
pub mod models;
pub mod sources;
pub mod services;
pub mod errors;
pub mod config;
pub mod logging;
pub mod util;

// 重新导出常用类型，方便使用
pub use models::stock::{StockRecord, NOT_AVAILABLE};
pub use sources::base::{Pause, StockSource};
pub use sources::yahoo::YahooScraper;
pub use sources::alpha_vantage::AlphaVantageClient;
pub use services::collector_service::CollectorService;
pub use logging::LogHandle;
pub use config::Config;
pub use errors::{Result, CollectorError};
