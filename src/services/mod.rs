pub mod analyzer;
pub mod portfolio_scanner;

pub use analyzer::{analyze, strategy_hash, AnalyzeError};
pub use portfolio_scanner::PortfolioScanner;
