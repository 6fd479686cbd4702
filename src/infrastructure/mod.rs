pub mod upstream;

pub use upstream::{CoinGeckoSource, PriceFetcher, QuoteSource};
