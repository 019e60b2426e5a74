//! Market data: the validated bar feed and the providers that build it.

pub mod csv_import;
pub mod feed;
pub mod provider;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use feed::BarFeed;
pub use provider::{DataProvider, DataSource, FeedError, FeedRequest};
pub use yahoo::YahooProvider;
