pub mod daily_csv;

pub use daily_csv::DailyCsvReader;
