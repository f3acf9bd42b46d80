pub mod daily;
pub mod metrics;
pub mod observation;
pub mod station;

pub use daily::{DailyRecord, DailyRow};
pub use metrics::{MetricValue, StationHeatSummary, YearlyMetrics};
pub use observation::{normalize_value, ObsVariable, Observation, RawObservation};
pub use station::{locality_key, RawStation, Station};
