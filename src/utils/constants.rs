/// NOAA Climate Data Online v2 API
pub const CDO_BASE_URL: &str = "https://www.ncei.noaa.gov/cdo-web/api/v2";
pub const USER_AGENT: &str = "heat-atlas/1.0";

/// Observation datatype identifiers
pub const DATATYPE_TMAX: &str = "TMAX";
pub const DATATYPE_TMIN: &str = "TMIN";

/// Pagination: CDO offsets are 1-based
pub const PAGE_SIZE: u64 = 1000;
pub const FIRST_OFFSET: u64 = 1;

/// Raw value screening: at or below the floor is a missing-data sentinel;
/// above the magnitude threshold the value is tenths of a degree
pub const SENTINEL_FLOOR: f64 = -9000.0;
pub const SCALED_MAGNITUDE_THRESHOLD: f64 = 200.0;

/// Heat thresholds (degrees Celsius)
pub const HOT_DAY_C: f64 = 32.0;
pub const VERY_HOT_DAY_C: f64 = 35.0;
pub const WARM_NIGHT_C: f64 = 24.0;

/// Quality filter: minimum valid days for a year to qualify
pub const MIN_DAYS_PER_YEAR: usize = 200;

/// Transport defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_SLEEP_SECS: f64 = 0.2;

/// Acquisition CSV columns, in order
pub const CSV_COLUMNS: [&str; 9] = [
    "STATION",
    "NAME",
    "LATITUDE",
    "LONGITUDE",
    "ELEVATION",
    "DATE",
    "TMAX",
    "TMIN",
    "TOBS",
];

/// Metric names in the GeoJSON output
pub const METRIC_HOT_DAYS_32: &str = "hot_days_32";
pub const METRIC_HOT_DAYS_35: &str = "hot_days_35";
pub const METRIC_WARM_NIGHTS_24: &str = "warm_nights_24";
pub const METRIC_OPPRESSIVE_DAYS: &str = "oppressive_days";
pub const METRIC_HOTTEST_MONTH_INDEX: &str = "hottest_month_index";
pub const METRIC_HOTTEST_MONTH_TMAX: &str = "hottest_month_tmax";
pub const METRIC_HOTTEST_MONTH_TMIN: &str = "hottest_month_tmin";
