use std::fs::File;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::analyzers::summary::write_summary_csv;
use crate::analyzers::{HeatAnalyzer, PeriodWindows, SummaryReporter};
use crate::api::CdoClient;
use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::fetchers::{DailyFetcher, StationSelector};
use crate::readers::DailyCsvReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::{DailyCsvWriter, GeoJsonWriter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            out,
            start,
            end,
            station_count,
            units,
            retries,
            timeout,
            sleep,
            dry_run,
        } => {
            if let Some(start) = start {
                settings.start_date = start;
            }
            if let Some(end) = end {
                settings.end_date = end;
            }
            if let Some(count) = station_count {
                settings.station_count = count;
            }
            if let Some(units) = units {
                settings.units = units;
            }
            if let Some(retries) = retries {
                settings.retries = retries;
            }
            if let Some(timeout) = timeout {
                settings.timeout_secs = timeout;
            }
            if let Some(sleep) = sleep {
                settings.sleep_secs = sleep;
            }

            fetch(&settings, &out, dry_run)
        }

        Commands::Aggregate {
            input,
            output,
            min_days,
        } => {
            if let Some(min_days) = min_days {
                settings.min_days_per_year = min_days;
            }

            aggregate(&settings, &input, &output)
        }

        Commands::Summarize {
            input,
            output,
            early_start,
            early_end,
            late_start,
            late_end,
        } => {
            let windows = PeriodWindows {
                early: (early_start, early_end),
                late: (late_start, late_end),
            };

            summarize(&input, output.as_deref(), windows)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn fetch(settings: &Settings, out: &Path, dry_run: bool) -> Result<()> {
    let token = settings.require_token()?.to_string();
    let client = CdoClient::new(token, settings.timeout(), settings.retries)?;

    let selector = StationSelector::new(&client).with_page_delay(settings.page_delay());
    let candidates = selector.fetch_candidates(
        &settings.dataset,
        &settings.location,
        settings.start_date,
        settings.end_date,
    )?;
    let selected = StationSelector::select(candidates, settings.station_count)?;

    println!("Selected {} stations with unique localities:", selected.len());
    for station in &selected {
        println!("- {} (coverage {})", station.name, station.datacoverage);
    }

    if dry_run {
        return Ok(());
    }

    let fetcher = DailyFetcher::new(&client, &settings.dataset, settings.units)
        .with_page_delay(settings.page_delay());
    let mut writer = DailyCsvWriter::create(out)?;

    let progress =
        ProgressReporter::new(selected.len() as u64, "Fetching daily observations...", false);
    for (idx, station) in selected.iter().enumerate() {
        progress.println(&format!(
            "[{}/{}] Fetching {} {}",
            idx + 1,
            selected.len(),
            station.id,
            station.name
        ));
        let days = fetcher.fetch(station, settings.start_date, settings.end_date)?;
        let written = writer.write_station_days(station, &days)?;
        progress.println(&format!("    {} complete days", written));
        progress.increment(1);
    }
    progress.finish_with_message("Acquisition complete");

    let total = writer.rows_written();
    writer.finish()?;
    println!("Wrote {} rows to {}", total, out.display());

    Ok(())
}

fn aggregate(settings: &Settings, input: &Path, output: &Path) -> Result<()> {
    println!("Aggregating {}...", input.display());
    let progress = ProgressReporter::new_spinner("Computing yearly heat metrics...", false);

    let rows = DailyCsvReader::new().read_rows(input)?;
    let analyzer = HeatAnalyzer::new()
        .with_thresholds(settings.thresholds())
        .with_min_days_per_year(settings.min_days_per_year)
        .with_overrides(settings.overrides());
    let summaries = analyzer.analyze(&rows);

    progress.finish_with_message(&format!("Processed {} daily rows", rows.len()));

    let count = GeoJsonWriter::new().write_summaries(output, &summaries, &settings.country)?;
    println!("Saved {} station(s) to {}", count, output.display());

    Ok(())
}

fn summarize(input: &Path, output: Option<&Path>, windows: PeriodWindows) -> Result<()> {
    let collection = GeoJsonWriter::new().read_feature_collection(input)?;
    let rows = SummaryReporter::new()
        .with_windows(windows)
        .summarize(&collection)?;

    match output {
        Some(path) => {
            write_summary_csv(&rows, File::create(path)?)?;
            println!(
                "Saved summary for {} station(s) to {}",
                rows.len(),
                path.display()
            );
        }
        None => {
            write_summary_csv(&rows, std::io::stdout())?;
        }
    }

    Ok(())
}
