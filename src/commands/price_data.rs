use crate::candle_utils::{filter_bars_by_date_range, normalize_ticker_symbol, sort_and_dedup_bars};
use crate::models::PriceBar;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Load a JSON array of daily bars, sorted ascending with duplicate dates collapsed.
pub fn load_price_file(path: &Path) -> Result<Vec<PriceBar>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open price file at {}", path.display()))?;
    let mut bars: Vec<PriceBar> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Price file {} is not a JSON array of bars", path.display()))?;

    let loaded = bars.len();
    sort_and_dedup_bars(&mut bars);
    if bars.len() != loaded {
        warn!(
            "Dropped {} bars with duplicate dates from {}",
            loaded - bars.len(),
            path.display()
        );
    }
    info!("Loaded {} bars from {}", bars.len(), path.display());

    Ok(bars)
}

/// Restrict bars to an inclusive date window.
pub fn window_bars(
    bars: &[PriceBar],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<PriceBar>> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(anyhow!(
                "Start date {} must not be after end date {}",
                start,
                end
            ));
        }
    }
    Ok(filter_bars_by_date_range(bars, start, end))
}

/// Explicit symbol if given, otherwise the price file's stem.
pub fn resolve_symbol(symbol: Option<&str>, data_file: &Path) -> Result<String> {
    let candidate = match symbol {
        Some(symbol) => symbol.to_string(),
        None => data_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    normalize_ticker_symbol(&candidate).ok_or_else(|| {
        anyhow!(
            "Could not determine a symbol for {}; pass --symbol",
            data_file.display()
        )
    })
}

/// Pretty JSON to `output`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory {}", parent.display())
                    })?;
                }
            }
            let file = File::create(path)
                .with_context(|| format!("Unable to create output file at {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).context("JSON encode failed")?;
            writer.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value).context("JSON encode failed")?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("backtest-engine-{}-{}", std::process::id(), name))
    }

    #[test]
    fn loads_sorts_and_dedups_price_file() {
        let path = temp_path("prices.json");
        fs::write(
            &path,
            r#"[
                {"date": "2024-01-03", "open": 3, "high": 3, "low": 3, "close": 3, "volume": 10},
                {"date": "2024-01-01", "open": 1, "high": 1, "low": 1, "close": 1},
                {"date": "2024-01-03", "open": 4, "high": 4, "low": 4, "close": 4, "volume": 20}
            ]"#,
        )
        .unwrap();

        let bars = load_price_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.0);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[1].close, 4.0);
    }

    #[test]
    fn malformed_price_file_is_an_error() {
        let path = temp_path("broken.json");
        fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        let result = load_price_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());

        assert!(load_price_file(&temp_path("missing.json")).is_err());
    }

    #[test]
    fn symbol_falls_back_to_file_stem() {
        let path = Path::new("/data/reliance.json");
        assert_eq!(resolve_symbol(None, path).unwrap(), "RELIANCE");
        assert_eq!(resolve_symbol(Some(" tcs "), path).unwrap(), "TCS");
        assert!(resolve_symbol(Some("  "), path).is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(window_bars(&[], start, end).is_err());
        assert!(window_bars(&[], end, start).unwrap().is_empty());
    }
}
