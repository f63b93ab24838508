/// Positionally aligned indicator output. `None` marks indices without enough lookback.
pub type IndicatorSeries = Vec<Option<f64>>;

pub fn calculate_sma(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut sma_values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return sma_values;
    }

    // Each window is summed from scratch so equal windows give bit-identical means.
    for i in (period - 1)..prices.len() {
        let window = &prices[i + 1 - period..=i];
        sma_values[i] = Some(window.iter().sum::<f64>() / period as f64);
    }

    sma_values
}

/// EMA seeded with the SMA of the first `period` prices.
pub fn calculate_ema(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut ema_values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return ema_values;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;
    ema_values[period - 1] = Some(ema);

    for i in period..prices.len() {
        ema = (prices[i] * multiplier) + (ema * (1.0 - multiplier));
        ema_values[i] = Some(ema);
    }

    ema_values
}

fn rsi_from_avgs(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// RSI over a simple rolling mean of the last `period` gains and losses.
///
/// This intentionally does not use Wilder smoothing; every defined value only
/// depends on the trailing `period + 1` prices.
pub fn calculate_rsi(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut rsi_values = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return rsi_values;
    }

    // gains[j] / losses[j] describe the move from prices[j] to prices[j + 1]
    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .windows(2)
        .map(|pair| {
            let delta = pair[1] - pair[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    for i in period..prices.len() {
        let window = i - period..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        rsi_values[i] = Some(rsi_from_avgs(avg_gain, avg_loss));
    }

    rsi_values
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// MACD line, signal line and histogram.
///
/// The signal EMA runs over the compacted run of defined MACD values and is
/// then written back starting at the first index where MACD exists.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdOutput {
    let fast_ema = calculate_ema(prices, fast_period);
    let slow_ema = calculate_ema(prices, slow_period);

    let macd: IndicatorSeries = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(fast, slow)| match (fast, slow) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        })
        .collect();

    let mut signal = vec![None; prices.len()];
    if let Some(first_defined) = macd.iter().position(Option::is_some) {
        let compacted: Vec<f64> = macd.iter().flatten().copied().collect();
        let signal_ema = calculate_ema(&compacted, signal_period);
        for (offset, value) in signal_ema.into_iter().enumerate() {
            signal[first_defined + offset] = value;
        }
    }

    let histogram = macd
        .iter()
        .zip(signal.iter())
        .map(|(macd, signal)| match (macd, signal) {
            (Some(macd), Some(signal)) => Some(macd - signal),
            _ => None,
        })
        .collect();

    MacdOutput {
        macd,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Bollinger Bands using the population standard deviation of the window.
pub fn calculate_bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerOutput {
    let middle = calculate_sma(prices, period);
    let mut upper = vec![None; prices.len()];
    let mut lower = vec![None; prices.len()];

    for (i, mean) in middle.iter().enumerate() {
        let Some(mean) = *mean else {
            continue;
        };
        let slice = &prices[i + 1 - period..=i];
        let variance = slice.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / period as f64;
        let width = std_dev * variance.sqrt();

        upper[i] = Some(mean + width);
        lower[i] = Some(mean - width);
    }

    BollingerOutput {
        upper,
        middle,
        lower,
    }
}

/// Percentage change over `period` bars. Undefined before `period` and where the base price is zero.
pub fn calculate_momentum(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut momentum = vec![None; prices.len()];
    if period == 0 {
        return momentum;
    }

    for i in period..prices.len() {
        let base = prices[i - period];
        if base != 0.0 && base.is_finite() {
            momentum[i] = Some((prices[i] - base) / base * 100.0);
        }
    }

    momentum
}
