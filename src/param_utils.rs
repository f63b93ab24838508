use crate::error::BacktestError;
use crate::models::{ParameterType, StrategyInfo, StrategyParameters};

/// Extract a parameter as usize with a default value
pub fn get_param_usize(params: &StrategyParameters, key: &str, default: usize) -> usize {
    params
        .get(key)
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as usize)
        .unwrap_or(default)
}

/// Extract a parameter as f64 with a default value
pub fn get_param_f64(params: &StrategyParameters, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Check caller overrides against the strategy's parameter schema.
pub fn validate_parameters(
    info: &StrategyInfo,
    overrides: &StrategyParameters,
) -> Result<(), BacktestError> {
    for (name, &value) in overrides {
        let Some(schema) = info.parameter(name) else {
            return Err(BacktestError::UnknownParameter {
                strategy: info.id.to_string(),
                name: name.clone(),
            });
        };

        if !value.is_finite() {
            return Err(BacktestError::NonFiniteParameter { name: name.clone() });
        }
        if schema.r#type == ParameterType::Int && value.fract() != 0.0 {
            return Err(BacktestError::NonIntegerParameter {
                name: name.clone(),
                value,
            });
        }
        if value < schema.min || value > schema.max {
            return Err(BacktestError::ParameterOutOfRange {
                name: name.clone(),
                value,
                min: schema.min,
                max: schema.max,
            });
        }
    }
    Ok(())
}

/// Strategy defaults overridden key by key with the caller's values.
pub fn merge_with_defaults(
    defaults: &StrategyParameters,
    overrides: &StrategyParameters,
) -> StrategyParameters {
    let mut merged = defaults.clone();
    for (name, value) in overrides {
        merged.insert(name.clone(), *value);
    }
    merged
}

/// Validate then merge, in that order.
pub fn resolve_parameters(
    info: &StrategyInfo,
    overrides: &StrategyParameters,
) -> Result<StrategyParameters, BacktestError> {
    validate_parameters(info, overrides)?;
    Ok(merge_with_defaults(&info.default_params, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;
    use crate::strategy::strategy_info;

    fn params(entries: &[(&str, f64)]) -> StrategyParameters {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn overrides_replace_only_named_defaults() {
        let info = strategy_info(StrategyKind::Rsi);
        let resolved = resolve_parameters(&info, &params(&[("oversold", 25.0)])).unwrap();
        assert_eq!(resolved.get("period"), Some(&14.0));
        assert_eq!(resolved.get("oversold"), Some(&25.0));
        assert_eq!(resolved.get("overbought"), Some(&70.0));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let info = strategy_info(StrategyKind::SmaCrossover);
        let err = resolve_parameters(&info, &params(&[("long_period", 500.0)])).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::ParameterOutOfRange { ref name, .. } if name == "long_period"
        ));
    }

    #[test]
    fn rejects_unknown_and_fractional_parameters() {
        let info = strategy_info(StrategyKind::Macd);
        assert!(matches!(
            validate_parameters(&info, &params(&[("lookback", 3.0)])),
            Err(BacktestError::UnknownParameter { .. })
        ));
        assert!(matches!(
            validate_parameters(&info, &params(&[("fast_period", 10.5)])),
            Err(BacktestError::NonIntegerParameter { .. })
        ));
        assert!(matches!(
            validate_parameters(&info, &params(&[("fast_period", f64::NAN)])),
            Err(BacktestError::NonFiniteParameter { .. })
        ));
    }

    #[test]
    fn float_parameters_accept_fractions() {
        let info = strategy_info(StrategyKind::BollingerBands);
        assert!(validate_parameters(&info, &params(&[("std_dev", 2.5)])).is_ok());
    }

    #[test]
    fn getters_fall_back_to_defaults() {
        let map = params(&[("period", 21.0), ("bad", f64::INFINITY)]);
        assert_eq!(get_param_usize(&map, "period", 14), 21);
        assert_eq!(get_param_usize(&map, "missing", 14), 14);
        assert_eq!(get_param_f64(&map, "bad", 2.0), 2.0);
    }
}
