//! Extraction and SI-prefixed formatting of Grafana value strings

use crate::error::HumanizeError;

const LARGE_PREFIXES: [&str; 8] = ["k", "M", "G", "T", "P", "E", "Z", "Y"];
const SMALL_PREFIXES: [&str; 8] = ["m", "µ", "n", "p", "f", "a", "z", "y"];
const SIGNIFICANT_DIGITS: usize = 4;

/// Pull the first number out of a value string such as
/// `[ var='B' labels={job=api} value=123456 ]` and humanize it.
///
/// The input is returned unchanged when it holds no `value=`. The raw number is
/// returned when it cannot be parsed.
pub fn extract_value(value_string: &str) -> String {
    let Some((_, rest)) = value_string.split_once("value=") else {
        tracing::warn!("Cannot find 'value=' in value string: {}", value_string);
        return value_string.to_string();
    };

    let raw = rest.split(' ').next().unwrap_or_default();

    match humanize(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{}", e);
            raw.to_string()
        }
    }
}

/// Format a number with 4 significant digits and an SI prefix, e.g. `1500` as `1.5k`
pub fn humanize(input: &str) -> Result<String, HumanizeError> {
    let mut value: f64 = input.parse().map_err(|source| HumanizeError {
        input: input.to_string(),
        source,
    })?;

    if value == 0.0 || !value.is_finite() {
        return Ok(format_significant(value));
    }

    let mut prefix = "";
    if value.abs() >= 1.0 {
        for p in LARGE_PREFIXES {
            if value.abs() < 1000.0 {
                break;
            }
            prefix = p;
            value /= 1000.0;
        }
    } else {
        for p in SMALL_PREFIXES {
            if value.abs() >= 1.0 {
                break;
            }
            prefix = p;
            value *= 1000.0;
        }
    }

    Ok(format!("{}{}", format_significant(value), prefix))
}

/// Equivalent of printf `%.4g`: fixed notation unless the exponent is below -4
/// or reaches the precision, trailing zeros trimmed.
fn format_significant(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Scientific formatting gives the exponent after rounding, e.g. 9999.9 -> 1.000e4
    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs());
    }

    let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", "0" ; "zero")]
    #[test_case("1500", "1.5k" ; "kilo")]
    #[test_case("0.0025", "2.5m" ; "milli")]
    #[test_case("NaN", "NaN" ; "not a number")]
    #[test_case("+Inf", "+Inf" ; "positive infinity")]
    #[test_case("-Inf", "-Inf" ; "negative infinity")]
    #[test_case("42", "42" ; "no prefix")]
    #[test_case("123456", "123.5k" ; "rounded to four digits")]
    #[test_case("1234567", "1.235M" ; "mega")]
    #[test_case("-2500000", "-2.5M" ; "negative")]
    #[test_case("0.5", "500m" ; "half")]
    #[test_case("1e30", "1e+06Y" ; "beyond the largest prefix")]
    fn humanizes(input: &str, expected: &str) {
        assert_eq!(humanize(input).unwrap(), expected);
    }

    #[test]
    fn humanize_rejects_non_numbers() {
        let err = humanize("fast").unwrap_err();

        assert_eq!(err.input, "fast");
    }

    #[test]
    fn extracts_value() {
        assert_eq!(extract_value("[ var='B' labels={job=x} value=42 ]"), "42");
        assert_eq!(
            extract_value("[ var='B' labels={job=x} value=1500 ]"),
            "1.5k"
        );
    }

    #[test]
    fn extract_keeps_string_without_value() {
        let input = "[ var='B' labels={job=x} ]";

        assert_eq!(extract_value(input), input);
    }

    #[test]
    fn extract_falls_back_to_raw_number() {
        assert_eq!(extract_value("[ var='B' value=n/a ]"), "n/a");
    }

    #[test]
    fn extract_uses_first_value() {
        assert_eq!(
            extract_value("[ var='B' labels={} value=2000 ], [ var='C' labels={} value=1 ]"),
            "2k"
        );
    }

    #[test]
    fn formats_like_printf_g() {
        assert_eq!(format_significant(9999.9), "1e+04");
        assert_eq!(format_significant(0.00001234), "1.234e-05");
        assert_eq!(format_significant(100.0), "100");
        assert_eq!(format_significant(1.0), "1");
    }
}
