use crate::types::{Quantity, QuantityUnit};

pub fn parse_cpu_to_millicores(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    if let Some(stripped) = q.strip_suffix('n') {
        let nanos = stripped.parse::<i128>().ok()?;
        i64::try_from(nanos / 1_000_000).ok()
    } else if let Some(stripped) = q.strip_suffix('u') {
        let micros = stripped.parse::<i128>().ok()?;
        i64::try_from(micros / 1_000).ok()
    } else if let Some(stripped) = q.strip_suffix('m') {
        stripped.parse::<i64>().ok()
    } else {
        let cores = q.parse::<f64>().ok()?;
        round_to_i64(cores * 1000.0)
    }
}

// `as` would saturate or turn NaN into 0; out of range is unparseable.
fn round_to_i64(v: f64) -> Option<i64> {
    let v = v.round();
    (v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

// Binary suffixes are checked before decimal ones so "Mi" never matches "M".
const BINARY_UNITS: &[(&str, i64)] = &[
    ("Ki", 1024),
    ("Mi", 1024 * 1024),
    ("Gi", 1024 * 1024 * 1024),
    ("Ti", 1024_i64.pow(4)),
    ("Pi", 1024_i64.pow(5)),
    ("Ei", 1024_i64.pow(6)),
];
const DECIMAL_UNITS: &[(&str, i64)] = &[
    ("k", 1000),
    ("K", 1000),
    ("M", 1000 * 1000),
    ("G", 1000 * 1000 * 1000),
    ("T", 1000_i64.pow(4)),
    ("P", 1000_i64.pow(5)),
    ("E", 1000_i64.pow(6)),
];

pub fn parse_memory_to_bytes(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    for (suf, mul) in BINARY_UNITS.iter().chain(DECIMAL_UNITS) {
        if let Some(stripped) = q.strip_suffix(suf) {
            let v = stripped.parse::<f64>().ok()?;
            return round_to_i64(v * (*mul as f64));
        }
    }
    q.parse::<i64>().ok()
}

/// Parse a raw Kubernetes quantity for the given resource dimension,
/// normalising it to that dimension's base unit. Usage is never negative,
/// so negative amounts are rejected along with unparseable ones.
pub fn parse_quantity(dimension: &str, raw: &str) -> Option<Quantity> {
    let unit = dimension_unit(dimension);
    let value = match unit {
        QuantityUnit::Millicores => parse_cpu_to_millicores(raw),
        QuantityUnit::Bytes => parse_memory_to_bytes(raw),
        QuantityUnit::Milli => parse_cpu_to_millicores(raw)
            .or_else(|| parse_memory_to_bytes(raw)?.checked_mul(1000)),
    }?;
    (value >= 0).then(|| Quantity::new(value, unit))
}

pub fn dimension_unit(dimension: &str) -> QuantityUnit {
    match dimension {
        "cpu" => QuantityUnit::Millicores,
        "memory" | "ephemeral-storage" | "storage" => QuantityUnit::Bytes,
        _ => QuantityUnit::Milli,
    }
}

/// Human readable rendering: `250m`, `2`, `128Mi`, `1.5Gi`.
pub fn format_quantity(q: &Quantity) -> String {
    match q.unit {
        QuantityUnit::Millicores | QuantityUnit::Milli => {
            if q.value % 1000 == 0 {
                format!("{}", q.value / 1000)
            } else {
                format!("{}m", q.value)
            }
        }
        QuantityUnit::Bytes => {
            for (suf, mul) in BINARY_UNITS[..3].iter().rev() {
                if q.value >= *mul {
                    return if q.value % mul == 0 {
                        format!("{}{}", q.value / mul, suf)
                    } else {
                        format!("{:.1}{}", q.value as f64 / *mul as f64, suf)
                    };
                }
            }
            q.value.to_string()
        }
    }
}
