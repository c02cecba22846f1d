const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// `{:.1}` without trailing zeros or a dangling dot (`1.0` -> `1`).
fn one_decimal(value: f64) -> String {
    let text = format!("{:.1}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Offset axis label: `999`, `50k`, `1.5M`.
#[must_use]
pub fn format_offset(value: f64) -> String {
    if value >= MILLION {
        return format!("{}M", one_decimal(value / MILLION));
    }
    if value >= THOUSAND {
        return format!("{:.0}k", value / THOUSAND);
    }
    format!("{}", value.trunc() as i64)
}

/// Millisecond axis label shown in seconds once it reaches 1s:
/// `500ms`, `1.5s`, `10s`.
#[must_use]
pub fn format_ms_as_s(value: f64) -> String {
    if value >= THOUSAND {
        let secs = value / THOUSAND;
        if secs < 10.0 {
            return format!("{}s", one_decimal(secs));
        }
        return format!("{:.0}s", secs);
    }
    format!("{}ms", value.trunc() as i64)
}

#[must_use]
pub fn format_plain(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
