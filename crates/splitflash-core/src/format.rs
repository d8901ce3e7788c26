use time::Date;
use time::macros::format_description;

pub fn format_date(date: &str) -> String {
    let compact = format_description!("[year][month][day]");
    let display = format_description!("[year]-[month]-[day]");

    Date::parse(date, compact)
        .ok()
        .and_then(|value| value.format(display).ok())
        .unwrap_or_else(|| date.to_string())
}

pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut divisor = UNIT;
    let mut exponent = 0;
    let mut remaining = bytes / UNIT;
    while remaining >= UNIT {
        divisor *= UNIT;
        exponent += 1;
        remaining /= UNIT;
    }

    // Truncated to one decimal.
    let tenths = bytes as u128 * 10 / divisor as u128;
    format!(
        "{}.{} {}B",
        tenths / 10,
        tenths % 10,
        PREFIXES[exponent]
    )
}
