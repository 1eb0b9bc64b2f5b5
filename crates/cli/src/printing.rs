/// Human-readable byte size in binary units.
pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Packed size as a percentage of the raw size.
pub fn ratio_percent(packed: u64, raw: u64) -> f64 {
    if raw == 0 {
        100.0
    } else {
        packed as f64 * 100.0 / raw as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_sensible_units() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KiB");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn ratio_handles_empty_input() {
        assert_eq!(ratio_percent(50, 200), 25.0);
        assert_eq!(ratio_percent(10, 0), 100.0);
    }
}
