const AVAILABLE_MARKER: &str = "Available";

/// Whether the vendor reported a stock count at all, e.g. "3 Available" or "0 Available".
pub fn is_availability_known(availability: &str) -> bool {
    availability.contains(AVAILABLE_MARKER)
}

/// Extract the stock count from an availability text such as "12 Available". Anything that does not carry a leading
/// count counts as zero.
pub fn parse_quantity(availability: &str) -> u64 {
    if !is_availability_known(availability) {
        return 0;
    }
    availability.split_whitespace().next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity("12 Available"), 12);
        assert_eq!(parse_quantity("  3 Available "), 3);
        assert_eq!(parse_quantity("0 Available"), 0);
        assert_eq!(parse_quantity("Out of Stock"), 0);
        assert_eq!(parse_quantity("Available soon"), 0);
        assert_eq!(parse_quantity("-1 Available"), 0);
        assert_eq!(parse_quantity("12"), 0);
    }

    #[test]
    fn known_availability() {
        assert!(is_availability_known("0 Available"));
        assert!(!is_availability_known("Sold out"));
    }
}
