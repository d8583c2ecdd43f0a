//! Requested baud rate to termios line-speed mapping.

/// Rate used when the requested one is not supported.
pub const FALLBACK_BAUD: u32 = 9600;

/// Supported nominal rates and their termios speed constants.
const SUPPORTED: [(u32, libc::speed_t); 10] = [
    (9600, libc::B9600),
    (57600, libc::B57600),
    (115200, libc::B115200),
    (230400, libc::B230400),
    (460800, libc::B460800),
    (921600, libc::B921600),
    (1_000_000, libc::B1000000),
    (2_000_000, libc::B2000000),
    (3_000_000, libc::B3000000),
    (4_000_000, libc::B4000000),
];

/// Nominal baud rates this tool can program.
pub fn supported_rates() -> impl Iterator<Item = u32> {
    SUPPORTED.iter().map(|(rate, _)| *rate)
}

fn lookup(requested: i64) -> Option<(u32, libc::speed_t)> {
    SUPPORTED
        .iter()
        .copied()
        .find(|(rate, _)| i64::from(*rate) == requested)
}

/// Whether `requested` is one of the supported rates.
pub fn is_supported(requested: i64) -> bool {
    lookup(requested).is_some()
}

/// Map a requested rate to the termios speed constant.
///
/// Unsupported values, including zero and negatives, silently fall back to
/// `B9600`.
pub fn line_speed(requested: i64) -> libc::speed_t {
    lookup(requested).map_or(libc::B9600, |(_, speed)| speed)
}

/// The nominal rate that [`line_speed`] actually selects.
pub fn effective_baud(requested: i64) -> u32 {
    lookup(requested).map_or(FALLBACK_BAUD, |(rate, _)| rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_supported_rates_map_to_distinct_speeds() {
        let speeds: HashSet<_> = supported_rates().map(|r| line_speed(r.into())).collect();
        assert_eq!(speeds.len(), 10);

        assert_eq!(line_speed(115200), libc::B115200);
        assert_eq!(line_speed(4_000_000), libc::B4000000);
    }

    #[test]
    fn test_unsupported_rates_fall_back() {
        for rate in [1200, 0, -1, -9600, 19200, 38400, 500_000] {
            assert_eq!(line_speed(rate), libc::B9600, "rate {rate}");
            assert_eq!(effective_baud(rate), FALLBACK_BAUD);
            assert!(!is_supported(rate));
        }
    }

    #[test]
    fn test_effective_baud_passthrough() {
        for rate in supported_rates() {
            assert!(is_supported(rate.into()));
            assert_eq!(effective_baud(rate.into()), rate);
        }
    }

    proptest! {
        #[test]
        fn prop_mapping_is_total(rate in any::<i64>()) {
            let speed = line_speed(rate);
            if is_supported(rate) {
                prop_assert_eq!(effective_baud(rate) as i64, rate);
            } else {
                prop_assert_eq!(speed, libc::B9600);
            }
        }
    }
}
