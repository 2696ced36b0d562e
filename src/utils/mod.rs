use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::RangeError;
use crate::models::VlanTargetSet;

/// Expand a range expression such as "1,2,5-7,9" into the set of numbers it names.
/// Blank input yields an empty set.
pub fn expand_number_range(input: &str) -> Result<VlanTargetSet, RangeError> {
    let mut numbers = VlanTargetSet::new();
    if input.trim().is_empty() {
        return Ok(numbers);
    }

    for token in input.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((lo, hi)) => {
                let lo = parse_number(lo, token)?;
                let hi = parse_number(hi, token)?;
                if lo > hi {
                    return Err(RangeError::Reversed {
                        token: token.to_string(),
                        lo,
                        hi,
                    });
                }
                numbers.extend(lo..=hi);
            }
            None => {
                numbers.insert(parse_number(token, token)?);
            }
        }
    }

    Ok(numbers)
}

/// Highest usable VLAN id
pub const MAX_VLAN_ID: u32 = 4094;

fn parse_number(value: &str, token: &str) -> Result<u32, RangeError> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(RangeError::InvalidToken(token.to_string()));
    }
    // Digits only, so a parse failure can only be an overflow
    let number = value.parse().unwrap_or(u32::MAX);
    if number > MAX_VLAN_ID {
        return Err(RangeError::OutOfRange {
            token: token.to_string(),
            value: number,
            max: MAX_VLAN_ID,
        });
    }
    Ok(number)
}

/// Full interface type names and the abbreviations devices print for them
const INTERFACE_NAMES: &[(&str, &[&str])] = &[
    ("Ethernet", &["e", "et", "eth"]),
    ("FastEthernet", &["f", "fa", "fas", "fe"]),
    ("GigabitEthernet", &["g", "gi", "gig", "ge"]),
    ("TwoGigabitEthernet", &["tw", "two"]),
    ("FiveGigabitEthernet", &["fi", "five"]),
    ("TenGigabitEthernet", &["te", "ten", "tengig"]),
    ("TwentyFiveGigE", &["twe", "twentyfivegig"]),
    ("FortyGigabitEthernet", &["fo", "for", "fortygig"]),
    ("HundredGigE", &["hu", "hun", "hundredgig"]),
    ("AppGigabitEthernet", &["ap", "app"]),
    ("Port-channel", &["po", "portchannel"]),
    ("Vlan", &["vl", "vlan-interface"]),
    ("Loopback", &["lo", "lp"]),
    ("Tunnel", &["tu"]),
    ("Serial", &["s", "se"]),
    ("Management", &["ma", "mgmt-eth"]),
];

/// Canonical, lower-cased long form of an interface name.
///
/// "Gi1/0/1", "GigabitEthernet1/0/1" and " gigabitethernet 1/0/1 " all map to
/// "gigabitethernet1/0/1". Unknown prefixes are kept as-is apart from
/// whitespace removal and lower-casing, so the result is always safe to
/// compare with `==` and normalizing twice changes nothing.
pub fn long_int_name(name: &str) -> String {
    let compact: String = name.split_whitespace().collect();
    let split = compact
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(compact.len());
    let (prefix, rest) = compact.split_at(split);
    let lower = prefix.to_ascii_lowercase();

    let full = INTERFACE_NAMES
        .iter()
        .find(|(full, abbrevs)| full.eq_ignore_ascii_case(&lower) || abbrevs.contains(&lower.as_str()))
        .map(|(full, _)| *full)
        .unwrap_or(prefix);

    format!("{}{}", full, rest).to_ascii_lowercase()
}

/// Build an output file path: `<dir>/<stem>-<YYYY-MM-DD-HH-MM-SS>.txt`
pub fn output_filename(dir: &str, stem: &str, started: &DateTime<Local>) -> PathBuf {
    let timestamp = started.format("%Y-%m-%d-%H-%M-%S");
    let safe_stem = stem.replace(['/', '\\'], "_");
    Path::new(dir).join(format!("{}-{}.txt", safe_stem, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn set(values: &[u32]) -> VlanTargetSet {
        values.iter().copied().collect()
    }

    #[test]
    fn test_expand_number_range() {
        assert_eq!(expand_number_range("1,2,5-7,9").unwrap(), set(&[1, 2, 5, 6, 7, 9]));
        assert_eq!(expand_number_range(" 10 , 10-11 ").unwrap(), set(&[10, 11]));
        assert_eq!(expand_number_range("4-4").unwrap(), set(&[4]));
    }

    #[test]
    fn test_expand_empty_range() {
        assert!(expand_number_range("").unwrap().is_empty());
        assert!(expand_number_range("   ").unwrap().is_empty());
    }

    #[test]
    fn test_expand_malformed_range() {
        assert_eq!(
            expand_number_range("5-3"),
            Err(RangeError::Reversed { token: "5-3".to_string(), lo: 5, hi: 3 })
        );
        assert_eq!(expand_number_range("a"), Err(RangeError::InvalidToken("a".to_string())));
        assert!(expand_number_range("1,,2").is_err());
        assert!(expand_number_range("-5").is_err());
        assert!(expand_number_range("1-2-3").is_err());
        assert!(expand_number_range("+7").is_err());
    }

    #[test]
    fn test_expand_rejects_values_above_vlan_max() {
        assert_eq!(expand_number_range("4094").unwrap(), set(&[4094]));
        assert_eq!(expand_number_range("4090-4094").unwrap().len(), 5);
        assert_eq!(
            expand_number_range("1-4000000000"),
            Err(RangeError::OutOfRange { token: "1-4000000000".to_string(), value: 4000000000, max: 4094 })
        );
        assert_eq!(
            expand_number_range("10,4095"),
            Err(RangeError::OutOfRange { token: "4095".to_string(), value: 4095, max: 4094 })
        );
        assert!(matches!(
            expand_number_range("1-99999999999"),
            Err(RangeError::OutOfRange { value: u32::MAX, .. })
        ));
    }

    #[test]
    fn test_long_int_name_equivalence() {
        assert_eq!(long_int_name("Gi1/0/1"), long_int_name(" GigabitEthernet1/0/1 "));
        assert_eq!(long_int_name("Gi1/0/1"), "gigabitethernet1/0/1");
        assert_eq!(long_int_name("Fa0/2"), "fastethernet0/2");
        assert_eq!(long_int_name("Te1/1/1"), "tengigabitethernet1/1/1");
        assert_eq!(long_int_name("Eth1/49"), "ethernet1/49");
        assert_eq!(long_int_name("Ethernet1/49"), "ethernet1/49");
        assert_eq!(long_int_name("Po12"), "port-channel12");
        assert_eq!(long_int_name("GigabitEthernet 1/0/1"), "gigabitethernet1/0/1");
    }

    #[test]
    fn test_long_int_name_passthrough() {
        assert_eq!(long_int_name(" CPU "), "cpu");
        assert_eq!(long_int_name("sup-eth1(R)"), "sup-eth1(r)");
        assert_eq!(long_int_name(""), "");
        assert_eq!(long_int_name("   "), "");
    }

    #[test]
    fn test_long_int_name_idempotent() {
        for name in ["Gi1/0/1", "Fa0/2", "Po1", "vlan10", "CPU", "Twe1/0/1", "Hu1/0/49", "sup-eth1(R)"] {
            let once = long_int_name(name);
            assert_eq!(long_int_name(&once), once, "not idempotent for {}", name);
        }
    }

    #[test]
    fn test_output_filename() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = output_filename("/tmp/out", "mac-search-by-vlan", &started);
        assert_eq!(path, PathBuf::from("/tmp/out/mac-search-by-vlan-2024-03-09-14-05-07.txt"));
    }
}
