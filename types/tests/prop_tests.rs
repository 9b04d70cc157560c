use proptest::prelude::*;

use aim_types::{AccountAddress, Decision, EventPosition, Wei};

proptest! {
    /// Any 20 bytes produce an address that parses back to itself.
    #[test]
    fn address_from_bytes_parses(bytes in prop::array::uniform20(0u8..)) {
        let address = AccountAddress::from_bytes(bytes);
        let parsed = AccountAddress::parse(address.as_str()).unwrap();
        prop_assert_eq!(parsed, address);
    }

    /// Upper-casing the hex body never changes address identity.
    #[test]
    fn address_case_is_not_identity(bytes in prop::array::uniform20(0u8..)) {
        let lower = AccountAddress::from_bytes(bytes);
        let upper = format!("0x{}", &lower.as_str()[2..].to_uppercase());
        prop_assert_eq!(AccountAddress::parse(&upper).unwrap(), lower);
    }

    /// Wei keeps its full range through the string encoding.
    #[test]
    fn wei_string_encoding(raw in any::<u128>()) {
        let s: String = Wei::new(raw).into();
        prop_assert_eq!(s.parse::<Wei>().unwrap().raw(), raw);
    }

    /// Verdicts without "approved" in any casing are rejections.
    #[test]
    fn decision_requires_keyword(result in "[a-zA-Z ]{0,40}") {
        let expected = if result.to_lowercase().contains("approved") {
            Decision::Approved
        } else {
            Decision::Rejected
        };
        prop_assert_eq!(Decision::from_result(&result), expected);
    }

    /// Event ordering is lexicographic on (block, log index).
    #[test]
    fn position_ordering(a in (0u64..1000, 0u64..50), b in (0u64..1000, 0u64..50)) {
        let pa = EventPosition::new(a.0, a.1);
        let pb = EventPosition::new(b.0, b.1);
        prop_assert_eq!(pa.cmp(&pb), a.cmp(&b));
    }
}
