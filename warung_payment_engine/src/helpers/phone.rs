use std::sync::OnceLock;

use regex::Regex;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

/// Validates an Indonesian mobile number: `08` followed by 8 to 13 digits.
/// International notation (`+62...`) is deliberately rejected; the storefront collects local
/// numbers only.
pub fn is_valid_phone(phone: &str) -> bool {
    let re = PHONE_RE.get_or_init(|| Regex::new(r"^08[0-9]{8,13}$").expect("phone pattern is a valid regex"));
    re.is_match(phone)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_local_mobile_numbers() {
        assert!(is_valid_phone("0812345678"));
        assert!(is_valid_phone("081234567890"));
        assert!(is_valid_phone("081234567890123"));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("+6281234567890"));
        assert!(!is_valid_phone("08123456"));
        assert!(!is_valid_phone("0812345678901234"));
        assert!(!is_valid_phone("0812 34567890"));
        assert!(!is_valid_phone("08abcdefgh"));
        assert!(!is_valid_phone(""));
    }
}
