use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// letters (including common accented ones) and spaces, nothing else
    pub static ref REGEX_IS_PERSON_NAME: Regex =
        Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap();
    //
    pub static ref REGEX_IS_FOUR_DIGITS: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
    //
    pub static ref REGEX_IS_PIN: Regex = Regex::new(r"^[0-9]{4,6}$").unwrap();
    //
    /// printed key tag numbers, eg: K001
    pub static ref REGEX_IS_KEY_NUMBER: Regex = Regex::new(r"^[a-zA-Z0-9-]{1,32}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_name_allows_accents_and_spaces() {
        assert!(REGEX_IS_PERSON_NAME.is_match("María González"));
        assert!(REGEX_IS_PERSON_NAME.is_match("Juan Pérez"));
        assert!(!REGEX_IS_PERSON_NAME.is_match("R2-D2"));
        assert!(!REGEX_IS_PERSON_NAME.is_match("john.doe"));
    }

    #[test]
    fn four_digits_is_exact() {
        assert!(REGEX_IS_FOUR_DIGITS.is_match("1234"));
        assert!(!REGEX_IS_FOUR_DIGITS.is_match("123"));
        assert!(!REGEX_IS_FOUR_DIGITS.is_match("12345"));
        assert!(!REGEX_IS_FOUR_DIGITS.is_match("12a4"));
    }

    #[test]
    fn pin_is_four_to_six_digits() {
        assert!(REGEX_IS_PIN.is_match("1234"));
        assert!(REGEX_IS_PIN.is_match("123456"));
        assert!(!REGEX_IS_PIN.is_match("123"));
        assert!(!REGEX_IS_PIN.is_match("1234567"));
        assert!(!REGEX_IS_PIN.is_match("12 34"));
    }

    #[test]
    fn key_number_is_alphanumeric() {
        assert!(REGEX_IS_KEY_NUMBER.is_match("K001"));
        assert!(REGEX_IS_KEY_NUMBER.is_match("k-001"));
        assert!(!REGEX_IS_KEY_NUMBER.is_match("K 001"));
        assert!(!REGEX_IS_KEY_NUMBER.is_match(""));
    }
}
