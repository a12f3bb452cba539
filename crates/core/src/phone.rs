//! Phone-number normalization for SMS delivery.

/// Normalize a customer-entered phone number to E.164.
///
/// US/Canada heuristics: 11 digits starting with `1` or a bare 10-digit
/// number gain a `+1`/`+`; anything already starting with `+` is kept
/// as-is; otherwise the digits get a `+` prefix.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('1') {
        return format!("+{digits}");
    }
    if digits.len() == 10 {
        return format!("+1{digits}");
    }
    if phone.starts_with('+') {
        return phone.to_string();
    }
    format!("+{digits}")
}

/// Basic length validation: 10 to 15 digits ignoring formatting.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=15).contains(&digits)
}
