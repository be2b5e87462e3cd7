//! Digit normalization for Japanese address strings.
//!
//! Crime statistics write chōme numbers with full-width or half-width digits
//! ("銀座１丁目", "銀座1丁目") while the boundary polygons use kanji
//! ("銀座一丁目"). Both sides are brought to the kanji form before joining.

const KANJI_DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Replaces full-width digits (０-９) with ASCII digits. Everything else,
/// including full-width latin letters and kana, is left untouched.
pub fn to_half_width_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// Replaces each ASCII digit with its kanji numeral, one character per digit.
///
/// There is no place-value handling: "12" becomes "一二" and "10" becomes
/// "一〇", never "十二" / "十". Boundary data only uses single-digit chōme in
/// the covered wards.
pub fn to_kanji_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => KANJI_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Full pipeline applied to crime-table address keys.
pub fn normalize_address(input: &str) -> String {
    to_kanji_digits(&to_half_width_digits(input))
}
