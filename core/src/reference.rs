//! Conversion between textual map references and zero-based grid indices.
//!
//! A map reference is written as column letters followed by a one-based row
//! number, e.g. `G20` or `AA14`. Column letters use bijective base-26
//! numbering (`A` = 1 … `Z` = 26, `AA` = 27 …), the scheme spreadsheets use
//! for their column headers. There is no zero digit, so the letters cannot be
//! decoded as a plain positional base-26 number.

use crate::ReferenceError;

const RADIX: u64 = 26;

/// Parses a map reference into a zero-based `(row, column)` pair.
///
/// Surrounding whitespace is ignored and letters are case-insensitive. The
/// text must consist of one or more ASCII letters followed by one or more
/// ASCII digits; anything else, a row number of zero, or indices that do not
/// fit in `u32` are rejected with [`ReferenceError::InvalidReference`].
pub fn parse(text: &str) -> Result<(u32, u32), ReferenceError> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (letters, digits) = trimmed.split_at(split);

    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(text));
    }

    let mut value: u64 = 0;
    for byte in letters.bytes() {
        let digit = u64::from(byte.to_ascii_uppercase() - b'A') + 1;
        value = value
            .checked_mul(RADIX)
            .and_then(|scaled| scaled.checked_add(digit))
            .ok_or_else(|| invalid(text))?;
    }

    let column = u32::try_from(value - 1).map_err(|_| invalid(text))?;
    let row = digits
        .parse::<u64>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| u32::try_from(index).ok())
        .ok_or_else(|| invalid(text))?;

    Ok((row, column))
}

/// Formats a zero-based `(row, column)` pair as a map reference.
#[must_use]
pub fn format(row: u32, column: u32) -> String {
    let mut reference = column_letters(column);
    reference.push_str(&(u64::from(row) + 1).to_string());
    reference
}

/// Renders the letters naming a zero-based column, e.g. `0` → `A`, `26` → `AA`.
#[must_use]
pub fn column_letters(column: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = u64::from(column);
    loop {
        letters.push(b'A' + (remaining % RADIX) as u8);
        if remaining < RADIX {
            break;
        }
        remaining = remaining / RADIX - 1;
    }
    letters.iter().rev().map(|&byte| char::from(byte)).collect()
}

/// Rewrites a reference into its canonical upper-case, whitespace-free form.
pub fn normalize(text: &str) -> Result<String, ReferenceError> {
    let (row, column) = parse(text)?;
    Ok(format(row, column))
}

fn invalid(text: &str) -> ReferenceError {
    ReferenceError::InvalidReference {
        reference: text.to_owned(),
    }
}
