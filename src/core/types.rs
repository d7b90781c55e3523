// src/core/types.rs

//! Conversions between typed values and their build setting text.

/// `YES`/`true` in any case is true. Everything else is false.
pub fn parse_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true")
}

/// Parses a leading integer the way `strtoll` with base 0 does: optional sign, then a
/// `0x` hexadecimal, `0` octal, or decimal literal. Trailing garbage is ignored and an
/// unparsable value is 0.
pub fn parse_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, unsigned.get(1..).unwrap_or_default())
    } else {
        (10, unsigned)
    };

    let mut result: i64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        result = result
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(digit));
    }

    if negative { result.saturating_neg() } else { result }
}

/// Splits a list setting into items. Single and double quotes group text containing
/// whitespace and a backslash escapes the next character.
pub fn parse_list(value: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in value.chars() {
        if !escaped {
            match c {
                '\'' | '"' => match quote {
                    Some(open) if open == c => {
                        quote = None;
                        continue;
                    }
                    Some(_) => {}
                    None => {
                        quote = Some(c);
                        continue;
                    }
                },
                '\\' => {
                    escaped = true;
                    continue;
                }
                c if quote.is_none() && c.is_whitespace() => {
                    if !current.is_empty() {
                        entries.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                _ => {}
            }
        }

        current.push(c);
        escaped = false;
    }

    if !current.is_empty() {
        entries.push(current);
    }

    entries
}

pub fn format_boolean(value: bool) -> String {
    if value { "YES" } else { "NO" }.to_string()
}

pub fn format_integer(value: i64) -> String {
    value.to_string()
}

/// Joins list items with single spaces, escaping anything [`parse_list`] would split on.
pub fn format_list<S: AsRef<str>>(values: &[S]) -> String {
    let mut out = String::new();
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        for c in value.as_ref().chars() {
            if matches!(c, '\\' | '\'' | '"') || c.is_whitespace() {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}
