//! Numbers rendered for people: English words for the speech sink and
//! compact figures for status lines.

const TOO_LARGE: &str = "a really big number";

const BANDS: [(f64, &str); 6] = [
    (1e15, "quadrillion"),
    (1e12, "trillion"),
    (1e9,  "billion"),
    (1e6,  "million"),
    (1e3,  "thousand"),
    (1e2,  "hundred"),
];

const SMALL: [&str; 20] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen",
    "seventeen", "eighteen", "nineteen",
];

const DECADES: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Spell out the integer part of `n` in English words.
///
/// `0` (and anything below one) reads as "zero"; a zero inside a larger
/// number contributes nothing, so 2000 reads "two thousand". Values of
/// 1e18 and above read as a fixed phrase. Negative input is the caller's
/// concern and reads as "zero".
pub fn to_words(n: f64) -> String {
    let mut words = Vec::new();
    push_words(n, &mut words);
    if words.is_empty() {
        "zero".to_string()
    } else {
        words.join(" ")
    }
}

fn push_words(mut n: f64, out: &mut Vec<&'static str>) {
    if !(n >= 1.0) {
        return;
    }
    if n >= 1e18 {
        out.push(TOO_LARGE);
        return;
    }
    for (threshold, name) in BANDS {
        if n >= threshold {
            push_words((n / threshold).floor(), out);
            out.push(name);
            n %= threshold;
        }
    }
    if n >= 20.0 {
        out.push(DECADES[(n / 10.0) as usize]);
        n %= 10.0;
    }
    let ones = n as usize;
    if ones > 0 {
        out.push(SMALL[ones]);
    }
}

/// Rewrite every run of digits in `text` as words, leaving the rest
/// untouched. Digits following a decimal point stay as digits.
pub fn narrate_numbers(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut digits = String::new();
    let mut after_point = false;

    for ch in text.chars() {
        if after_point {
            if !ch.is_ascii_digit() {
                after_point = false;
            }
            out.push(ch);
            continue;
        }
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if !digits.is_empty() {
            flush_digits(&mut digits, &mut out);
            after_point = ch == '.';
        }
        out.push(ch);
    }
    if !digits.is_empty() {
        flush_digits(&mut digits, &mut out);
    }
    out
}

fn flush_digits(digits: &mut String, out: &mut String) {
    let value: f64 = digits.parse().unwrap_or(0.0);
    out.push_str(&to_words(value));
    digits.clear();
}

/// Format a quantity for a status line: fewer decimals as the value
/// grows, trailing zeros trimmed, exponent form from 1e8 up.
pub fn format_quantity(f: f64) -> String {
    if f >= 1e8 {
        return format!("{:.2e}", f);
    }
    let precision = if f > 1000.0 {
        0
    } else if f > 100.0 {
        1
    } else if f > 10.0 {
        2
    } else if f > 1.0 {
        3
    } else {
        4
    };
    let mut s = format!("{:.*}", precision, f);
    if precision > 0 {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_trim_trailing_zeros() {
        assert_eq!(format_quantity(12.5), "12.5");
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(0.25), "0.25");
        assert_eq!(format_quantity(1234.56), "1235");
        assert_eq!(format_quantity(150.04), "150");
    }

    #[test]
    fn huge_quantities_use_exponent_form() {
        assert_eq!(format_quantity(2.5e9), "2.50e9");
    }
}
