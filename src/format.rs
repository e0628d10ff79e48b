//! Display formatting for the printable document: at most 2 fractional
//! digits, trailing zeros dropped, thousands grouping on currency values.

/// Currency-style: grouped integer part, 0..=2 fraction digits.
pub fn money(value: f64) -> String {
    render(value, true)
}

/// Quantity-style: same rounding and trimming, no grouping.
pub fn count(value: f64) -> String {
    render(value, false)
}

fn render(value: f64, grouped: bool) -> String {
    // Round once, to hundredths, then derive both parts from the
    // integer cent count so the parts can never disagree.
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let mut out = String::new();
    if value < 0.0 && cents > 0 {
        out.push('-');
    }
    if grouped {
        out.push_str(&group_thousands(whole));
    } else {
        out.push_str(&whole.to_string());
    }
    if frac != 0 {
        if frac % 10 == 0 {
            out.push_str(&format!(".{}", frac / 10));
        } else {
            out.push_str(&format!(".{frac:02}"));
        }
    }
    out
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_show_no_decimal_point() {
        assert_eq!(money(0.0), "0");
        assert_eq!(money(10.0), "10");
        assert_eq!(money(1_000_000.0), "1,000,000");
    }

    #[test]
    fn trailing_zeros_are_trimmed() {
        assert_eq!(money(1234.5), "1,234.5");
        assert_eq!(money(7.10), "7.1");
        assert_eq!(money(7.25), "7.25");
    }

    #[test]
    fn rounds_to_at_most_two_decimals() {
        assert_eq!(money(2.346), "2.35");
        assert_eq!(money(2.344), "2.34");
        assert_eq!(money(9.999), "10");
    }

    #[test]
    fn float_noise_does_not_leak_through() {
        assert_eq!(money(0.1 + 0.2), "0.3");
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(money(-3.5), "-3.5");
        assert_eq!(money(-1234.0), "-1,234");
        // Rounds to zero: no stray minus sign.
        assert_eq!(money(-0.004), "0");
    }

    #[test]
    fn counts_are_trimmed_but_not_grouped() {
        assert_eq!(count(1.0), "1");
        assert_eq!(count(1.5), "1.5");
        assert_eq!(count(1234.0), "1234");
    }
}
