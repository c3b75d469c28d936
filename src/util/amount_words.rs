use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::document_conf::CurrencyWords;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

fn below_thousand(n: u64, out: &mut Vec<String>) {
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest == 0 {
        return;
    }
    if rest < 20 {
        out.push(ONES[rest as usize].to_string());
    } else if rest % 10 == 0 {
        out.push(TENS[(rest / 10) as usize].to_string());
    } else {
        out.push(format!("{}-{}", TENS[(rest / 10) as usize], ONES[(rest % 10) as usize]));
    }
}

/// Cardinal number in English words, lower case: `1021` → "one thousand twenty-one".
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            // Quotients above 999 trillion spell out recursively ("one thousand trillion").
            parts.push(format!("{} {}", number_in_words(rest / scale), name));
            rest %= scale;
        }
    }
    below_thousand(rest, &mut parts);
    parts.join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Spell out a money amount for printed documents, e.g.
/// "One hundred twenty dollars and five cents" or "Twelve dollars only".
/// The amount is rounded half away from zero to two places first.
pub fn amount_in_words(amount: Decimal, currency: &CurrencyWords) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let absolute = rounded.abs();
    let major = absolute.trunc();
    let minor = ((absolute - major) * Decimal::ONE_HUNDRED).trunc();
    let major = major.to_u64().unwrap_or(u64::MAX);
    let minor = minor.to_u64().unwrap_or(0);

    let major_name = if major == 1 { &currency.name } else { &currency.name_plural };
    let mut text = format!("{} {}", number_in_words(major), major_name);
    if minor == 0 {
        text.push_str(" only");
    } else {
        let minor_name = if minor == 1 { &currency.subunit } else { &currency.subunit_plural };
        text.push_str(&format!(" and {} {}", number_in_words(minor), minor_name));
    }
    if negative {
        text = format!("minus {}", text);
    }
    capitalize(&text)
}
