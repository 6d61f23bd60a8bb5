use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with thousands separators: ₹1,234.56
pub fn money(val: Decimal, symbol: &str) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs().round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}

/// Signed display used in lists: `+ ₹10.00` for income, `- ₹10.00` for expense.
pub fn signed_money(val: Decimal, income: bool, symbol: &str) -> String {
    let sign = if income { '+' } else { '-' };
    format!("{sign} {}", money(val.abs(), symbol))
}
