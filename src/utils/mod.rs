/// Round to two decimal places, the precision every reported rate uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `part` in `whole` as a percentage; 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Runs per 100 balls; 0 when no balls were faced.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / balls as f64 * 100.0)
}

/// Runs conceded per six legal balls; 0 when nothing was bowled.
pub fn economy(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / (balls as f64 / 6.0))
}

/// Cricket over notation: 27 balls is "4.3", not 4.5.
pub fn overs_notation(balls: u32) -> String {
    format!("{}.{}", balls / 6, balls % 6)
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest,
/// so "kings xi punjab" becomes "Kings Xi Punjab".
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
