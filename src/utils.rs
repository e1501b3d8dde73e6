//! Numeric parsing and fixed-point formatting shared by both pipelines.

/// Parse a decimal field, tolerating surrounding whitespace.
///
/// Non-finite values are only accepted in the `NaN` / `Infinity` spelling;
/// `nan`, `inf` and friends are treated as malformed.
///
/// ```
/// use recordbeam::utils::parse_f64;
/// assert_eq!(parse_f64(" 9.9 "), Some(9.9));
/// assert_eq!(parse_f64("bad"), None);
/// assert_eq!(parse_f64("inf"), None);
/// ```
pub fn parse_f64(field: &str) -> Option<f64> {
    let text = field.trim();
    let unsigned = text.trim_start_matches(['+', '-']);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic())
        && unsigned != "NaN"
        && unsigned != "Infinity"
    {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Format `value` with exactly `decimals` digits after the point.
///
/// Rounds half-up on the shortest decimal form of `value` (the digits
/// `{value}` prints), so `0.0625` becomes `0.063` at three places.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let mut digits: Vec<u8> = int_part.bytes().collect();
    let frac = frac_part.as_bytes();
    digits.extend((0..decimals).map(|i| frac.get(i).copied().unwrap_or(b'0')));

    if frac.get(decimals).is_some_and(|d| *d >= b'5') {
        round_up(&mut digits);
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| char::from(*d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| char::from(*d)));
    }
    out
}

/// Add one unit in the last place of an ASCII digit string.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Sum and count of a value stream, with the mean derived on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SumCount {
    pub sum: f64,
    pub count: u64,
}

impl SumCount {
    pub fn add(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    pub fn merge(&mut self, other: SumCount) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// `None` for an empty accumulator.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
