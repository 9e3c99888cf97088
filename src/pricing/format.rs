//! Display formatting and tolerant parsing of numbers typed into the grid.
//!
//! Output uses `.` for thousands and `,` for decimals (`1.234,56`).

const PLACEHOLDER: &str = "-";

pub fn format_money(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => group_two_decimals(v),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", group_two_decimals(v)),
        _ => PLACEHOLDER.to_string(),
    }
}

fn group_two_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed != "0.00";
    format!("{}{grouped},{frac_part}", if negative { "-" } else { "" })
}

/// Parses a user-typed number. Returns `None` for anything that is not a
/// finite number, including the empty string.
///
/// When both `.` and `,` appear, the later one is the decimal separator. A
/// single separator is decimal; a separator repeated several times is
/// thousands grouping.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    let (sign, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    if body.is_empty() {
        return None;
    }

    let normalized = match (body.rfind('.'), body.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (group, decimal) = if dot > comma { (',', '.') } else { ('.', ',') };
            let (int_part, frac_part) = body.rsplit_once(decimal)?;
            format!("{}.{frac_part}", ungroup(int_part, group)?)
        }
        (None, Some(_)) => single_kind(body, ',')?,
        (Some(_), None) => single_kind(body, '.')?,
        (None, None) => body.to_string(),
    };

    let digits_ok = normalized.chars().all(|c| c.is_ascii_digit() || c == '.')
        && normalized.chars().any(|c| c.is_ascii_digit())
        && normalized.matches('.').count() <= 1;
    if !digits_ok {
        return None;
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| sign * v)
}

fn single_kind(body: &str, sep: char) -> Option<String> {
    if body.matches(sep).count() == 1 {
        Some(body.replace(sep, "."))
    } else {
        ungroup(body, sep)
    }
}

/// Strips thousands separators, requiring well-formed groups of three.
fn ungroup(int_part: &str, sep: char) -> Option<String> {
    let mut groups = int_part.split(sep);
    let head = groups.next()?;
    if head.is_empty() && int_part.contains(sep) {
        return None;
    }

    let mut out = head.to_string();
    for group in groups {
        if group.len() != 3 || head.len() > 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}
