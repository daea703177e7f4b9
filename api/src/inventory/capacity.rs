use thiserror::Error;

/// GB per TB; both filter input and stored descriptors use binary units.
const GB_PER_TB: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapacityError {
    #[error("malformed capacity: no numeric magnitude in {0:?}")]
    MalformedCapacity(String),
    #[error("unsupported unit: {0:?} (expected GB or TB)")]
    UnsupportedUnit(String),
}

/// Parses a single `<number><unit>` capacity such as `500GB`, `2 TB` or `1.5tb`
/// into gigabytes.
///
/// Only the first whitespace-separated token after the number is taken as the unit;
/// anything after it is ignored.
pub fn parse_capacity(text: &str) -> Result<f64, CapacityError> {
    let text = text.trim();
    let (magnitude, rest) = split_magnitude(text);
    let value = magnitude
        .parse::<f64>()
        .map_err(|_| CapacityError::MalformedCapacity(text.to_string()))?;

    let unit = rest.split_whitespace().next().unwrap_or("");
    unit_multiplier(unit)
        .map(|multiplier| value * multiplier)
        .ok_or_else(|| CapacityError::UnsupportedUnit(unit.to_string()))
}

/// Total capacity in GB of a stored disk descriptor such as `2x250GB SATA2`.
///
/// Stored records are never revalidated, so this never fails: an unreadable count,
/// size or unit contributes zero to the total. Descriptors without a count
/// separator (see [`count_separator`]) count as a single unit.
pub fn descriptor_total_gb(descriptor: &str) -> f64 {
    let descriptor = descriptor.trim();
    let (count, sized) = match count_separator(descriptor) {
        Some(idx) => (parse_count(&descriptor[..idx]), &descriptor[idx + 1..]),
        None => (1.0, descriptor),
    };

    // Skip anything before the size digits, e.g. a stray space after the `x`.
    let sized = sized.trim_start_matches(|c: char| !c.is_ascii_digit());
    let (magnitude, rest) = split_magnitude(sized);
    let size = magnitude.parse::<f64>().unwrap_or(0.0);

    let unit: String = rest
        .trim_start()
        .chars()
        .take(2)
        .collect();
    let multiplier = unit_multiplier(&unit).unwrap_or(0.0);

    count * size * multiplier
}

/// Byte offset of the lowercase `x` between a count and a size, as in `2x250GB`
/// or `2 x 250GB`. An `x` elsewhere (`exFAT`, `Xtreme`) is part of the text.
fn count_separator(descriptor: &str) -> Option<usize> {
    descriptor
        .match_indices('x')
        .map(|(idx, _)| idx)
        .find(|&idx| {
            let before = descriptor[..idx].trim_end();
            let after = descriptor[idx + 1..].trim_start();
            before.ends_with(|c: char| c.is_ascii_digit())
                && after.starts_with(|c: char| c.is_ascii_digit())
        })
}

fn parse_count(token: &str) -> f64 {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Splits the leading decimal number (digits with at most one `.`) off `text`.
fn split_magnitude(text: &str) -> (&str, &str) {
    let mut seen_dot = false;
    let end = text
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text.split_at(end)
}

fn unit_multiplier(unit: &str) -> Option<f64> {
    if unit.eq_ignore_ascii_case("GB") {
        Some(1.0)
    } else if unit.eq_ignore_ascii_case("TB") {
        Some(GB_PER_TB)
    } else {
        None
    }
}
