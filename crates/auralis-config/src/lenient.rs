//! Forgiving deserializers for stored settings values.
//!
//! The control panel writes whatever its widgets hold: numbers may arrive as
//! strings, counts as `"8"`, flags as `0`/`1`. Every field parses to a usable
//! value instead of failing the whole snapshot.

use auralis_core::BranchCount;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn loose<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Loose>, D::Error> {
    // unrecognised shapes (arrays, tables) are treated as absent
    Ok(Option::<Loose>::deserialize(deserializer).unwrap_or(None))
}

/// Signed number; unparseable input gives 0.
pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = match loose(deserializer)? {
        Some(Loose::Number(n)) => n,
        Some(Loose::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Loose::Bool(b)) => f64::from(u8::from(b)),
        None => 0.0,
    };
    Ok(if value.is_finite() { value as f32 } else { 0.0 })
}

/// On/off flag; numbers are true when non-zero.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match loose(deserializer)? {
        Some(Loose::Bool(b)) => b,
        Some(Loose::Number(n)) => n != 0.0 && !n.is_nan(),
        Some(Loose::Text(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on") || s == "1"
        }
        None => false,
    })
}

/// Same as [`flag`] but absent values are `true`.
pub(crate) fn flag_default_on<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match loose(deserializer)? {
        None => true,
        Some(Loose::Bool(b)) => b,
        Some(Loose::Number(n)) => n != 0.0 && !n.is_nan(),
        Some(Loose::Text(s)) => !s.trim().eq_ignore_ascii_case("false") && s.trim() != "0",
    })
}

/// Branch count from `"8"`, `8`, `8.7` or `"8d"`; anything else is the default.
pub(crate) fn branch_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BranchCount, D::Error> {
    Ok(match loose(deserializer)? {
        Some(Loose::Number(n)) => BranchCount::from_f64(n),
        Some(Loose::Text(s)) => BranchCount::parse_lenient(&s),
        Some(Loose::Bool(_)) | None => BranchCount::DEFAULT,
    })
}

/// Free-form string; non-strings become empty.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match loose(deserializer)? {
        Some(Loose::Text(s)) => s,
        Some(Loose::Number(n)) => n.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}

/// Counts are stored as strings, the way the control panel writes them.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn serialize_count<S: Serializer>(
    count: &BranchCount,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(count)
}
