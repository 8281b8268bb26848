//! Parsing of the compact text forms accepted on the command line.

use crate::error::InputError;
use crate::types::{PieceSpec, Rect};
use crate::units::Unit;

/// Parses `WxH` in `unit` into millimetres.
pub fn parse_dimensions(s: &str, unit: Unit) -> Result<Rect, InputError> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| InputError::Dimensions(s.to_string()))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| unit.to_mm(v))
            .ok_or_else(|| InputError::Dimensions(s.to_string()))
    };
    Ok(Rect::new(parse(w)?, parse(h)?))
}

/// Parses `[ID:]WxH:QTY`. Pieces without an id are named `P<n>` after their
/// 1-based position.
pub fn parse_piece(s: &str, position: usize, unit: Unit) -> Result<PieceSpec, InputError> {
    let parts: Vec<&str> = s.split(':').collect();
    let (id, dims, qty) = match parts.as_slice() {
        [dims, qty] => (format!("P{position}"), *dims, *qty),
        [id, dims, qty] if !id.is_empty() => (id.to_string(), *dims, *qty),
        _ => return Err(InputError::Piece(s.to_string())),
    };
    let rect = parse_dimensions(dims, unit)?;
    let quantity = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| InputError::Quantity(s.to_string()))?;
    Ok(PieceSpec::new(id, rect.w, rect.h, quantity))
}
