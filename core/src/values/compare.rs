//! Kind-exact comparison and aggregation over [`Value`]s.
//!
//! Operands must share the exact same kind: an `I32` never compares with an
//! `I64`, and integers never compare with floats.

use core::cmp::Ordering;

use super::Value;

/// Total order for floats: NaN sorts before every number and equals itself.
fn cmp_float<F: PartialOrd>(a: F, b: F) -> Ordering {
    let a_nan = a.partial_cmp(&a).is_none();
    let b_nan = b.partial_cmp(&b).is_none();
    match (a_nan, b_nan) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Compares two values of the same kind.
///
/// Supported kinds are every fixed-width integer, both floats, strings
/// (lexicographic by bytes) and timestamps (by instant). Returns `None` for
/// any other kind or for a kind mismatch.
pub fn cmp_any(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::I8(a), Value::I8(b)) => Some(a.cmp(b)),
        (Value::I16(a), Value::I16(b)) => Some(a.cmp(b)),
        (Value::I32(a), Value::I32(b)) => Some(a.cmp(b)),
        (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
        (Value::U8(a), Value::U8(b)) => Some(a.cmp(b)),
        (Value::U16(a), Value::U16(b)) => Some(a.cmp(b)),
        (Value::U32(a), Value::U32(b)) => Some(a.cmp(b)),
        (Value::U64(a), Value::U64(b)) => Some(a.cmp(b)),
        (Value::F32(a), Value::F32(b)) => Some(cmp_float(*a, *b)),
        (Value::F64(a), Value::F64(b)) => Some(cmp_float(*a, *b)),
        (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Time(a), Value::Time(b)) => Some(if a == b {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Fold {
    Sum,
    Avg,
}

macro_rules! fold_int {
    ($values:expr, $variant:ident, $ty:ty, $fold:expr) => {{
        let mut total: $ty = 0;
        for value in $values {
            let Value::$variant(v) = value else {
                return None;
            };
            total = total.wrapping_add(*v);
        }
        match $fold {
            Fold::Sum => Some(Value::$variant(total)),
            Fold::Avg => total
                .checked_div($values.len() as $ty)
                .map(Value::$variant),
        }
    }};
}

macro_rules! fold_float {
    ($values:expr, $variant:ident, $ty:ty, $fold:expr) => {{
        let mut total: $ty = 0.0;
        for value in $values {
            let Value::$variant(v) = value else {
                return None;
            };
            total += *v;
        }
        match $fold {
            Fold::Sum => Some(Value::$variant(total)),
            Fold::Avg => Some(Value::$variant(total / $values.len() as $ty)),
        }
    }};
}

fn fold(values: &[Value], fold: Fold) -> Option<Value> {
    match values.first()? {
        Value::I8(_) => fold_int!(values, I8, i8, fold),
        Value::I16(_) => fold_int!(values, I16, i16, fold),
        Value::I32(_) => fold_int!(values, I32, i32, fold),
        Value::I64(_) => fold_int!(values, I64, i64, fold),
        Value::U8(_) => fold_int!(values, U8, u8, fold),
        Value::U16(_) => fold_int!(values, U16, u16, fold),
        Value::U32(_) => fold_int!(values, U32, u32, fold),
        Value::U64(_) => fold_int!(values, U64, u64, fold),
        Value::F32(_) => fold_float!(values, F32, f32, fold),
        Value::F64(_) => fold_float!(values, F64, f64, fold),
        _ => None,
    }
}

/// Sums a non-empty slice of same-kind numbers.
///
/// Integer sums wrap on overflow. Returns `None` for an empty slice, mixed
/// kinds or a non-numeric kind.
pub fn sum_any(values: &[Value]) -> Option<Value> {
    fold(values, Fold::Sum)
}

/// Averages a non-empty slice of same-kind numbers.
///
/// The count is cast to the operand kind, so integer averages truncate. A
/// count that wraps to zero in a narrow kind yields `None`.
pub fn avg_any(values: &[Value]) -> Option<Value> {
    fold(values, Fold::Avg)
}
