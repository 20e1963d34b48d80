//! Converting rectangles to and from script sequences `{x, y, w, h}`.

use jive_core::{Rect, ScriptError, ScriptStack, ValueType};

use crate::stack_check::with_stack_check;

/// Read the sequence at `index` as a rectangle.
///
/// The value must be a table whose elements `1..=4` are all numeric; they
/// become `x`, `y`, `w` and `h`, truncated toward zero and saturated to the
/// `i32` range (infinities included). NaN counts as non-numeric. There are no
/// defaults. The stack is unchanged on return.
pub fn to_rect<S: ScriptStack + ?Sized>(s: &mut S, index: i32) -> Result<Rect, ScriptError> {
    let index = s.abs_index(index);

    with_stack_check(s, 0, |s| {
        s.check_type(index, ValueType::Table)?;

        let mut v = [0i32; 4];
        for (field, slot) in (1..).zip(v.iter_mut()) {
            s.raw_get_i(index, field)?;
            let n = s
                .to_number(-1)
                .filter(|n| !n.is_nan())
                .ok_or_else(|| ScriptError::FieldTypeMismatch {
                    slot: index,
                    field,
                    expected: ValueType::Number.name().to_string(),
                    actual: s.type_name(-1).to_string(),
                })?;
            s.pop(1);
            *slot = n.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        }

        Ok(Rect::new(v[0], v[1], v[2], v[3]))
    })
}

/// Push `r` as a new sequence `{x, y, w, h}` (+1).
pub fn push_rect<S: ScriptStack + ?Sized>(s: &mut S, r: &Rect) -> Result<(), ScriptError> {
    with_stack_check(s, 1, |s| {
        s.new_table();
        for (field, v) in (1..).zip(<[i32; 4]>::from(*r)) {
            s.push_number(v as f64);
            s.raw_set_i(-2, field)?;
        }
        Ok(())
    })
}
