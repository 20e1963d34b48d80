//! Stack dumps for debugging.

use std::fmt::Write;

use jive_core::{ScriptStack, ValueType};

/// Render every slot of the current frame, bottom to top, under `label`.
///
/// Nil prints as `nil`, numbers as fixed-point, booleans as `0`/`1`, strings as
/// their text and everything else as its type name and address. The stack is
/// not modified.
pub fn format_stack<S: ScriptStack + ?Sized>(s: &S, label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", label);

    for i in 1..=s.get_top() {
        let t = s.type_of(i);
        let _ = match t {
            ValueType::Nil => writeln!(out, "\t{}: nil", i),
            ValueType::Number => {
                writeln!(out, "\t{}: number {:.6}", i, s.to_number(i).unwrap_or_default())
            }
            ValueType::Boolean => writeln!(out, "\t{}: boolean {}", i, s.to_boolean(i) as i32),
            ValueType::String => {
                writeln!(out, "\t{}: string {}", i, s.to_str(i).unwrap_or_default())
            }
            ValueType::Table
            | ValueType::Function
            | ValueType::Userdata
            | ValueType::Thread
            | ValueType::LightUserdata => {
                writeln!(out, "\t{}: {} {:#x}", i, t.name(), s.to_pointer(i))
            }
            ValueType::None => Ok(()),
        };
    }
    out
}

/// Write [`format_stack`] to stderr.
pub fn print_stack<S: ScriptStack + ?Sized>(s: &S, label: &str) {
    eprint!("{}", format_stack(s, label));
}
