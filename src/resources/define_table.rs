//! Preprocessor Define Table
//!
//! Fixed-capacity slot table describing which optional features of a
//! technique are active for one material.
//!
//! # Layout
//!
//! Each slot carries a presence bit (one `u64` bitset for the whole table)
//! and a 32-bit payload whose interpretation depends on the slot's
//! [`VarType`]:
//!
//! - **Int**: two's complement integer
//! - **Float**: IEEE-754 bit pattern
//! - **Boolean**: presence only, `false` clears the slot so `#ifdef` fails
//!
//! Slot names and types live on the technique; the table only stores values,
//! so identical tables compare and hash in O(slots).
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut defines = DefineTable::new(technique.define_names().len());
//! defines.set_int(0, 4);
//! defines.set_bool(1, false);
//! let source = defines.generate_source(technique.define_names(), technique.define_types())?;
//! assert_eq!(source, "#define NUM_BONES 4\n");
//! ```

use std::fmt::Write as _;

use crate::errors::{MaterialError, Result};
use crate::resources::var_type::VarType;

/// Maximum number of slots a table (and thus a technique) can hold.
pub const MAX_DEFINES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DefineTable {
    is_set: u64,
    values: Vec<u32>,
}

impl DefineTable {
    /// Creates a table with `slots` unset slots.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        assert!(
            slots <= MAX_DEFINES,
            "A define table holds at most {MAX_DEFINES} slots, got {slots}"
        );
        Self {
            is_set: 0,
            values: vec![0; slots],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    fn check(&self, slot: usize) {
        assert!(
            slot < self.values.len(),
            "Define slot {slot} out of range (table has {} slots)",
            self.values.len()
        );
    }

    /// Marks `slot` as set with a raw payload.
    pub fn set(&mut self, slot: usize, payload: u32) {
        self.check(slot);
        self.is_set |= 1u64 << slot;
        self.values[slot] = payload;
    }

    pub fn set_int(&mut self, slot: usize, value: i32) {
        self.set(slot, value.cast_unsigned());
    }

    pub fn set_float(&mut self, slot: usize, value: f32) {
        self.set(slot, value.to_bits());
    }

    /// `true` sets the slot to `1`, `false` unsets it.
    pub fn set_bool(&mut self, slot: usize, value: bool) {
        if value {
            self.set(slot, 1);
        } else {
            self.unset(slot);
        }
    }

    /// Clears the presence bit and zeroes the payload.
    pub fn unset(&mut self, slot: usize) {
        self.check(slot);
        self.is_set &= !(1u64 << slot);
        self.values[slot] = 0;
    }

    #[must_use]
    pub fn is_set(&self, slot: usize) -> bool {
        self.check(slot);
        self.is_set & (1u64 << slot) != 0
    }

    #[must_use]
    pub fn get_int(&self, slot: usize) -> i32 {
        self.check(slot);
        self.values[slot].cast_signed()
    }

    #[must_use]
    pub fn get_float(&self, slot: usize) -> f32 {
        self.check(slot);
        f32::from_bits(self.values[slot])
    }

    #[must_use]
    pub fn get_bool(&self, slot: usize) -> bool {
        self.check(slot);
        self.values[slot] != 0
    }

    /// Emits one `#define NAME VALUE` line per set slot, in slot order.
    ///
    /// Float slots are reinterpreted from their bit pattern; NaN and infinite
    /// values have no GLSL literal and are rejected.
    pub fn generate_source(&self, names: &[String], types: &[VarType]) -> Result<String> {
        let mut source = String::new();
        for (slot, name) in names.iter().enumerate().take(self.values.len()) {
            if !self.is_set(slot) {
                continue;
            }
            let _ = write!(source, "#define {name} ");
            if types.get(slot) == Some(&VarType::Float) {
                let value = self.get_float(slot);
                if !value.is_finite() {
                    return Err(MaterialError::InvalidDefineValue {
                        name: name.clone(),
                        value: value.to_string(),
                    });
                }
                let _ = write!(source, "{value:?}");
            } else {
                let _ = write!(source, "{}", self.get_int(slot));
            }
            source.push('\n');
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn emits_set_slots_in_order() {
        let mut table = DefineTable::new(3);
        table.set_int(2, 4);
        table.set_bool(0, true);
        let source = table
            .generate_source(
                &names(&["A", "B", "C"]),
                &[VarType::Boolean, VarType::Boolean, VarType::Int],
            )
            .unwrap();
        assert_eq!(source, "#define A 1\n#define C 4\n");
    }

    #[test]
    fn unset_and_false_are_absent() {
        let mut table = DefineTable::new(2);
        table.set_int(0, 7);
        table.unset(0);
        table.set_bool(1, false);
        assert!(!table.is_set(0));
        assert_eq!(table.get_int(0), 0);
        let source = table
            .generate_source(&names(&["A", "B"]), &[VarType::Int, VarType::Boolean])
            .unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn floats_use_bit_pattern() {
        let mut table = DefineTable::new(1);
        table.set_float(0, 0.5);
        assert!((table.get_float(0) - 0.5).abs() < f32::EPSILON);
        let source = table
            .generate_source(&names(&["ALPHA"]), &[VarType::Float])
            .unwrap();
        assert_eq!(source, "#define ALPHA 0.5\n");

        table.set_float(0, 2.0);
        let source = table
            .generate_source(&names(&["ALPHA"]), &[VarType::Float])
            .unwrap();
        assert_eq!(source, "#define ALPHA 2.0\n");
    }

    #[test]
    fn nan_is_rejected() {
        let mut table = DefineTable::new(1);
        table.set_float(0, f32::NAN);
        let err = table
            .generate_source(&names(&["ALPHA"]), &[VarType::Float])
            .unwrap_err();
        assert!(matches!(err, MaterialError::InvalidDefineValue { .. }));
    }

    #[test]
    fn negative_ints() {
        let mut table = DefineTable::new(1);
        table.set_int(0, -3);
        assert_eq!(table.get_int(0), -3);
        let source = table.generate_source(&names(&["N"]), &[VarType::Int]).unwrap();
        assert_eq!(source, "#define N -3\n");
    }

    #[test]
    fn equal_tables_hash_equal() {
        let mut a = DefineTable::new(4);
        let mut b = DefineTable::new(4);
        a.set_int(1, 3);
        b.set_int(1, 3);
        assert_eq!(a, b);
        b.set_bool(3, true);
        assert_ne!(a, b);
        a.set_bool(3, true);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_slot_panics() {
        let mut table = DefineTable::new(2);
        table.set_int(2, 1);
    }

    #[test]
    fn full_capacity() {
        let mut table = DefineTable::new(MAX_DEFINES);
        table.set_bool(MAX_DEFINES - 1, true);
        assert!(table.is_set(63));
    }
}
