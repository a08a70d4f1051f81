//! Identifier generation.
//!
//! Table columns carry `xr3:uid` GUIDs. The generator is injected so tests
//! can produce stable output.

use std::cell::Cell;

/// Source of GUID strings (without braces, uppercase).
pub trait IdGenerator {
    fn new_uuid(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn new_uuid(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }
}

/// Deterministic ids `00000000-0000-0000-0000-000000000001`, `…02`, …
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: Cell<u64>,
}

impl IdGenerator for SequentialIdGenerator {
    fn new_uuid(&self) -> String {
        let n = self.next.get() + 1;
        self.next.set(n);
        format!("00000000-0000-0000-0000-{n:012X}")
    }
}

/// Wrap a GUID in braces as used by `xr3:uid`.
#[must_use]
pub fn braced(id: &str) -> String {
    format!("{{{id}}}")
}
