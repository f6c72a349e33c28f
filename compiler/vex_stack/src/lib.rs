//! Stack safety for recursive traversals.
//!
//! Type comparison, hashing, rendering and mono classification all recurse
//! over the structure of a type, and runtime `repr`/`drop` recurse over nested
//! arrays and objects. Deeply nested inputs (an `array[array[...]]` a few
//! thousand levels deep) would otherwise overflow the native stack.
//!
//! Wrap each recursive step with [`ensure_sufficient_stack`]:
//!
//! ```text
//! fn render_into(&self, ty: &Type, out: &mut String) {
//!     ensure_sufficient_stack(|| match ty.kind() {
//!         TypeKind::Array { elem } => self.render_into(elem, out),
//!         // ...
//!     })
//! }
//! ```

/// Remaining stack below which we grow (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
