//! Stack growth for deeply nested scripts.
//!
//! Blocks nest through recursion in both the parser (`block_item`) and the
//! evaluator (`eval_block`, nested SIARD declarations), so a script with
//! very deep `If`/`For` or `Field` nesting could exhaust the native stack.
//! Wrapping each level in [`ensure_sufficient_stack`] grows the stack on
//! demand instead.

/// Grow when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
