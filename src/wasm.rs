//! Browser build support. Panics in the browser otherwise vanish into an `unreachable` trap, so
//! the hook forwards them to the developer console before the game starts.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
