// Logging sink behind the `console_log!` macro.
// In the browser this is console.log; elsewhere (native tests, headless
// rendering) messages go to the `log` facade at debug level.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(s: &str) {
    ::log::debug!("{}", s);
}

// Note: The console_log macro is defined in lib.rs to avoid duplication
