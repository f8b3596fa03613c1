//! The greeting shown by `VideoPlayActivity`.

use std::os::raw::c_char;
use std::ptr;

use crate::error::{clear_error, cstring_from_str_lossy, report, videoapp_error_t};
use crate::ffi::guard;

/// Text returned by every greeting surface.
pub const GREETING: &str = "Hello from C++";

/// Returns the greeting.
pub fn greeting() -> &'static str {
    GREETING
}

/// Returns a heap-allocated, NUL-terminated copy of the greeting.
///
/// The returned string must be freed with `videoapp_string_free`. Returns null
/// and writes `out_error` on failure.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_greeting(out_error: *mut *mut videoapp_error_t) -> *mut c_char {
    clear_error(out_error);
    match guard("videoapp_greeting", || Ok(cstring_from_str_lossy(greeting()))) {
        Ok(value) => value.into_raw(),
        Err(err) => {
            report(out_error, &err);
            ptr::null_mut()
        }
    }
}
