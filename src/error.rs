use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use thiserror::Error;

/// Failures raised while serving a call across the native boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0} was null")]
    NullArgument(&'static str),
    #[error("panic while running {0}")]
    Panic(&'static str),
    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),
    #[error("JNI_OnLoad has not run; load the library through System.loadLibrary first")]
    NotLoaded,
    #[error("{0} is only supported on Android")]
    Unsupported(&'static str),
    #[error("{0}")]
    Logging(String),
}

/// Opaque error type for C callers.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct videoapp_error_t;

struct ErrorHandle {
    message: CString,
}

pub(crate) fn cstring_from_str_lossy(value: &str) -> CString {
    if value.as_bytes().contains(&0) {
        let sanitized: String = value.chars().map(|c| if c == '\0' { ' ' } else { c }).collect();
        CString::new(sanitized).unwrap_or_default()
    } else {
        CString::new(value).unwrap_or_default()
    }
}

pub(crate) fn clear_error(out_error: *mut *mut videoapp_error_t) {
    if !out_error.is_null() {
        // Safety: caller provided a valid out_error pointer.
        unsafe {
            *out_error = ptr::null_mut();
        }
    }
}

pub(crate) fn write_error(out_error: *mut *mut videoapp_error_t, message: impl Into<String>) {
    if out_error.is_null() {
        return;
    }
    let cstring = cstring_from_str_lossy(&message.into());
    let handle = Box::new(ErrorHandle { message: cstring });
    // Safety: out_error is non-null and points to writable memory.
    unsafe {
        *out_error = Box::into_raw(handle) as *mut videoapp_error_t;
    }
}

pub(crate) fn report(out_error: *mut *mut videoapp_error_t, err: &BridgeError) {
    log::warn!("{err}");
    write_error(out_error, err.to_string());
}

/// Returns the message for an error allocated by this library.
///
/// The returned pointer is valid as long as the error handle is alive.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_error_message(error: *const videoapp_error_t) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    // Safety: error must be a valid handle allocated by this library.
    let handle = unsafe { &*(error as *const ErrorHandle) };
    handle.message.as_ptr()
}

/// Frees an error returned through an `out_error` pointer.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_error_free(error: *mut videoapp_error_t) {
    if error.is_null() {
        return;
    }
    // Safety: error must be a valid handle allocated by this library.
    unsafe {
        drop(Box::from_raw(error as *mut ErrorHandle));
    }
}

/// Frees a string returned by this library, such as `videoapp_greeting`.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }
    // Safety: value must be a string allocated by this library via CString::into_raw.
    unsafe {
        drop(CString::from_raw(value));
    }
}
