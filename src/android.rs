//! Library load hook and Android context wiring.

use std::ffi::c_void;
use std::sync::OnceLock;

use jni::JavaVM;
use jni::sys::{JNI_VERSION_1_6, jint};

use crate::error::{BridgeError, clear_error, report, videoapp_error_t};
use crate::ffi::guard;
use crate::logging;

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

#[cfg(target_os = "android")]
static ANDROID_CONTEXT_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Called by the runtime when `System.loadLibrary("native_lib")` loads this library.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    if let Err(err) = logging::init_default() {
        eprintln!("native_lib: {err}");
    }
    if JAVA_VM.set(vm).is_err() {
        log::debug!("JNI_OnLoad called again; keeping the first JavaVM");
    }
    log::info!("native_lib loaded");
    JNI_VERSION_1_6
}

fn java_vm() -> Result<&'static JavaVM, BridgeError> {
    JAVA_VM.get().ok_or(BridgeError::NotLoaded)
}

/// Registers an Android `Context` with `ndk-context`.
///
/// `context` must be a global JNI reference to an Android `Context`. The
/// `JavaVM` captured by `JNI_OnLoad` is used alongside it. Calling this again
/// after a successful call is a no-op.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_android_initialize_context(
    context: *mut c_void,
    out_error: *mut *mut videoapp_error_t,
) -> bool {
    clear_error(out_error);
    match guard("videoapp_android_initialize_context", || initialize_context(context)) {
        Ok(()) => true,
        Err(err) => {
            report(out_error, &err);
            false
        }
    }
}

fn initialize_context(context: *mut c_void) -> Result<(), BridgeError> {
    if context.is_null() {
        return Err(BridgeError::NullArgument("context"));
    }
    let vm = java_vm()?;

    #[cfg(target_os = "android")]
    {
        if ANDROID_CONTEXT_INITIALIZED.get().is_some() {
            return Ok(());
        }
        // Safety: the VM pointer comes from JNI_OnLoad and the caller guarantees
        // `context` is a valid global reference.
        unsafe {
            ndk_context::initialize_android_context(vm.get_java_vm_pointer().cast(), context);
        }
        let _ = ANDROID_CONTEXT_INITIALIZED.set(());
        log::debug!("Android context initialized");
        Ok(())
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = vm;
        Err(BridgeError::Unsupported("videoapp_android_initialize_context"))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::ptr;

    use super::*;
    use crate::error::{videoapp_error_free, videoapp_error_message};

    fn message(error: *mut videoapp_error_t) -> String {
        let text = unsafe { CStr::from_ptr(videoapp_error_message(error)) }
            .to_string_lossy()
            .into_owned();
        videoapp_error_free(error);
        text
    }

    #[test]
    fn null_context_is_rejected() {
        let mut error: *mut videoapp_error_t = ptr::null_mut();
        assert!(!videoapp_android_initialize_context(ptr::null_mut(), &mut error));
        assert_eq!(message(error), "context was null");
    }

    #[test]
    fn requires_jni_on_load() {
        let mut error: *mut videoapp_error_t = ptr::null_mut();
        let mut fake_context = 0u8;
        let ok = videoapp_android_initialize_context(
            (&mut fake_context as *mut u8).cast(),
            &mut error,
        );
        assert!(!ok);
        assert!(message(error).starts_with("JNI_OnLoad has not run"));
    }
}
