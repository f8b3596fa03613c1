//! JNI entry points called by `com.tanosys.videoapplication.VideoPlayActivity`.

use std::ptr;

use jni::JNIEnv;
use jni::objects::JObject;
use jni::sys::jstring;

use crate::error::BridgeError;
use crate::ffi::guard;
use crate::greeting::greeting;

const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

/// `native String stringFromJNI()` on `VideoPlayActivity`.
///
/// Returns a new Java string holding the greeting. When the string cannot be
/// created, returns null with a Java exception pending in the caller.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_tanosys_videoapplication_VideoPlayActivity_stringFromJNI<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    log::trace!("stringFromJNI called");
    match guard("stringFromJNI", || new_java_string(&mut env, greeting())) {
        Ok(value) => value,
        Err(err) => {
            raise(&mut env, &err);
            ptr::null_mut()
        }
    }
}

fn new_java_string(env: &mut JNIEnv<'_>, value: &str) -> Result<jstring, BridgeError> {
    Ok(env.new_string(value)?.into_raw())
}

/// Leaves an already pending exception (e.g. `OutOfMemoryError`) for the
/// caller; otherwise throws a `RuntimeException` carrying `err`.
fn raise(env: &mut JNIEnv<'_>, err: &BridgeError) {
    log::error!("stringFromJNI failed: {err}");
    if env.exception_check().unwrap_or(false) {
        return;
    }
    if let Err(throw_err) = env.throw_new(RUNTIME_EXCEPTION, err.to_string()) {
        log::error!("failed to throw {RUNTIME_EXCEPTION}: {throw_err}");
    }
}
