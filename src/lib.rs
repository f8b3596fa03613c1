//! Native library behind the video application's `VideoPlayActivity`.
//!
//! Exposes the greeting over JNI and a small C ABI for native callers.

mod android;
mod error;
mod ffi;
mod greeting;
mod jni_bridge;
mod logging;

pub use android::{JNI_OnLoad, videoapp_android_initialize_context};
pub use error::{
    BridgeError, videoapp_error_free, videoapp_error_message, videoapp_error_t,
    videoapp_string_free,
};
pub use greeting::{GREETING, greeting, videoapp_greeting};
pub use jni_bridge::Java_com_tanosys_videoapplication_VideoPlayActivity_stringFromJNI;
pub use logging::{
    videoapp_log_callback_t, videoapp_log_config_init, videoapp_log_config_t, videoapp_log_init,
    videoapp_log_level_t, videoapp_log_record_t,
};
