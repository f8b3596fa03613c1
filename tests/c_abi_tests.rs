use std::ffi::{CStr, c_void};
use std::ptr;
use std::sync::Mutex;
use std::thread;

use native_lib::{
    GREETING, videoapp_android_initialize_context, videoapp_error_free, videoapp_error_message,
    videoapp_error_t, videoapp_greeting, videoapp_log_config_init, videoapp_log_config_t,
    videoapp_log_init, videoapp_log_level_t, videoapp_log_record_t, videoapp_string_free,
};

static RECORDS: Mutex<Vec<(videoapp_log_level_t, String, String)>> = Mutex::new(Vec::new());

extern "C" fn capture(record: *const videoapp_log_record_t, _user_data: *mut c_void) {
    let record = unsafe { &*record };
    let target = unsafe { CStr::from_ptr(record.target) }.to_string_lossy().into_owned();
    let message = unsafe { CStr::from_ptr(record.message) }.to_string_lossy().into_owned();
    RECORDS.lock().unwrap().push((record.level, target, message));
}

fn greeting_text() -> String {
    let mut error: *mut videoapp_error_t = ptr::null_mut();
    let value = videoapp_greeting(&mut error);
    assert!(error.is_null());
    assert!(!value.is_null());
    let text = unsafe { CStr::from_ptr(value) }.to_str().unwrap().to_owned();
    videoapp_string_free(value);
    text
}

#[test]
fn greeting_over_c_abi_is_the_literal_text() {
    assert_eq!(greeting_text(), "Hello from C++");
    assert_eq!(greeting_text(), GREETING);
}

#[test]
fn greeting_calls_return_distinct_allocations() {
    let first = videoapp_greeting(ptr::null_mut());
    let second = videoapp_greeting(ptr::null_mut());
    assert_ne!(first, second);
    unsafe {
        assert_eq!(CStr::from_ptr(first), CStr::from_ptr(second));
    }
    videoapp_string_free(first);
    videoapp_string_free(second);
}

#[test]
fn greeting_is_consistent_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| (0..50).map(|_| greeting_text()).collect::<Vec<_>>()))
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().iter().all(|text| text == GREETING));
    }
}

#[test]
fn free_functions_accept_null() {
    videoapp_string_free(ptr::null_mut());
    videoapp_error_free(ptr::null_mut());
    assert!(videoapp_error_message(ptr::null()).is_null());
}

#[test]
fn log_callback_receives_boundary_errors() {
    let mut config = std::mem::MaybeUninit::<videoapp_log_config_t>::uninit();
    videoapp_log_config_init(config.as_mut_ptr());
    let mut config = unsafe { config.assume_init() };
    let filter = c"native_lib=warn";
    config.filter = filter.as_ptr();
    config.callback = Some(capture);

    let mut error: *mut videoapp_error_t = ptr::null_mut();
    assert!(videoapp_log_init(&config, &mut error));
    assert!(error.is_null());

    assert!(!videoapp_android_initialize_context(ptr::null_mut(), &mut error));
    assert!(!error.is_null());
    let message = unsafe { CStr::from_ptr(videoapp_error_message(error)) }
        .to_str()
        .unwrap()
        .to_owned();
    videoapp_error_free(error);
    assert_eq!(message, "context was null");

    let records = RECORDS.lock().unwrap();
    assert!(records.iter().any(|(level, target, text)| {
        *level == videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_WARN
            && target.starts_with("native_lib")
            && text == "context was null"
    }));
}

#[test]
fn invalid_log_filter_is_rejected() {
    let mut config = std::mem::MaybeUninit::<videoapp_log_config_t>::uninit();
    videoapp_log_config_init(config.as_mut_ptr());
    let mut config = unsafe { config.assume_init() };
    let filter = c"native_lib=verbose";
    config.filter = filter.as_ptr();

    let mut error: *mut videoapp_error_t = ptr::null_mut();
    assert!(!videoapp_log_init(&config, &mut error));
    let message = unsafe { CStr::from_ptr(videoapp_error_message(error)) }
        .to_string_lossy()
        .into_owned();
    videoapp_error_free(error);
    assert!(message.starts_with("invalid log filter `native_lib=verbose`"));
}
