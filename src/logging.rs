//! Logging configuration for the native library.
//!
//! Records from the `log` facade are filtered per target and either written to
//! stderr or handed to a C callback supplied by the host application.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Once, RwLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

use crate::error::{
    BridgeError, clear_error, cstring_from_str_lossy, report, videoapp_error_t,
};

/// Target prefix shared by every record this crate emits.
const CRATE_TARGET: &str = "native_lib";

const LOGGER_STATE_UNINIT: u8 = 0;
const LOGGER_STATE_READY: u8 = 1;
const LOGGER_STATE_FAILED: u8 = 2;

static LOGGER_STATE: AtomicU8 = AtomicU8::new(LOGGER_STATE_UNINIT);
static LOGGER_INIT: Once = Once::new();
static NATIVE_LOGGER: Lazy<NativeLogger> = Lazy::new(NativeLogger::new);

/// Log level values accepted by `videoapp_log_init`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum videoapp_log_level_t {
    VIDEOAPP_LOG_LEVEL_OFF = 0,
    VIDEOAPP_LOG_LEVEL_ERROR = 1,
    VIDEOAPP_LOG_LEVEL_WARN = 2,
    VIDEOAPP_LOG_LEVEL_INFO = 3,
    VIDEOAPP_LOG_LEVEL_DEBUG = 4,
    VIDEOAPP_LOG_LEVEL_TRACE = 5,
}

impl From<videoapp_log_level_t> for LevelFilter {
    fn from(value: videoapp_log_level_t) -> Self {
        match value {
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_OFF => LevelFilter::Off,
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_ERROR => LevelFilter::Error,
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_WARN => LevelFilter::Warn,
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_INFO => LevelFilter::Info,
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_DEBUG => LevelFilter::Debug,
            videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_TRACE => LevelFilter::Trace,
        }
    }
}

impl From<Level> for videoapp_log_level_t {
    fn from(value: Level) -> Self {
        match value {
            Level::Error => videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_ERROR,
            Level::Warn => videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_WARN,
            Level::Info => videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_INFO,
            Level::Debug => videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_DEBUG,
            Level::Trace => videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_TRACE,
        }
    }
}

/// Log record delivered to a C callback.
///
/// String pointers are only valid for the duration of the callback. `module_path`
/// and `file` may be null; `line` is 0 when unknown.
#[repr(C)]
pub struct videoapp_log_record_t {
    pub level: videoapp_log_level_t,
    pub target: *const c_char,
    pub message: *const c_char,
    pub module_path: *const c_char,
    pub file: *const c_char,
    pub line: u32,
}

/// Callback invoked for each enabled log record, from whichever thread logged it.
#[allow(non_camel_case_types)]
pub type videoapp_log_callback_t =
    Option<extern "C" fn(record: *const videoapp_log_record_t, user_data: *mut c_void)>;

/// Logging configuration.
///
/// A non-null `filter` is parsed as a `RUST_LOG`-style directive list and wins
/// over everything else. Otherwise `RUST_LOG` from the environment is used, and
/// failing that `level` is applied to this library's own records. A null
/// `callback` sends records to stderr.
#[repr(C)]
pub struct videoapp_log_config_t {
    pub level: videoapp_log_level_t,
    pub filter: *const c_char,
    pub callback: videoapp_log_callback_t,
    pub user_data: *mut c_void,
}

#[derive(Clone, Debug, PartialEq)]
struct TargetFilter {
    target: String,
    level: LevelFilter,
}

#[derive(Clone, Debug, PartialEq)]
struct LogFilter {
    default: LevelFilter,
    directives: Vec<TargetFilter>,
}

impl LogFilter {
    fn for_level(level: LevelFilter) -> Self {
        Self {
            default: LevelFilter::Off,
            directives: vec![TargetFilter {
                target: CRATE_TARGET.to_string(),
                level,
            }],
        }
    }

    fn parse(spec: &str) -> Result<Self, String> {
        let mut default = LevelFilter::Off;
        let mut directives = Vec::new();

        for (index, raw) in spec.split(',').enumerate() {
            let directive = raw.trim();
            if directive.is_empty() {
                continue;
            }
            let (target, level) = match directive.split_once('=') {
                Some((target, level)) => (target.trim(), Some(level.trim())),
                None => (directive, None),
            };

            if target.is_empty() {
                return Err(format!("empty log directive at position {index}"));
            }

            match level {
                Some("") => return Err(format!("missing log level for target `{target}`")),
                Some(level_str) => {
                    let level = parse_level(level_str)
                        .ok_or_else(|| format!("invalid level `{level_str}`"))?;
                    directives.push(TargetFilter {
                        target: target.to_string(),
                        level,
                    });
                }
                None => match parse_level(target) {
                    Some(level) => default = level,
                    None => directives.push(TargetFilter {
                        target: target.to_string(),
                        level: LevelFilter::Trace,
                    }),
                },
            }
        }

        Ok(Self { default, directives })
    }

    /// Longest matching target prefix decides; ties go to the later directive.
    fn level_for(&self, target: &str) -> LevelFilter {
        let mut best_level = self.default;
        let mut best_len = 0usize;

        for directive in &self.directives {
            if target.starts_with(&directive.target) && directive.target.len() >= best_len {
                best_len = directive.target.len();
                best_level = directive.level;
            }
        }
        best_level
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level().to_level_filter() <= self.level_for(metadata.target())
    }

    fn max_level(&self) -> LevelFilter {
        self.directives
            .iter()
            .map(|directive| directive.level)
            .fold(self.default, |max, level| max.max(level))
    }
}

struct LoggerConfig {
    filter: LogFilter,
    callback: videoapp_log_callback_t,
    // Stored as an address so the config stays Send + Sync.
    user_data: usize,
}

struct NativeLogger {
    config: RwLock<LoggerConfig>,
}

impl NativeLogger {
    fn new() -> Self {
        Self {
            config: RwLock::new(LoggerConfig {
                filter: LogFilter::for_level(LevelFilter::Info),
                callback: None,
                user_data: 0,
            }),
        }
    }

    fn update(&self, config: LoggerConfig) {
        let mut guard = self.config.write().unwrap_or_else(|err| err.into_inner());
        *guard = config;
    }

    fn with_config<T>(&self, f: impl FnOnce(&LoggerConfig) -> T) -> T {
        let guard = self.config.read().unwrap_or_else(|err| err.into_inner());
        f(&guard)
    }
}

impl Log for NativeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.with_config(|config| config.filter.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        let (callback, user_data, enabled) = self.with_config(|config| {
            (
                config.callback,
                config.user_data,
                config.filter.enabled(record.metadata()),
            )
        });

        if !enabled {
            return;
        }

        let Some(callback) = callback else {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
            return;
        };

        let target = cstring_from_str_lossy(record.target());
        let message = cstring_from_str_lossy(&record.args().to_string());
        let module_path = record.module_path().map(cstring_from_str_lossy);
        let file = record.file().map(cstring_from_str_lossy);
        let c_record = videoapp_log_record_t {
            level: record.level().into(),
            target: target.as_ptr(),
            message: message.as_ptr(),
            module_path: module_path.as_ref().map_or(ptr::null(), |value| value.as_ptr()),
            file: file.as_ref().map_or(ptr::null(), |value| value.as_ptr()),
            line: record.line().unwrap_or(0),
        };
        callback(&c_record, user_data as *mut c_void);
    }

    fn flush(&self) {}
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn read_optional_cstr(value: *const c_char) -> Option<String> {
    if value.is_null() {
        return None;
    }
    // Safety: caller guarantees a valid, NUL-terminated C string.
    let cstr = unsafe { CStr::from_ptr(value) };
    Some(cstr.to_string_lossy().into_owned())
}

fn resolve_filter(config: Option<&videoapp_log_config_t>) -> Result<LogFilter, BridgeError> {
    if let Some(filter) = config.and_then(|config| read_optional_cstr(config.filter)) {
        return LogFilter::parse(&filter).map_err(|err| {
            BridgeError::Logging(format!("invalid log filter `{filter}`: {err}"))
        });
    }

    if let Ok(filter) = std::env::var("RUST_LOG") {
        return LogFilter::parse(&filter).map_err(|err| {
            BridgeError::Logging(format!("invalid RUST_LOG value `{filter}`: {err}"))
        });
    }

    let level = config.map_or(videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_INFO, |config| {
        config.level
    });
    Ok(LogFilter::for_level(level.into()))
}

fn ensure_logger() -> Result<(), BridgeError> {
    LOGGER_INIT.call_once(|| {
        let state = match log::set_logger(&*NATIVE_LOGGER) {
            Ok(()) => LOGGER_STATE_READY,
            Err(_) => LOGGER_STATE_FAILED,
        };
        LOGGER_STATE.store(state, Ordering::SeqCst);
    });

    match LOGGER_STATE.load(Ordering::SeqCst) {
        LOGGER_STATE_READY => Ok(()),
        LOGGER_STATE_FAILED => Err(BridgeError::Logging(
            "logging already initialized by another logger".to_string(),
        )),
        _ => Err(BridgeError::Logging("logging failed to initialize".to_string())),
    }
}

fn apply(config: Option<&videoapp_log_config_t>) -> Result<(), BridgeError> {
    let filter = resolve_filter(config)?;
    ensure_logger()?;

    let max_level = filter.max_level();
    NATIVE_LOGGER.update(LoggerConfig {
        filter,
        callback: config.and_then(|config| config.callback),
        user_data: config.map_or(0, |config| config.user_data as usize),
    });
    log::set_max_level(max_level);
    Ok(())
}

/// Installs the logger with default settings, as done from `JNI_OnLoad`.
pub(crate) fn init_default() -> Result<(), BridgeError> {
    apply(None)
}

/// Writes the default logging configuration into `config`.
///
/// The defaults select INFO for this library's records and no callback.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_log_config_init(config: *mut videoapp_log_config_t) {
    if config.is_null() {
        return;
    }
    // Safety: caller provided a writable config pointer.
    unsafe {
        *config = videoapp_log_config_t {
            level: videoapp_log_level_t::VIDEOAPP_LOG_LEVEL_INFO,
            filter: ptr::null(),
            callback: None,
            user_data: ptr::null_mut(),
        };
    }
}

/// Initializes or reconfigures logging.
///
/// A null `config` selects the defaults. May be called any number of times.
#[unsafe(no_mangle)]
pub extern "C" fn videoapp_log_init(
    config: *const videoapp_log_config_t,
    out_error: *mut *mut videoapp_error_t,
) -> bool {
    clear_error(out_error);
    // Safety: caller provides either null or a valid config pointer.
    let config = unsafe { config.as_ref() };
    match apply(config) {
        Ok(()) => true,
        Err(err) => {
            report(out_error, &err);
            false
        }
    }
}
