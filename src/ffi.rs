//! FFI bindings for whisking analysis
//!
//! This module provides C-compatible functions for calling the pipeline from
//! other languages. All functions use C strings (null-terminated). Results are
//! returned as JSON in allocated memory that must be freed by the caller using
//! `whisk_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::error::AnalysisError;
use crate::pipeline::WhiskingProcessor;
use crate::settings::{Settings, DEFAULT_REC_POINTS};
use crate::types::BinaryTrace;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// NULL selects the default settings
unsafe fn settings_from_ptr(settings_json: *const c_char) -> Result<Settings, AnalysisError> {
    if settings_json.is_null() {
        return Ok(Settings::default());
    }
    let json = cstr_to_string(settings_json)
        .ok_or_else(|| AnalysisError::ParseError("settings are not valid UTF-8".to_string()))?;
    Settings::from_json(&json)
}

/// Zero or negative selects `DEFAULT_REC_POINTS`
fn rec_points_from_arg(rec_points: i64) -> usize {
    if rec_points <= 0 {
        DEFAULT_REC_POINTS
    } else {
        rec_points as usize
    }
}

unsafe fn binary_from_ptr(json: *const c_char, name: &str) -> Result<BinaryTrace, AnalysisError> {
    let json = cstr_to_string(json)
        .ok_or_else(|| AnalysisError::ParseError(format!("invalid {} string pointer", name)))?;
    Ok(serde_json::from_str(&json)?)
}

/// Serialize `result` or record its error, returning NULL on failure
fn respond<T: Serialize>(result: Result<T, AnalysisError>) -> *mut c_char {
    match result.and_then(|value| serde_json::to_string(&value).map_err(AnalysisError::from)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyse a motion-tracking export and return the analysis as JSON.
///
/// # Safety
/// - `path` must be a valid null-terminated C string.
/// - `settings_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a newly allocated string that must be freed with `whisk_free_string`.
/// - Returns NULL on error; call `whisk_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn whisk_process_file(
    path: *const c_char,
    settings_json: *const c_char,
    rec_points: i64,
) -> *mut c_char {
    clear_last_error();

    let path_str = match cstr_to_string(path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path string pointer");
            return ptr::null_mut();
        }
    };

    respond(
        settings_from_ptr(settings_json)
            .and_then(WhiskingProcessor::new)
            .and_then(|p| p.process_file(&path_str, rec_points_from_arg(rec_points))),
    )
}

/// Isolate whisking bouts outside locomotion.
///
/// `whisking_json` and `locomotion_json` are JSON arrays of 0/1 values.
///
/// # Safety
/// - `whisking_json` and `locomotion_json` must be valid null-terminated C strings.
/// - `settings_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a newly allocated string that must be freed with `whisk_free_string`.
/// - Returns NULL on error; call `whisk_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn whisk_whisking_only(
    whisking_json: *const c_char,
    locomotion_json: *const c_char,
    settings_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let result = (|| {
        let whisking = binary_from_ptr(whisking_json, "whisking")?;
        let locomotion = binary_from_ptr(locomotion_json, "locomotion")?;
        let processor = WhiskingProcessor::new(settings_from_ptr(settings_json)?)?;
        processor.whisking_only(&whisking, &locomotion)
    })();

    respond(result)
}

// ============================================================================
// Processor API
// ============================================================================

/// Opaque handle to a WhiskingProcessor
pub struct WhiskProcessorHandle {
    processor: WhiskingProcessor,
}

/// Create a processor from settings JSON (NULL for defaults).
///
/// # Safety
/// - `settings_json` must be a valid null-terminated C string or NULL.
/// - Must be freed with `whisk_processor_free`.
/// - Returns NULL on error; call `whisk_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn whisk_processor_new(
    settings_json: *const c_char,
) -> *mut WhiskProcessorHandle {
    clear_last_error();

    match settings_from_ptr(settings_json).and_then(WhiskingProcessor::new) {
        Ok(processor) => Box::into_raw(Box::new(WhiskProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `whisk_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn whisk_processor_free(processor: *mut WhiskProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Analyse a motion-tracking export with a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `whisk_processor_new`.
/// - `path` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `whisk_free_string`.
/// - Returns NULL on error; call `whisk_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn whisk_processor_process_file(
    processor: *const WhiskProcessorHandle,
    path: *const c_char,
    rec_points: i64,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;

    let path_str = match cstr_to_string(path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path string pointer");
            return ptr::null_mut();
        }
    };

    respond(
        handle
            .processor
            .process_file(&path_str, rec_points_from_arg(rec_points)),
    )
}

/// Free a string returned by whisk functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a whisk function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn whisk_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next whisk function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn whisk_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn whisk_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
