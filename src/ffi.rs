//! FFI bindings for the SlimVita funnel engine
//!
//! C-compatible functions for embedding the calculator and questionnaire in
//! other runtimes. All functions take and return null-terminated UTF-8
//! strings; returned strings are allocated here and must be released with
//! `slimvita_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::calculator::calculate_health_metrics;
use crate::questionnaire::{questions, AnswerEvent, QuestionnaireController};
use crate::types::UserProfile;

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

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a serialization result across the boundary
fn json_result<E: std::fmt::Display>(result: Result<String, E>) -> *mut c_char {
    match result {
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

/// Compute health metrics for a profile.
///
/// # Safety
/// - `profile_json` must be a valid null-terminated C string holding a
///   `UserProfile` JSON object.
/// - Returns a newly allocated `HealthResults` JSON string that must be freed
///   with `slimvita_free_string`.
/// - Returns NULL on error; call `slimvita_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn slimvita_calculate(profile_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(profile_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid profile string pointer");
            return ptr::null_mut();
        }
    };

    json_result(
        serde_json::from_str::<UserProfile>(&json_str)
            .and_then(|profile| serde_json::to_string(&calculate_health_metrics(&profile))),
    )
}

/// List the questionnaire steps as a JSON array.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `slimvita_free_string`.
#[no_mangle]
pub unsafe extern "C" fn slimvita_questions() -> *mut c_char {
    clear_last_error();
    json_result(serde_json::to_string(questions()))
}

// ============================================================================
// Stateful Questionnaire API
// ============================================================================

/// Opaque handle to a questionnaire controller
pub struct QuestionnaireHandle {
    controller: QuestionnaireController,
}

/// Create a questionnaire positioned on its first step.
///
/// # Safety
/// - Must be freed with `slimvita_questionnaire_free`.
#[no_mangle]
pub unsafe extern "C" fn slimvita_questionnaire_new() -> *mut QuestionnaireHandle {
    clear_last_error();
    Box::into_raw(Box::new(QuestionnaireHandle {
        controller: QuestionnaireController::new(),
    }))
}

/// Free a questionnaire.
///
/// # Safety
/// - `handle` must be a pointer returned by `slimvita_questionnaire_new`, or
///   NULL. The pointer is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn slimvita_questionnaire_free(handle: *mut QuestionnaireHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Apply one answer event (`{"action": "select", ...}`) and return the
/// resulting step report as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `slimvita_questionnaire_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `slimvita_free_string`.
/// - Returns NULL on error; call `slimvita_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn slimvita_questionnaire_apply(
    handle: *mut QuestionnaireHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null questionnaire pointer");
        return ptr::null_mut();
    }

    let handle = &mut *handle;

    let json_str = match cstr_to_string(event_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid event string pointer");
            return ptr::null_mut();
        }
    };

    let event: AnswerEvent = match serde_json::from_str(&json_str) {
        Ok(event) => event,
        Err(e) => {
            set_last_error(&format!("Invalid event: {e}"));
            return ptr::null_mut();
        }
    };

    match handle.controller.apply(&event) {
        Ok(report) => json_result(serde_json::to_string(&report)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `slimvita_*` function.
///
/// # Safety
/// - `ptr` must be a pointer returned by this library, or NULL.
#[no_mangle]
pub unsafe extern "C" fn slimvita_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Last error message on this thread.
///
/// # Safety
/// - The pointer stays valid until the next `slimvita_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if the last call succeeded.
#[no_mangle]
pub unsafe extern "C" fn slimvita_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn slimvita_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_json() -> CString {
        CString::new(
            r#"{
                "gender": "male",
                "age_range": "25-34",
                "height": 180.0,
                "current_weight": 80.0,
                "target_weight": 75.0,
                "activity_level": "moderate",
                "goal": "lose-weight"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_calculate() {
        let json = profile_json();

        unsafe {
            let result = slimvita_calculate(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["bmr"], 1853);
            assert_eq!(value["calorie_target"], 2373);
            assert_eq!(value["estimated_weeks"], 10);

            slimvita_free_string(result);
        }
    }

    #[test]
    fn test_ffi_questions() {
        unsafe {
            let result = slimvita_questions();
            assert!(!result.is_null());

            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(value.as_array().unwrap().len(), 23);
            assert_eq!(value[0]["id"], "gender");

            slimvita_free_string(result);
        }
    }

    #[test]
    fn test_ffi_questionnaire_lifecycle() {
        unsafe {
            let handle = slimvita_questionnaire_new();
            assert!(!handle.is_null());

            let select =
                CString::new(r#"{"action":"select","question":"gender","value":"female"}"#).unwrap();
            let report = slimvita_questionnaire_apply(handle, select.as_ptr());
            assert!(!report.is_null());
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(report).to_str().unwrap()).unwrap();
            assert_eq!(value["auto_advance"], true);
            slimvita_free_string(report);

            let advance = CString::new(r#"{"action":"advance"}"#).unwrap();
            let report = slimvita_questionnaire_apply(handle, advance.as_ptr());
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(report).to_str().unwrap()).unwrap();
            assert_eq!(value["step"], 1);
            slimvita_free_string(report);

            slimvita_questionnaire_free(handle);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new("not json").unwrap();
            let result = slimvita_calculate(invalid.as_ptr());
            assert!(result.is_null());

            let error = slimvita_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            let handle = slimvita_questionnaire_new();
            let bad_option =
                CString::new(r#"{"action":"select","question":"gender","value":"robot"}"#).unwrap();
            assert!(slimvita_questionnaire_apply(handle, bad_option.as_ptr()).is_null());
            let error = CStr::from_ptr(slimvita_last_error()).to_str().unwrap();
            assert!(error.contains("robot"));
            slimvita_questionnaire_free(handle);

            assert!(slimvita_questionnaire_apply(ptr::null_mut(), bad_option.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = slimvita_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
