//! C ABI exports for host simulation drivers
//!
//! All functions tolerate null pointers and report them as errors instead of
//! dereferencing. Strings returned to the caller must be released with
//! `top_sim_free_string`; error strings with `top_sim_free_error`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::ptr;
use std::slice;

use crate::core::TopSimulator;

/// Opaque simulator context passed to all FFI functions
pub struct TopSimContext {
    pub core: TopSimulator,
}

unsafe fn write_error(error_out: *mut *mut c_char, msg: String) {
    if !error_out.is_null() {
        *error_out = CString::new(msg).unwrap_or_default().into_raw();
    }
}

/// Create a simulator.
///
/// `cov_json` may be null to use the built-in cover-point table.
/// Returns null on error, error message written to error_out if provided.
#[no_mangle]
pub unsafe extern "C" fn top_sim_create(
    cov_json: *const c_char,
    cov_json_len: usize,
    error_out: *mut *mut c_char,
) -> *mut TopSimContext {
    if cov_json.is_null() {
        return Box::into_raw(Box::new(TopSimContext { core: TopSimulator::new() }));
    }

    let json_slice = slice::from_raw_parts(cov_json as *const u8, cov_json_len);
    let json_str = match std::str::from_utf8(json_slice) {
        Ok(s) => s,
        Err(e) => {
            write_error(error_out, format!("Invalid UTF-8 in JSON: {}", e));
            return ptr::null_mut();
        }
    };

    match TopSimulator::with_coverage_json(json_str) {
        Ok(core) => Box::into_raw(Box::new(TopSimContext { core })),
        Err(e) => {
            write_error(error_out, e.to_string());
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn top_sim_destroy(ctx: *mut TopSimContext) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

#[no_mangle]
pub unsafe extern "C" fn top_sim_free_error(error: *mut c_char) {
    if !error.is_null() {
        drop(CString::from_raw(error));
    }
}

#[no_mangle]
pub unsafe extern "C" fn top_sim_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Poke an input port
/// Returns 0 on success, -1 on error (unknown signal or output port)
#[no_mangle]
pub unsafe extern "C" fn top_sim_poke(
    ctx: *mut TopSimContext,
    name: *const c_char,
    value: c_ulong,
) -> c_int {
    if ctx.is_null() || name.is_null() {
        return -1;
    }
    let ctx = &mut *ctx;
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };

    match ctx.core.poke(name, value as u64) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Peek a port value
/// Returns the value, or 0 on error
#[no_mangle]
pub unsafe extern "C" fn top_sim_peek(ctx: *const TopSimContext, name: *const c_char) -> c_ulong {
    if ctx.is_null() || name.is_null() {
        return 0;
    }
    let ctx = &*ctx;
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return 0,
    };

    ctx.core.peek(name).unwrap_or(0) as c_ulong
}

/// Evaluate one step
/// Returns 1 if the sequential block ran, 0 if not, -1 on null context
#[no_mangle]
pub unsafe extern "C" fn top_sim_eval(ctx: *mut TopSimContext) -> c_int {
    if ctx.is_null() {
        return -1;
    }
    (*ctx).core.eval().triggered as c_int
}

/// Full clock cycle: clk=0, eval, clk=1, eval
#[no_mangle]
pub unsafe extern "C" fn top_sim_tick(ctx: *mut TopSimContext) -> c_int {
    if ctx.is_null() {
        return -1;
    }
    (*ctx).core.tick().triggered as c_int
}

/// Zero ports and edge memory (coverage is kept)
#[no_mangle]
pub unsafe extern "C" fn top_sim_reset(ctx: *mut TopSimContext) {
    if !ctx.is_null() {
        (*ctx).core.reset_state();
    }
}

#[no_mangle]
pub unsafe extern "C" fn top_sim_coverage_count(ctx: *const TopSimContext) -> c_uint {
    if ctx.is_null() {
        return 0;
    }
    (*ctx).core.coverage().counts().len() as c_uint
}

/// Copy up to `len` counters into `out`
/// Returns the number of counters written, or -1 on error
#[no_mangle]
pub unsafe extern "C" fn top_sim_coverage_read(
    ctx: *const TopSimContext,
    out: *mut c_uint,
    len: usize,
) -> c_int {
    if ctx.is_null() || out.is_null() {
        return -1;
    }
    let counts = (*ctx).core.coverage().counts();
    let n = counts.len().min(len);
    let dst = slice::from_raw_parts_mut(out, n);
    for (d, &c) in dst.iter_mut().zip(counts.iter()) {
        *d = c as c_uint;
    }
    n as c_int
}

/// Coverage snapshot (counters + annotations) as JSON (caller must free)
#[no_mangle]
pub unsafe extern "C" fn top_sim_coverage_json(ctx: *const TopSimContext) -> *mut c_char {
    if ctx.is_null() {
        return ptr::null_mut();
    }
    match (*ctx).core.coverage_snapshot().to_json() {
        Ok(json) => CString::new(json).map(CString::into_raw).unwrap_or(ptr::null_mut()),
        Err(_) => ptr::null_mut(),
    }
}

/// Input port names (comma-separated, caller must free)
#[no_mangle]
pub unsafe extern "C" fn top_sim_input_names(ctx: *const TopSimContext) -> *mut c_char {
    if ctx.is_null() {
        return ptr::null_mut();
    }
    let names = (*ctx).core.signals.input_names().join(",");
    CString::new(names).map(CString::into_raw).unwrap_or(ptr::null_mut())
}

/// Output port names (comma-separated, caller must free)
#[no_mangle]
pub unsafe extern "C" fn top_sim_output_names(ctx: *const TopSimContext) -> *mut c_char {
    if ctx.is_null() {
        return ptr::null_mut();
    }
    let names = (*ctx).core.signals.output_names().join(",");
    CString::new(names).map(CString::into_raw).unwrap_or(ptr::null_mut())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_cycle() {
        unsafe {
            let ctx = top_sim_create(ptr::null(), 0, ptr::null_mut());
            assert!(!ctx.is_null());

            let rst = CString::new("rst").unwrap();
            let data = CString::new("input_data").unwrap();
            let out = CString::new("output_data").unwrap();
            assert_eq!(top_sim_poke(ctx, rst.as_ptr(), 0), 0);
            assert_eq!(top_sim_poke(ctx, data.as_ptr(), 0x41), 0);
            assert_eq!(top_sim_poke(ctx, out.as_ptr(), 1), -1);
            assert_eq!(top_sim_tick(ctx), 1);
            assert_eq!(top_sim_peek(ctx, out.as_ptr()), 0x0E);
            assert_eq!(top_sim_eval(ctx), 0);

            let mut counts = [0 as c_uint; 11];
            assert_eq!(top_sim_coverage_count(ctx), 11);
            assert_eq!(top_sim_coverage_read(ctx, counts.as_mut_ptr(), counts.len()), 11);
            assert_eq!(counts[2], 1);
            assert_eq!(counts[9], 1);
            assert_eq!(counts[10], 1);

            let json = top_sim_coverage_json(ctx);
            assert!(!json.is_null());
            let text = CStr::from_ptr(json).to_str().unwrap().to_string();
            assert!(text.contains("v_branch/top"));
            top_sim_free_string(json);

            let names = top_sim_input_names(ctx);
            assert_eq!(CStr::from_ptr(names).to_str().unwrap(), "clk,rst,input_data");
            top_sim_free_string(names);

            top_sim_destroy(ctx);
        }
    }

    #[test]
    fn test_ffi_bad_table_reports_error() {
        unsafe {
            let json = b"[]";
            let mut err: *mut c_char = ptr::null_mut();
            let ctx = top_sim_create(json.as_ptr() as *const c_char, json.len(), &mut err);
            assert!(ctx.is_null());
            assert!(!err.is_null());
            let msg = CStr::from_ptr(err).to_str().unwrap().to_string();
            assert!(msg.contains("coverage table"));
            top_sim_free_error(err);
        }
    }

    #[test]
    fn test_ffi_null_context() {
        unsafe {
            assert_eq!(top_sim_eval(ptr::null_mut()), -1);
            assert_eq!(top_sim_coverage_count(ptr::null()), 0);
            assert!(top_sim_coverage_json(ptr::null()).is_null());
            top_sim_destroy(ptr::null_mut());
        }
    }
}
