//! C ABI for the set-covering dual bound engine.
//!
//! A caller loads an instance once, runs either driver any number of times
//! and reads the best dual vector and its reduced costs back into its own
//! buffers:
//!
//! ```c
//! ScpHandle *h = NULL;
//! if (scp_load_instance(m, n, costs, row_starts, row_cols, &h) != SCP_OK) { ... }
//! double bound;
//! scp_spectral_projected_subgradient(h, 300, &bound);
//! scp_get_dual_vector(h, duals, m);
//! scp_free_instance(h);
//! ```
//!
//! Every function returns a status code and writes results through
//! out-pointers. Null pointers and short buffers are reported, never
//! dereferenced.

#![warn(missing_docs)]

use std::os::raw::c_int;
use std::ptr;
use std::slice;

use scp_core::{DualBoundSolver, ScpError, ScpResult, SubgradientResult};

/// Success.
pub const SCP_OK: c_int = 0;
/// Invalid argument, null pointer, short buffer or malformed instance.
pub const SCP_ERR_INVALID: c_int = -1;
/// A working buffer could not be allocated.
pub const SCP_ERR_OUT_OF_MEMORY: c_int = -2;
/// Results were requested before any run completed.
pub const SCP_ERR_NO_RESULT: c_int = -3;

/// Opaque handle owning an instance and the result of its latest run.
pub struct ScpHandle {
    solver: DualBoundSolver,
}

fn status_of(err: &ScpError) -> c_int {
    match err {
        ScpError::InvalidInstance(_) | ScpError::InvalidSettings(_) => SCP_ERR_INVALID,
        ScpError::OutOfMemory { .. } => SCP_ERR_OUT_OF_MEMORY,
        ScpError::NoResult => SCP_ERR_NO_RESULT,
    }
}

/// View `len` elements at `ptr`; an empty view needs no pointer.
///
/// # Safety
/// If `len > 0` and `ptr` is non-null, `ptr` must point to `len` readable
/// elements that outlive the returned slice.
unsafe fn input_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Convert CSR row pointers into per-row column lists.
fn rows_from_csr(
    num_rows: usize,
    row_starts: &[usize],
    row_cols: &[usize],
) -> ScpResult<Vec<Vec<usize>>> {
    if row_starts.first() != Some(&0) {
        return Err(ScpError::InvalidInstance(
            "row_starts must begin at 0".into(),
        ));
    }
    let mut rows = Vec::with_capacity(num_rows);
    for (row, w) in row_starts.windows(2).enumerate() {
        if w[1] < w[0] || w[1] > row_cols.len() {
            return Err(ScpError::InvalidInstance(format!(
                "row_starts is not monotone at row {}",
                row
            )));
        }
        rows.push(row_cols[w[0]..w[1]].to_vec());
    }
    Ok(rows)
}

/// Build an instance from CSR incidence data and return an owning handle.
///
/// `row_starts` holds `num_rows + 1` offsets into `row_cols`, which lists
/// the 0-based columns covering each row. `costs` holds `num_cols` entries.
///
/// # Safety
/// - `costs` must point to `num_cols` readable `u32` values
/// - `row_starts` must point to `num_rows + 1` readable offsets
/// - `row_cols` must point to `row_starts[num_rows]` readable column indices
/// - `out_handle` must be a valid pointer; on success it receives a handle
///   that must be released with `scp_free_instance`
#[no_mangle]
pub unsafe extern "C" fn scp_load_instance(
    num_rows: usize,
    num_cols: usize,
    costs: *const u32,
    row_starts: *const usize,
    row_cols: *const usize,
    out_handle: *mut *mut ScpHandle,
) -> c_int {
    if out_handle.is_null() {
        return SCP_ERR_INVALID;
    }
    unsafe { *out_handle = ptr::null_mut() };

    let Some(num_starts) = num_rows.checked_add(1) else {
        return SCP_ERR_INVALID;
    };
    let (Some(costs), Some(row_starts)) = (unsafe { input_slice(costs, num_cols) }, unsafe {
        input_slice(row_starts, num_starts)
    }) else {
        log::debug!("scp_load_instance: null costs or row_starts");
        return SCP_ERR_INVALID;
    };
    let nnz = row_starts[num_rows];
    let Some(row_cols) = (unsafe { input_slice(row_cols, nnz) }) else {
        log::debug!("scp_load_instance: null row_cols with {} entries", nnz);
        return SCP_ERR_INVALID;
    };

    let loaded = rows_from_csr(num_rows, row_starts, row_cols)
        .and_then(|rows| DualBoundSolver::load(num_rows, num_cols, costs.to_vec(), &rows));
    match loaded {
        Ok(solver) => {
            unsafe { *out_handle = Box::into_raw(Box::new(ScpHandle { solver })) };
            SCP_OK
        }
        Err(e) => {
            log::debug!("scp_load_instance: {}", e);
            status_of(&e)
        }
    }
}

/// # Safety
/// `out_obj` must be a valid pointer to an `f64`.
unsafe fn finish_run(result: ScpResult<SubgradientResult>, out_obj: *mut f64) -> c_int {
    match result {
        Ok(result) => {
            unsafe { *out_obj = result.objective };
            SCP_OK
        }
        Err(e) => {
            log::debug!("subgradient run failed: {}", e);
            status_of(&e)
        }
    }
}

/// Run the spectral projected subgradient method for at most `max_itr`
/// iterations and write the best lower bound to `out_obj`.
///
/// # Safety
/// - `h` must be a live handle from `scp_load_instance`
/// - `out_obj` must be a valid pointer to an `f64`
#[no_mangle]
pub unsafe extern "C" fn scp_spectral_projected_subgradient(
    h: *mut ScpHandle,
    max_itr: usize,
    out_obj: *mut f64,
) -> c_int {
    if h.is_null() || out_obj.is_null() {
        return SCP_ERR_INVALID;
    }
    let handle = unsafe { &mut *h };
    let result = handle.solver.run_spectral_projected_subgradient(max_itr);
    unsafe { finish_run(result, out_obj) }
}

/// Run Beasley's subgradient method towards `upperbound` for at most
/// `max_itr` iterations and write the best lower bound to `out_obj`.
///
/// # Safety
/// - `h` must be a live handle from `scp_load_instance`
/// - `out_obj` must be a valid pointer to an `f64`
#[no_mangle]
pub unsafe extern "C" fn scp_basic_subgradient(
    h: *mut ScpHandle,
    max_itr: usize,
    upperbound: f64,
    out_obj: *mut f64,
) -> c_int {
    if h.is_null() || out_obj.is_null() {
        return SCP_ERR_INVALID;
    }
    let handle = unsafe { &mut *h };
    let result = handle.solver.run_basic_subgradient(max_itr, upperbound);
    unsafe { finish_run(result, out_obj) }
}

/// Copy `values` into the caller's buffer of `len` elements.
///
/// # Safety
/// `out` must be null or point to `len` writable `f64` values.
unsafe fn copy_out(values: &[f64], out: *mut f64, len: usize) -> c_int {
    if out.is_null() || len < values.len() {
        return SCP_ERR_INVALID;
    }
    unsafe { ptr::copy_nonoverlapping(values.as_ptr(), out, values.len()) };
    SCP_OK
}

/// Copy the best dual vector (one entry per row) into `out`.
///
/// # Safety
/// - `h` must be a live handle from `scp_load_instance`
/// - `out` must point to `len` writable `f64` values, `len >= num_rows`
#[no_mangle]
pub unsafe extern "C" fn scp_get_dual_vector(
    h: *const ScpHandle,
    out: *mut f64,
    len: usize,
) -> c_int {
    if h.is_null() {
        return SCP_ERR_INVALID;
    }
    let handle = unsafe { &*h };
    match handle.solver.dual_vector() {
        Ok(dual) => unsafe { copy_out(dual, out, len) },
        Err(e) => status_of(&e),
    }
}

/// Copy the reduced costs of the best dual vector (one entry per column)
/// into `out`.
///
/// # Safety
/// - `h` must be a live handle from `scp_load_instance`
/// - `out` must point to `len` writable `f64` values, `len >= num_cols`
#[no_mangle]
pub unsafe extern "C" fn scp_get_reduced_costs(
    h: *const ScpHandle,
    out: *mut f64,
    len: usize,
) -> c_int {
    if h.is_null() {
        return SCP_ERR_INVALID;
    }
    let handle = unsafe { &*h };
    match handle.solver.reduced_costs() {
        Ok(rc) => unsafe { copy_out(&rc, out, len) },
        Err(e) => status_of(&e),
    }
}

/// Number of rows of the loaded instance, 0 for a null handle.
///
/// # Safety
/// `h` must be null or a live handle from `scp_load_instance`.
#[no_mangle]
pub unsafe extern "C" fn scp_get_num_row(h: *const ScpHandle) -> usize {
    if h.is_null() {
        return 0;
    }
    unsafe { &*h }.solver.num_rows()
}

/// Number of columns of the loaded instance, 0 for a null handle.
///
/// # Safety
/// `h` must be null or a live handle from `scp_load_instance`.
#[no_mangle]
pub unsafe extern "C" fn scp_get_num_col(h: *const ScpHandle) -> usize {
    if h.is_null() {
        return 0;
    }
    unsafe { &*h }.solver.num_cols()
}

/// Release a handle allocated by `scp_load_instance`.
///
/// # Safety
/// - `h` must be null or a handle from `scp_load_instance`
/// - Must not be called more than once on the same handle
#[no_mangle]
pub unsafe extern "C" fn scp_free_instance(h: *mut ScpHandle) {
    if !h.is_null() {
        drop(unsafe { Box::from_raw(h) });
    }
}
