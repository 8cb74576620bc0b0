//! C ABI for firmware and native tooling
//!
//! ```c
//! uint8_t helper[16], key[16], failed;
//! if (puf_enroll(response, 32, helper, key) < 0) { /* ... */ }
//! int errors = puf_reconstruct_key(record, 256, helper, 16, key, &failed);
//! ```
//!
//! Non-negative returns are corrected bit counts; negative returns are the
//! `PUF_ERR_*` codes below.

use std::slice;

use tracing::warn;

use crate::code::constants::{HELPER_LEN, KEY_LEN};
use crate::extractor::KeyAssembler;
use crate::FuzzyError;

/// A required pointer was null
pub const PUF_ERR_NULL_POINTER: i32 = -1;
/// Helper data is not 16 bytes
pub const PUF_ERR_MALFORMED_HELPER: i32 = -2;
/// Response or record does not cover all sub-blocks
pub const PUF_ERR_SHORT_READING: i32 = -3;
/// Code tables could not be built
pub const PUF_ERR_INTERNAL: i32 = -4;

fn error_code(err: &FuzzyError) -> i32 {
    match err {
        FuzzyError::MalformedHelperData { .. } => PUF_ERR_MALFORMED_HELPER,
        FuzzyError::ShortReading { .. } => PUF_ERR_SHORT_READING,
        other => {
            warn!(error = %other, "unexpected failure behind the C ABI");
            PUF_ERR_INTERNAL
        }
    }
}

/// Enroll a packed response, writing 16 helper bytes and 16 key bytes
///
/// Returns 0 on success.
///
/// # Safety
/// `response` must point to `len` readable bytes; `helper_out` and `key_out`
/// must each point to 16 writable bytes.
#[no_mangle]
pub unsafe extern "C" fn puf_enroll(
    response: *const u8,
    len: usize,
    helper_out: *mut u8,
    key_out: *mut u8,
) -> i32 {
    if response.is_null() || helper_out.is_null() || key_out.is_null() {
        return PUF_ERR_NULL_POINTER;
    }

    // SAFETY: non-null and sized per the caller contract above
    let response = unsafe { slice::from_raw_parts(response, len) };
    let enrollment = match KeyAssembler::new().and_then(|a| a.enroll(response)) {
        Ok(enrollment) => enrollment,
        Err(err) => return error_code(&err),
    };

    // SAFETY: both outputs hold 16 writable bytes per the caller contract
    let helper_out = unsafe { slice::from_raw_parts_mut(helper_out, HELPER_LEN) };
    let key_out = unsafe { slice::from_raw_parts_mut(key_out, KEY_LEN) };
    helper_out.copy_from_slice(enrollment.helper().as_bytes());
    key_out.copy_from_slice(enrollment.key().as_bytes());
    0
}

/// Rebuild a key from an enrollment record and stored helper data
///
/// Returns the total number of corrected bits. When `status_out` is not null
/// it receives a bitmask with bit `b` set for each uncorrectable sub-block
/// `b`; those key segments are raw, unverified bits.
///
/// # Safety
/// `record` must point to `len` readable bytes, `helper` to `helper_len`
/// readable bytes and `key_out` to 16 writable bytes. `status_out` may be
/// null, otherwise it must point to one writable byte.
#[no_mangle]
pub unsafe extern "C" fn puf_reconstruct_key(
    record: *const u8,
    len: usize,
    helper: *const u8,
    helper_len: usize,
    key_out: *mut u8,
    status_out: *mut u8,
) -> i32 {
    if record.is_null() || helper.is_null() || key_out.is_null() {
        return PUF_ERR_NULL_POINTER;
    }

    // SAFETY: non-null and sized per the caller contract above
    let (record, helper) = unsafe {
        (
            slice::from_raw_parts(record, len),
            slice::from_raw_parts(helper, helper_len),
        )
    };
    let reconstruction = match KeyAssembler::new().and_then(|a| a.reconstruct(record, helper)) {
        Ok(reconstruction) => reconstruction,
        Err(err) => return error_code(&err),
    };

    // SAFETY: 16 writable bytes per the caller contract
    let key_out = unsafe { slice::from_raw_parts_mut(key_out, KEY_LEN) };
    key_out.copy_from_slice(reconstruction.key().as_bytes());

    if !status_out.is_null() {
        let mask = reconstruction
            .uncorrectable_blocks()
            .fold(0u8, |mask, block| mask | (1 << block));
        // SAFETY: non-null, one writable byte per the caller contract
        unsafe { status_out.write(mask) };
    }

    i32::try_from(reconstruction.total_errors()).unwrap_or(i32::MAX)
}
