#![allow(missing_docs)]
mod common;

use mdbx_batch::OpType;
use tempfile::tempdir;

#[test]
fn round_trip_under_a_single_dbi() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let key = b"k1";
    let val = b"v1";
    let rc = unsafe {
        mdbx_batch::enqueue(0, OpType::Put, key.as_ptr(), key.len(), val.as_ptr() as *mut u8, val.len())
    };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);

    let mut buf = [0u8; 8];
    let rc =
        unsafe { mdbx_batch::enqueue(0, OpType::Get, key.as_ptr(), key.len(), buf.as_mut_ptr(), buf.len()) };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);
    assert_eq!(&buf[..2], val);

    mdbx_batch::shutdown();
}

#[test]
fn not_found_is_non_fatal() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let key = b"missing";
    let rc = unsafe { mdbx_batch::enqueue(0, OpType::Get, key.as_ptr(), key.len(), std::ptr::null_mut(), 0) };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), mdbx_batch::Error::NotFound.as_return_code());

    let key = b"k2";
    let val = b"v2";
    let rc = unsafe {
        mdbx_batch::enqueue(0, OpType::Put, key.as_ptr(), key.len(), val.as_ptr() as *mut u8, val.len())
    };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);

    mdbx_batch::shutdown();
}

#[test]
fn batched_put_of_eight_values_commits_atomically() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let keys: Vec<String> = (0..8).map(|i| format!("key{i}")).collect();
    let vals: Vec<String> = (0..8).map(|i| format!("val{i}")).collect();

    for (k, v) in keys.iter().zip(vals.iter()) {
        let rc = unsafe {
            mdbx_batch::enqueue(0, OpType::Put, k.as_ptr(), k.len(), v.as_ptr() as *mut u8, v.len())
        };
        assert_eq!(rc, 0);
    }
    assert_eq!(mdbx_batch::execute(), 0);

    let mut buffers = vec![[0u8; 16]; 8];
    for (k, buf) in keys.iter().zip(buffers.iter_mut()) {
        let rc = unsafe { mdbx_batch::enqueue(0, OpType::Get, k.as_ptr(), k.len(), buf.as_mut_ptr(), 16) };
        assert_eq!(rc, 0);
    }
    assert_eq!(mdbx_batch::execute(), 0);
    for (v, buf) in vals.iter().zip(buffers.iter()) {
        assert_eq!(&buf[..v.len()], v.as_bytes());
    }

    mdbx_batch::shutdown();
}

#[test]
fn rw_batch_get_then_put_with_back_reference() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let a_key = b"a";
    let a_val = b"zzzz";
    let rc = unsafe {
        mdbx_batch::enqueue(0, OpType::Put, a_key.as_ptr(), a_key.len(), a_val.as_ptr() as *mut u8, a_val.len())
    };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);

    // GET "a" (stash result, op index 0), then PUT "b" = back-reference to
    // op 0's value (ref_index = 1, null data pointer, size carries the
    // ref_index per the enqueue convention).
    let rc = unsafe { mdbx_batch::enqueue(0, OpType::Get, a_key.as_ptr(), a_key.len(), std::ptr::null_mut(), 0) };
    assert_eq!(rc, 0);
    let b_key = b"b";
    let rc =
        unsafe { mdbx_batch::enqueue(0, OpType::Put, b_key.as_ptr(), b_key.len(), std::ptr::null_mut(), 1) };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);

    let mut buf = [0u8; 8];
    let rc = unsafe { mdbx_batch::enqueue(0, OpType::Get, b_key.as_ptr(), b_key.len(), buf.as_mut_ptr(), 8) };
    assert_eq!(rc, 0);
    assert_eq!(mdbx_batch::execute(), 0);
    assert_eq!(&buf[..4], a_val);

    mdbx_batch::shutdown();
}

#[test]
fn lookup_index_out_of_bounds_fails_before_any_engine_call() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let key = b"k";
    // A PUT whose value is a back-reference 99 slots back, in a batch that
    // has had zero operations enqueued so far: must be rejected at
    // enqueue time, not at execute time.
    let rc = unsafe { mdbx_batch::enqueue(0, OpType::Put, key.as_ptr(), key.len(), std::ptr::null_mut(), 99) };
    assert_eq!(rc, mdbx_batch::Error::Invalid.as_return_code());

    mdbx_batch::shutdown();
}
