#![allow(missing_docs)]
mod common;

use mdbx_batch::OpType;
use tempfile::tempdir;

/// Exercises §8 scenario 6: sustained large writes eventually double the
/// mapping at least once, then exhaust it entirely once writes would push
/// past the configured 1 GiB cap.
///
/// Writes tens of megabytes per batch to reach the cap in a reasonable
/// number of iterations; left `#[ignore]` by default since it is slow and
/// disk-hungry compared to the rest of the suite.
#[test]
#[ignore = "writes up to ~1 GiB to exercise map growth and eventual exhaustion"]
fn map_growth_and_eventual_exhaustion() {
    let _guard = common::serialized();
    let dir = tempdir().unwrap();
    common::open_env(dir.path(), &["d"]);

    let chunk = vec![0xABu8; 8 * 1024 * 1024];
    let initial = mdbx_batch::current_map_size().unwrap();
    let mut grew = false;
    let mut last_rc = 0;

    'outer: for batch in 0..200u32 {
        for i in 0..1u32 {
            let key = format!("big-{batch}-{i}");
            let rc = unsafe {
                mdbx_batch::enqueue(
                    0,
                    OpType::Put,
                    key.as_ptr(),
                    key.len(),
                    chunk.as_ptr() as *mut u8,
                    chunk.len(),
                )
            };
            assert_eq!(rc, 0);
        }
        last_rc = mdbx_batch::execute();
        if last_rc != 0 {
            break 'outer;
        }
        if mdbx_batch::current_map_size().unwrap() > initial {
            grew = true;
        }
    }

    assert!(grew, "map size never grew past its initial size");
    assert_eq!(last_rc, mdbx_batch::Error::NoSpace.as_return_code());

    mdbx_batch::shutdown();
}
