//! Basic integration tests for mmap-view.

#![cfg(any(unix, windows))]

use mmap_view::{map_file, MappedView, MmapViewError};
use std::fs;
use std::path::PathBuf;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("mmap_view_test_{}_{}", name, std::process::id()));
    p
}

fn seed(path: &PathBuf, len: usize) -> Vec<u8> {
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(path, &data).expect("seed file");
    data
}

#[test]
fn mapped_bytes_equal_file_bytes() {
    let path = tmp_path("mapped_bytes_equal_file_bytes");
    let data = seed(&path, 5000);

    for (len, offset) in [(5000, 0u64), (100, 0), (1000, 4000), (1, 4999)] {
        let view = MappedView::open(&path, "r", len, offset).expect("open");
        assert_eq!(view.len(), len);
        assert_eq!(
            view.as_slice(),
            &data[offset as usize..offset as usize + len],
            "len={len} offset={offset}"
        );
    }

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn independent_opens_see_identical_bytes() {
    let path = tmp_path("independent_opens_see_identical_bytes");
    seed(&path, 2048);

    let a = MappedView::open(&path, "r", 2048, 0).expect("open a");
    let b = MappedView::open(&path, "r", 2048, 0).expect("open b");
    assert_eq!(a.as_slice(), b.as_slice());

    drop(a);
    drop(b);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn rw_mode_string_opens_write_capable() {
    // Mode scanning is last-token-wins: "rw" selects write access.
    let path = tmp_path("rw_mode_string_opens_write_capable");
    seed(&path, 10);

    let mut view = MappedView::open(&path, "rw", 10, 0).expect("open");
    view.as_mut_slice().expect("write-capable")[0] = 0xFF;

    drop(view);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn shared_writes_reach_the_backing_file() {
    let path = tmp_path("shared_writes_reach_the_backing_file");
    seed(&path, 256);

    let mut view = MappedView::open(&path, "w", 16, 64).expect("open");
    view.as_mut_slice().expect("slice").copy_from_slice(b"SHARED-WRITE-016");
    drop(view);

    let after = fs::read(&path).expect("read back");
    assert_eq!(&after[64..80], b"SHARED-WRITE-016");
    assert_eq!(after.len(), 256);

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn private_writes_stay_out_of_the_backing_file() {
    let path = tmp_path("private_writes_stay_out_of_the_backing_file");
    let data = seed(&path, 256);

    let mut view = MappedView::open(&path, "wp", 16, 64).expect("open");
    assert!(view.is_private());
    view.as_mut_slice().expect("slice").copy_from_slice(b"PRIVATE-WRITE-16");
    // The writer's own view observes the change...
    assert_eq!(view.as_slice(), b"PRIVATE-WRITE-16");
    drop(view);

    // ...but the file does not.
    let after = fs::read(&path).expect("read back");
    assert_eq!(after, data);

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn extend_to_end_spans_offset_to_eof() {
    let path = tmp_path("extend_to_end_spans_offset_to_eof");
    let data = seed(&path, 5000);

    // The length argument is ignored with the `e` flag.
    let view = MappedView::open(&path, "re", 123, 1000).expect("open");
    assert_eq!(view.len(), 4000);
    assert_eq!(view.as_slice(), &data[1000..]);

    let whole = MappedView::open(&path, "re", 0, 0).expect("open whole");
    assert_eq!(whole.len(), 5000);

    drop(view);
    drop(whole);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn extend_to_end_with_offset_at_eof_is_empty() {
    let path = tmp_path("extend_to_end_with_offset_at_eof_is_empty");
    seed(&path, 5000);

    let view = MappedView::open(&path, "re", 0, 5000).expect("open");
    assert_eq!(view.len(), 0);
    assert!(view.is_empty());

    drop(view);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn extend_to_end_with_offset_past_eof_fails() {
    let path = tmp_path("extend_to_end_with_offset_past_eof_fails");
    seed(&path, 5000);

    let err = MappedView::open(&path, "re", 0, 5001).unwrap_err();
    assert!(matches!(err, MmapViewError::RangeOverflow { .. }));

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn modeless_open_fails_without_touching_access() {
    let path = tmp_path("modeless_open_fails");
    seed(&path, 16);

    // `epq` carries flags but selects no access.
    let err = MappedView::open(&path, "epq", 16, 0).unwrap_err();
    assert!(matches!(err, MmapViewError::InvalidMode(_)));

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn missing_file_is_an_io_error() {
    let path = tmp_path("missing_file_is_an_io_error");
    let _ = fs::remove_file(&path);

    let err = MappedView::open(&path, "r", 1, 0).unwrap_err();
    assert!(matches!(err, MmapViewError::Io(_)));
}

#[test]
fn manager_wrappers_match_direct_opens() {
    let path = tmp_path("manager_wrappers_match_direct_opens");
    let data = seed(&path, 512);

    let view = map_file(&path, "r", 512, 0).expect("map_file");
    assert_eq!(view.as_slice(), &data[..]);

    drop(view);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn views_are_sendable_across_threads() {
    let path = tmp_path("views_are_sendable_across_threads");
    let data = seed(&path, 1024);

    let view = MappedView::open(&path, "r", 1024, 0).expect("open");
    let handle = std::thread::spawn(move || view.as_slice().to_vec());
    assert_eq!(handle.join().expect("join"), data);

    fs::remove_file(&path).expect("cleanup");
}
