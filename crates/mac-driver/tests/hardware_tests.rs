//! Hardware tests
//!
//! Require the MAC block at its default physical address and access to
//! `/dev/mem` (root or CAP_SYS_RAWIO). Run with `cargo test -- --ignored`.

use mac_driver::{
    map, BackendSelection, HarnessConfig, MacAccelerator, MappedRegion, TestRunner,
    DEFAULT_VECTORS,
};

#[test]
#[ignore] // Requires hardware
fn test_default_suite_on_hardware() {
    let config = HarnessConfig::default()
        .with_backend(BackendSelection::DevMem)
        .with_max_polls(Some(1_000_000));
    let accel = MacAccelerator::from_config(&config).expect("map MAC block");
    let mut runner = TestRunner::new(accel, std::io::stdout());

    let summary = runner.run_suite(&DEFAULT_VECTORS).expect("device completes");
    assert!(summary.all_passed(), "{summary:?}");
}

#[test]
#[ignore] // Requires hardware
fn test_mapping_reports_base() {
    let region = MappedRegion::map("/dev/mem", map::DEFAULT_BASE).expect("map MAC block");
    assert_eq!(region.base(), 0x2000_1000);
    println!("Mapped {} at {:#x}", region.path().display(), region.base());
}
