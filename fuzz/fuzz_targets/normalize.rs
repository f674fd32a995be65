#![no_main]

use libfuzzer_sys::fuzz_target;

use mathscan::normalize_breaks;

fuzz_target!(|s: &str| {
    let once = normalize_breaks(s).into_owned();
    let twice = normalize_breaks(&once);
    assert_eq!(once, twice, "normalizing isn't idempotent for {:?}", s);
});
