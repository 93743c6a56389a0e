#![no_main]

use libfuzzer_sys::fuzz_target;
use regframe::delta16;

fuzz_target!(|data: &[u8]| {
    let values: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let blob = delta16::compress(&values);
    let decoded = delta16::decompress(&blob).expect("compressed blob must decode");
    assert_eq!(decoded, values, "delta16 roundtrip mismatch");
});
