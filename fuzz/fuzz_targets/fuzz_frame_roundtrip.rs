#![no_main]

use libfuzzer_sys::fuzz_target;
use regframe::{bench, delta16, Algorithm, DeltaRange, FrameCodec};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the width, second narrows the delta range
    let width = usize::from(data[0] % 16) + 1;
    let min = -((data[1] & 0x07) as i8) - i8::from(data[1] & 0x08 != 0);
    let max = ((data[1] >> 4) & 0x07) as i8;
    let range = DeltaRange::new(min, max).expect("range within nibble bounds");
    let codec = FrameCodec::new(width).unwrap().with_delta_range(range);

    let values: Vec<u16> = data[2..]
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();

    let enc = codec.compress(&values);
    match enc.algorithm {
        Algorithm::TimeSeriesS4 => {
            assert_eq!(values.len() % width, 0);
            assert_eq!(codec.decompress(&enc.bytes).unwrap(), values);
        }
        Algorithm::Delta16Var => {
            assert_ne!(values.len() % width, 0);
            assert_eq!(enc.bytes, delta16::compress(&values));
        }
    }

    let sel = bench::select(&values, &codec);
    let decoded = sel.algorithm().decompress(&sel.encoded.bytes, width).unwrap();
    assert_eq!(decoded, values, "selected output must be lossless");
});
