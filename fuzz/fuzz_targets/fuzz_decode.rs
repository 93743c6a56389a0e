#![no_main]

use libfuzzer_sys::fuzz_target;
use regframe::{delta16, frame, CodecError};

// Arbitrary bytes must decode or fail cleanly, never panic
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let width = usize::from(data[0] % 17);
    let blob = &data[1..];

    if let Err(CodecError::Truncated { recovered, .. }) = frame::decompress(blob, width) {
        assert_eq!(recovered.len() % width.max(1), 0, "recovered must be whole frames");
    }
    let _ = delta16::decompress(blob);
});
