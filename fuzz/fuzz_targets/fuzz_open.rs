#![no_main]

use libfuzzer_sys::fuzz_target;
use regframe::{ChannelState, EnvelopeError, SecureChannel, DEFAULT_PSK};

fuzz_target!(|data: &[u8]| {
    let last = 7;
    let mut rx = SecureChannel::restore(&DEFAULT_PSK, ChannelState { next_seq: 1, last_seq_received: last }).unwrap();

    match rx.open(data) {
        Ok(_) => assert!(rx.last_seq_received() > last),
        Err(EnvelopeError::BufferUnderrun { actual, .. }) => {
            assert!(actual < 24);
            assert_eq!(rx.last_seq_received(), last);
        }
        Err(_) => assert_eq!(rx.last_seq_received(), last),
    }

    // A freshly sealed copy of the same bytes always opens exactly once
    let mut tx = SecureChannel::restore(&DEFAULT_PSK, ChannelState { next_seq: u64::from(last) + 1, last_seq_received: 0 }).unwrap();
    let packet = tx.seal(data).unwrap();
    let mut rx = SecureChannel::restore(&DEFAULT_PSK, ChannelState { next_seq: 1, last_seq_received: last }).unwrap();
    assert_eq!(rx.open(&packet).unwrap(), data);
    assert!(rx.open(&packet).is_err());
});
