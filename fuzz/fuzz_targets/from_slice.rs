#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate dnswire;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic, whatever the input. A message that does
    // decode must also re-encode.
    if let Ok(m) = dnswire::Message::from_slice(data) {
        let _ = m.to_vec();
    }
});
