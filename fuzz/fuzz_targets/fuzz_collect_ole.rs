#![no_main]

use libfuzzer_sys::fuzz_target;
use olecf_vba::{collect, DebugSink, OleFile};

const MAX_INPUT_BYTES: usize = 1024 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let Ok(mut ole) = OleFile::open(data) else {
        return;
    };
    let _ = collect(&mut ole, &mut DebugSink::quiet());
});
