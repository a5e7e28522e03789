#![no_main]

use libfuzzer_sys::fuzz_target;
use olecf_vba::{
    decode_f_stream, decode_o_stream, decode_vba_project_stream, detect_codepage,
    encoding_for_codepage, find_base_class, DebugSink,
};

/// Designer streams are small; larger inputs only slow the loop down.
const MAX_INPUT_BYTES: usize = 64 * 1024;

const CODEPAGES: [u32; 6] = [1252, 1251, 932, 936, 949, 65001];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, data)) = data.split_first() else {
        return;
    };
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];
    let Some(encoding) = encoding_for_codepage(CODEPAGES[usize::from(selector) % CODEPAGES.len()])
    else {
        return;
    };

    // Exercise the diagnostic path too; it formats every decoded field.
    let mut out = String::new();
    let mut sink = if selector & 0x80 != 0 {
        DebugSink::new(&mut out)
    } else {
        DebugSink::quiet()
    };

    let _ = decode_f_stream(data, encoding, &mut sink);
    let _ = decode_o_stream(data, encoding, &mut sink);
    let _ = decode_vba_project_stream(data, &mut sink);
    let _ = find_base_class(data, encoding);
    let _ = detect_codepage(data);
});
