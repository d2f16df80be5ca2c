#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(test) = orchil_litmus::parse(s, "fuzz.litmus") {
            if let Ok(converted) = orchil_ir::convert::convert(&test) {
                let _ = orchil_ir::emit::emit_record(&converted);
            }
        }
    }
});
