#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // arbitrary input must never panic, only fail
    if let Ok(dataset) = dset::from_bytes(data) {
        for column in dataset.columns() {
            column.iter().for_each(drop);
        }
    }
    let _ = dset::scan_blocks(std::io::Cursor::new(data));
});
