#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    let _ = rainbow_config::parse(source);
    let _ = source.parse::<rainbow_lang::Program>();
});
