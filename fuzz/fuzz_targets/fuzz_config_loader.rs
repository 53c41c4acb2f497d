#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing, validation and the mapping into core types must never panic.
    let Ok(cfg) = dust_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    let _ = dust_core::SensorCfg::try_from(&cfg.sensor);
    let _ = dust_core::PollCfg::try_from(&cfg);
});
