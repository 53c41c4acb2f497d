//! Human-readable error descriptions and structured JSON error formatting.

use dust_core::error::{BuildError, DustError};
use dust_core::hw_error::map_hw_error;
use dust_hardware::error::HwError;

/// Context attached by `main` to config loading failures.
pub const CONFIG_READ_CTX: &str = "read config";
pub const CONFIG_PARSE_CTX: &str = "parse config TOML";
pub const CONFIG_INVALID_CTX: &str = "invalid configuration";

fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// First typed driver error anywhere in the chain. Raw `HwError`s from the
/// backends are classified the same way the core classifies them.
fn dust_error(err: &eyre::Report) -> Option<DustError> {
    err.chain().find_map(|cause| {
        cause.downcast_ref::<DustError>().cloned().or_else(|| {
            cause
                .downcast_ref::<HwError>()
                .map(|hw| map_hw_error(hw))
        })
    })
}

fn build_error(err: &eyre::Report) -> Option<&BuildError> {
    err.chain().find_map(|cause| cause.downcast_ref::<BuildError>())
}

fn is_config_error(err: &eyre::Report) -> bool {
    if build_error(err).is_some() || matches!(dust_error(err), Some(DustError::Config(_))) {
        return true;
    }
    let top = err.to_string();
    [CONFIG_READ_CTX, CONFIG_PARSE_CTX, CONFIG_INVALID_CTX]
        .iter()
        .any(|ctx| top.starts_with(ctx))
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = build_error(err) {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: An out-of-range value in the TOML or on the command line.\nHow to fix: Edit the config file or flag, then rerun."
            ),
        };
    }

    if let Some(de) = dust_error(err) {
        return match de {
            DustError::HardwareFault(msg) => format!(
                "What happened: Sensor hardware fault ({msg}).\nLikely causes: Wrong LED pin or SPI bus/chip-select, missing GPIO/SPI permissions, or loose wiring.\nHow to fix: Check [pins] in the config, enable SPI, and make sure the user can access /dev/gpiomem and /dev/spidev*."
            ),
            DustError::Hardware(msg) => format!(
                "What happened: Reading the sensor failed ({msg}).\nLikely causes: ADC not responding or the sensor lost power.\nHow to fix: Verify 5V/GND to the GP2Y and the MCP3008, then run `dust self-check`."
            ),
            DustError::Config(msg) => format!(
                "What happened: The backend rejected its configuration ({msg}).\nLikely causes: ADC channel out of range, or a replay trace that is empty or holds codes beyond the ADC resolution.\nHow to fix: Fix [pins]/[adc] in the config or the --replay file."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let full = chain_text(err);
    let lower = full.to_ascii_lowercase();

    if msg.starts_with(CONFIG_READ_CTX) {
        return format!(
            "What happened: Could not read the config file ({full}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file."
        );
    }

    if msg.starts_with(CONFIG_PARSE_CTX) || msg.starts_with(CONFIG_INVALID_CTX) {
        return format!(
            "What happened: Configuration is invalid or incomplete ({full}).\nLikely causes: Missing [pins] led, a misspelled key, or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Raw trace CSV header special-case
    if lower.contains("must have the single header 'raw'") {
        return "Invalid headers in raw trace CSV. Expected a single 'raw' column.".to_string();
    }

    if lower.contains("raw trace csv") {
        return format!(
            "What happened: The replay trace could not be loaded ({full}).\nLikely causes: Wrong --replay path, non-numeric rows, or an empty file.\nHow to fix: Provide a CSV with a 'raw' header and one ADC code per row."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 configuration, 4 hardware, 1 anything else.
/// (clap uses 2 for usage errors.)
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if is_config_error(err) {
        return 3;
    }
    if matches!(
        dust_error(err),
        Some(DustError::Hardware(_) | DustError::HardwareFault(_))
    ) {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match dust_error(err) {
        Some(DustError::Hardware(_)) => "Hardware",
        Some(DustError::HardwareFault(_)) => "HardwareFault",
        Some(DustError::Config(_)) => "Config",
        None if is_config_error(err) => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
