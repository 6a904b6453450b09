//! Command-line assembly for the external fetch, transcode and probe tools

pub mod fetch_command;
pub mod probe_command;
pub mod transcode_command;

pub use fetch_command::FetchCommandBuilder;
pub use probe_command::ProbeCommandBuilder;
pub use transcode_command::TranscodeCommandBuilder;

/// Render a number the way the tools expect it: no exponent, no trailing zeros
pub(crate) fn format_number(value: f64, max_decimals: usize) -> String {
    let text = format!("{:.*}", max_decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
