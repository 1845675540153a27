//! Device error numbers (header offset 6) and their descriptions.

/// Describe an OBP device error number.
///
/// Codes 0..=15 are the general protocol range and 100..=104 come from the
/// firmware reprogramming path. Devices assign no meaning to 14 and 15, so
/// they are reported as unknown along with every code outside both ranges.
#[must_use]
pub const fn error_description(code: u16) -> &'static str {
    match code {
        0 => "Success (no detectable errors)",
        1 => "Invalid/unsupported protocol",
        2 => "Unknown message type",
        3 => "Bad checksum",
        4 => "Message too large",
        5 => "Payload length does not match message type",
        6 => "Payload data invalid",
        7 => "Device not ready for given message type",
        8 => "Unknown checksum type",
        9 => "Device reset unexpectedly",
        10 => "Too many buses (commands have come from too many bus interfaces)",
        11 => "Out of memory; failed to allocate enough space to complete request",
        12 => "Command is valid, but desired information does not exist",
        13 => "Internal device error; may be unrecoverable",
        100 => "Could not decrypt properly",
        101 => "Firmware layout invalid",
        102 => "Data packet was wrong size",
        103 => "Hardware revision not compatible with downloaded firmware",
        104 => "Existing flash map not compatible with downloaded firmware",
        _ => "Unknown error",
    }
}
