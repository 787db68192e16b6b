/// `GetDevicePropDesc` operation code understood by the `opreq` shell command.
pub const GET_DEVICE_PROP_DESC: u16 = 0x1015;

/// Builds the shell command asking for the description of one property code.
/// The code is sent as unpadded lowercase hex; it is never checked against
/// the list of known properties.
pub fn format_request(code: u16) -> String {
    format!("opreq {GET_DEVICE_PROP_DESC:#06x} {code:#x}")
}

/// The line echoed before each exchange.
pub fn composed_line(message: &str) -> String {
    format!("Composed message: '{message}'")
}

/// A row of dashes as wide as `line`, counted in characters.
pub fn separator_for(line: &str) -> String {
    "-".repeat(line.chars().count())
}
