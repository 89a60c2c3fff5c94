//! Internal constants: USB identifiers, command ids, report geometry, and
//! the static LED lookup tables.

// Default Vendor/Product IDs
/// Wooting vendor ID.
pub const WOOTING_VID: u16 = 0x03EB;

/// Product ID for the Wooting One (tenkeyless analog keyboard).
pub const WOOTING_ONE_PID: u16 = 0xFF01;
/// Product ID for the Wooting Two (full-size analog keyboard).
pub const WOOTING_TWO_PID: u16 = 0xFF02;

/// All product IDs recognized by discovery.
pub const SUPPORTED_PIDS: [u16; 2] = [WOOTING_ONE_PID, WOOTING_TWO_PID];

// Logical keyboard matrix dimensions
pub const MATRIX_ROWS: usize = 6;
pub const MATRIX_COLS: usize = 21;

// --- Feature Commands (Control Transfer) ---
pub mod cmd {
    /// Immediate single-LED color write: parameters (led, red, green, blue).
    pub const SINGLE_COLOR: u8 = 30;
    /// Immediate single-LED reset: parameters (0, 0, 0, led).
    pub const SINGLE_RESET: u8 = 31;
    /// Device-wide reset of all LED state, all-zero parameters.
    pub const RESET_ALL: u8 = 32;
    /// Color subsystem init handshake, all-zero parameters.
    pub const COLOR_INIT: u8 = 33;
}

// --- Report Geometry ---
pub mod report {
    /// Two-byte magic word opening every command and color report.
    pub const MAGIC: [u8; 2] = [0xD0, 0xDA];
    /// Report-type tag for a raw color bank upload.
    pub const RAW_COLORS_TYPE: u8 = 11;

    /// Feature command report size, including the leading reserved byte.
    pub const COMMAND_SIZE: usize = 8;
    /// Bank report payload size (the transport prepends the report id).
    pub const PAYLOAD_SIZE: usize = 128;

    /// Byte offset of the 96-byte color region within the payload.
    pub const COLOR_REGION: usize = 5;
    /// Size of one bank's color region.
    pub const COLOR_REGION_SIZE: usize = 96;
    /// Green channel block offset relative to the red byte.
    pub const GREEN_BLOCK: usize = 0x10;
    /// Blue channel block offset relative to the red byte.
    pub const BLUE_BLOCK: usize = 0x20;

    /// Number of leading payload bytes covered by the checksum.
    pub const CHECKSUM_SPAN: usize = 125;
    /// Payload position of the checksum low byte.
    pub const CHECKSUM_LOW: usize = 125;
    /// Payload position of the checksum high byte.
    pub const CHECKSUM_HIGH: usize = 126;
}

// --- Banks ---
/// Number of color banks per device.
pub const BANK_COUNT: usize = 5;
/// LED slots addressed by one bank.
pub const LEDS_PER_BANK: u8 = 24;
/// (slave id, base offset) for each bank, in flush order.
pub const BANK_ADDRESSES: [(u8, u8); BANK_COUNT] = [(0, 0), (0, 96), (1, 0), (1, 96), (2, 0)];

// --- LED Topology ---
/// Table sentinel for a matrix position with no physical LED.
pub(crate) const NO_LED: u8 = 255;

/// Alias pairs: the ANSI and ISO variants share wiring and must always carry
/// the same color.
pub const LED_LEFT_SHIFT_ANSI: u8 = 9;
pub const LED_LEFT_SHIFT_ISO: u8 = 7;
pub const LED_ENTER_ANSI: u8 = 65;
pub const LED_ENTER_ISO: u8 = 62;

/// Physical LED index for each (row, column) matrix position.
#[rustfmt::skip]
pub(crate) const RGB_LED_INDEX: [[u8; MATRIX_COLS]; MATRIX_ROWS] = {
    const NA: u8 = NO_LED;
    [
        [ 0, NA, 11, 12, 23, 24, 36, 47, 85, 84, 49, 48, 59, 61, 73, 81, 80, 113, 114, 115, 116],
        [ 2,  1, 14, 13, 26, 25, 35, 38, 37, 87, 86, 95, 51, 63, 75, 72, 74,  96,  97,  98,  99],
        [ 3,  4, 15, 16, 27, 28, 39, 42, 40, 88, 89, 52, 53, 71, 76, 83, 77, 102, 103, 104, 100],
        [ 5,  6, 17, 18, 29, 30, 41, 46, 44, 90, 93, 54, 57, 65, NA, NA, NA, 105, 106, 107,  NA],
        [ 9,  8, 19, 20, 31, 34, 32, 45, 43, 91, 92, 55, NA, 66, NA, 78, NA, 108, 109, 110, 101],
        [10, 22, 21, NA, NA, NA, 33, NA, NA, NA, 94, 58, 67, 68, 70, 79, 82,  NA, 111, 112,  NA],
    ]
};

/// Permutation from a within-bank LED slot to the red byte offset inside the
/// color region. Channels sit in 16-byte blocks (red, green +0x10, blue
/// +0x20), two 48-byte halves per bank.
#[rustfmt::skip]
pub(crate) const PWM_MEM_MAP: [u8; LEDS_PER_BANK as usize] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x38, 0x39, 0x3A, 0x3B, 0x3C, 0x3D,
];

// Every mapped blue byte must land inside the color region.
const _: () = {
    let mut i = 0;
    while i < PWM_MEM_MAP.len() {
        assert!((PWM_MEM_MAP[i] as usize) + report::BLUE_BLOCK < report::COLOR_REGION_SIZE);
        i += 1;
    }
};
