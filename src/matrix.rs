//! LED topology: the logical keyboard matrix, the physical LED index space,
//! and the per-bank PWM memory permutation.

use crate::consts;

/// A valid physical LED index (0-116).
/// Obtained from [`led_index`]; cannot be constructed for an unwired slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedIndex(pub(crate) u8);

impl LedIndex {
    /// Returns the raw device-assigned index (0-116).
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the bank (0-4) whose memory holds this LED.
    #[inline]
    pub fn bank(&self) -> usize {
        (self.0 / consts::LEDS_PER_BANK) as usize
    }

    /// Returns the LED slot (0-23) within its bank.
    #[inline]
    pub fn slot(&self) -> u8 {
        self.0 % consts::LEDS_PER_BANK
    }

    /// Returns the ISO twin wired in parallel with this LED, if any.
    ///
    /// The ANSI Left-Shift and Enter positions each share their key cap area
    /// with a second physical LED used by the ISO layout; both must carry
    /// the same color, so writes to a primary fan out to the twin.
    #[inline]
    pub fn alias(&self) -> Option<LedIndex> {
        match self.0 {
            consts::LED_LEFT_SHIFT_ANSI => Some(LedIndex(consts::LED_LEFT_SHIFT_ISO)),
            consts::LED_ENTER_ANSI => Some(LedIndex(consts::LED_ENTER_ISO)),
            _ => None,
        }
    }
}

/// Looks up the physical LED for a (row, column) matrix position.
///
/// Returns `None` for coordinates outside the 6x21 matrix and for in-range
/// positions with no wired LED.
pub fn led_index(row: u8, column: u8) -> Option<LedIndex> {
    let entry = *consts::RGB_LED_INDEX
        .get(row as usize)?
        .get(column as usize)?;
    if entry == consts::NO_LED {
        None
    } else {
        Some(LedIndex(entry))
    }
}

/// Red-channel byte offset of a bank slot inside the color region.
///
/// `slot` must be 0-23; slots come from [`LedIndex::slot`] so larger values
/// cannot occur.
#[inline]
pub(crate) fn pwm_offset(slot: u8) -> usize {
    consts::PWM_MEM_MAP[slot as usize] as usize
}
