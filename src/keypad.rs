//! Keypad registers
//!
//! KEYINPUT uses inverted logic: a cleared bit means the button is held.
//! The host updates button state between frames; KEYCNT lets the guest
//! request an interrupt on a chosen button combination.

use crate::emu::Gba;
use crate::interrupt::IrqSource;

/// The ten buttons, in KEYINPUT bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Right = 4,
    Left = 5,
    Up = 6,
    Down = 7,
    R = 8,
    L = 9,
}

/// Mask of the valid button bits.
const BUTTON_MASK: u16 = 0x03FF;

/// KEYCNT bit 14: interrupt enable.
const KEYCNT_IRQ: u16 = 1 << 14;
/// KEYCNT bit 15: require all selected buttons (AND) instead of any (OR).
const KEYCNT_AND: u16 = 1 << 15;

/// KEYINPUT/KEYCNT state.
#[derive(Debug, Clone, Copy)]
pub struct Keypad {
    /// Inverted button state; all released at power-on.
    pub keyinput: u16,
    pub keycnt: u16,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keyinput: BUTTON_MASK,
            keycnt: 0,
        }
    }

    /// True when the KEYCNT condition holds for the current button state.
    fn irq_condition(&self) -> bool {
        if self.keycnt & KEYCNT_IRQ == 0 {
            return false;
        }
        let held = !self.keyinput & BUTTON_MASK;
        let selected = self.keycnt & BUTTON_MASK;
        if self.keycnt & KEYCNT_AND != 0 {
            selected != 0 && held & selected == selected
        } else {
            held & selected != 0
        }
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Gba {
    /// Host input: press or release one button.
    pub fn set_button(&mut self, button: Button, down: bool) {
        let bit = 1u16 << button as u16;
        if down {
            self.keypad.keyinput &= !bit;
        } else {
            self.keypad.keyinput |= bit;
        }
        self.keypad_check_irq();
    }

    /// Host input: replace the whole KEYINPUT register (0 = pressed).
    pub fn set_keyinput(&mut self, keyinput: u16) {
        self.keypad.keyinput = keyinput & BUTTON_MASK;
        self.keypad_check_irq();
    }

    /// Evaluate the KEYCNT interrupt condition. Called on host input and on
    /// KEYCNT writes.
    pub(crate) fn keypad_check_irq(&mut self) {
        if self.keypad.irq_condition() {
            self.raise_interrupt(IrqSource::KEYPAD);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_released_at_reset() {
        let keypad = Keypad::new();
        assert_eq!(keypad.keyinput, 0x03FF);
    }

    #[test]
    fn test_irq_condition_or_mode() {
        let mut keypad = Keypad::new();
        keypad.keycnt = KEYCNT_IRQ | 0b0000_0011; // A or B
        assert!(!keypad.irq_condition());

        keypad.keyinput &= !(1 << Button::B as u16);
        assert!(keypad.irq_condition());
    }

    #[test]
    fn test_irq_condition_and_mode() {
        let mut keypad = Keypad::new();
        keypad.keycnt = KEYCNT_IRQ | KEYCNT_AND | 0b0000_0011; // A and B
        keypad.keyinput &= !(1 << Button::A as u16);
        assert!(!keypad.irq_condition());

        keypad.keyinput &= !(1 << Button::B as u16);
        assert!(keypad.irq_condition());
    }

    #[test]
    fn test_irq_disabled_without_enable_bit() {
        let mut keypad = Keypad::new();
        keypad.keycnt = 0b0000_0001;
        keypad.keyinput = 0;
        assert!(!keypad.irq_condition());
    }
}
