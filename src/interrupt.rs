//! Interrupt controller
//!
//! Three registers gate everything: IE (enable mask), IF (pending, set by
//! hardware, acknowledged by the guest writing 1s) and IME (master enable).
//! Any write that could change deliverability pushes an `Irq` event at zero
//! delay; the event handler performs the CPU mode switch at the next
//! instruction boundary.

use bitflags::bitflags;

use crate::cpu::{vector, Mode};
use crate::emu::{Gba, PowerState};
use crate::scheduler::EventKind;

bitflags! {
    /// Interrupt source bits shared by IE and IF.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqSource: u16 {
        const VBLANK = 1 << 0;
        const HBLANK = 1 << 1;
        const VCOUNT = 1 << 2;
        const TIMER0 = 1 << 3;
        const TIMER1 = 1 << 4;
        const TIMER2 = 1 << 5;
        const TIMER3 = 1 << 6;
        const SERIAL = 1 << 7;
        const DMA0 = 1 << 8;
        const DMA1 = 1 << 9;
        const DMA2 = 1 << 10;
        const DMA3 = 1 << 11;
        const KEYPAD = 1 << 12;
        const GAMEPAK = 1 << 13;
    }
}

impl IrqSource {
    /// Source bit for timer `i`.
    pub fn timer(i: usize) -> Self {
        Self::from_bits_truncate(Self::TIMER0.bits() << i)
    }

    /// Source bit for DMA channel `i`.
    pub fn dma(i: usize) -> Self {
        Self::from_bits_truncate(Self::DMA0.bits() << i)
    }
}

/// IE/IF/IME state.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptControl {
    /// Enable mask.
    pub ie: u16,
    /// Pending mask. Write-1-to-clear from the guest side.
    pub if_: u16,
    /// Master enable; only bit 0 matters.
    pub ime: u16,
}

impl Gba {
    /// Latch a pending interrupt and queue a deliverability check.
    pub(crate) fn raise_interrupt(&mut self, source: IrqSource) {
        self.intr.if_ |= source.bits();
        self.scheduler.push(EventKind::Irq, 0);
    }

    /// An interrupt is deliverable iff IME is set, the CPU has IRQs
    /// unmasked, and an enabled source is pending.
    pub(crate) fn interrupts_deliverable(&self) -> bool {
        self.intr.ime & 1 != 0
            && (self.intr.ie & self.intr.if_) != 0
            && !self.cpu.irq_disabled()
    }

    /// `Irq` event handler: if a pending interrupt is deliverable, wake the
    /// CPU and take the exception. IF is left untouched; the guest handler
    /// acknowledges by writing 1s.
    pub(crate) fn irq_dispatch(&mut self) {
        if !self.interrupts_deliverable() {
            return;
        }
        self.power = PowerState::Normal;
        let pc = self.cpu.regs[15];
        let lr = if self.cpu.is_thumb() { pc } else { pc.wrapping_sub(4) };
        self.exception(Mode::Irq, vector::IRQ, lr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_and_dma_source_bits() {
        assert_eq!(IrqSource::timer(0), IrqSource::TIMER0);
        assert_eq!(IrqSource::timer(3), IrqSource::TIMER3);
        assert_eq!(IrqSource::dma(0), IrqSource::DMA0);
        assert_eq!(IrqSource::dma(3), IrqSource::DMA3);
    }
}
