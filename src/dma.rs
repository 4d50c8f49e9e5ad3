//! DMA controller
//!
//! Four channels, lower index wins when several arm at once. A channel
//! arms when its enable bit is set and its trigger condition arrives
//! (immediately, at VBlank, or at HBlank); the activation event then runs
//! the whole transfer before the CPU resumes.

use crate::bus::Access;
use crate::emu::Gba;
use crate::interrupt::IrqSource;
use crate::scheduler::EventKind;

/// Address adjustment applied after each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjustMode {
    #[default]
    Increment,
    Decrement,
    Fixed,
    /// Destination only: increment during the transfer, then reset to the
    /// programmed address when a repeat reloads.
    Reload,
}

impl AdjustMode {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => AdjustMode::Increment,
            1 => AdjustMode::Decrement,
            2 => AdjustMode::Fixed,
            _ => AdjustMode::Reload,
        }
    }
}

/// Transfer trigger condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingMode {
    #[default]
    Now,
    VBlank,
    HBlank,
    /// Sound/video capture timing; reserved, never triggers here.
    Refresh,
}

impl TimingMode {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => TimingMode::Now,
            1 => TimingMode::VBlank,
            2 => TimingMode::HBlank,
            _ => TimingMode::Refresh,
        }
    }
}

/// Parsed DMAxCNT_H.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmaControl {
    pub val: u16,
    pub dst_adjust: AdjustMode,
    pub src_adjust: AdjustMode,
    pub repeat: bool,
    /// Bytes per chunk, 2 or 4.
    pub chunk_size: u32,
    pub timing: TimingMode,
    pub irq: bool,
    pub enable: bool,
}

/// One DMA channel. The `internal_*` copies are the working registers the
/// transfer mutates; the programmed values survive for repeats.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmaChannel {
    pub src: u32,
    pub dst: u32,
    pub count: u16,
    pub internal_src: u32,
    pub internal_dst: u32,
    pub internal_count: u32,
    pub control: DmaControl,
}

impl DmaChannel {
    /// Unit count with the zero-means-max rule applied.
    fn effective_count(&self, ch: usize) -> u32 {
        if self.count == 0 {
            if ch == 3 {
                0x1_0000
            } else {
                0x4000
            }
        } else {
            self.count as u32
        }
    }
}

/// The four channels plus the value latch DMA re-drives when its source is
/// unreadable (the BIOS region).
#[derive(Debug, Clone, Copy, Default)]
pub struct Dma {
    pub channels: [DmaChannel; 4],
    last_load: u32,
}

impl Gba {
    /// DMAxCNT_H write. A rising enable latches the internal registers and,
    /// for immediate timing, schedules the activation.
    pub(crate) fn dma_control_write(&mut self, ch: usize, value: u16) {
        let was_enabled = self.dma.channels[ch].control.enable;

        let control = DmaControl {
            val: value,
            dst_adjust: AdjustMode::from_bits(value >> 5),
            src_adjust: AdjustMode::from_bits(value >> 7),
            repeat: value & (1 << 9) != 0,
            chunk_size: if value & (1 << 10) != 0 { 4 } else { 2 },
            timing: TimingMode::from_bits(value >> 12),
            irq: value & (1 << 14) != 0,
            enable: value & (1 << 15) != 0,
        };
        self.dma.channels[ch].control = control;

        if !control.enable {
            self.scheduler.cancel(EventKind::DmaActivate(ch));
            return;
        }
        if was_enabled {
            return;
        }

        let channel = &mut self.dma.channels[ch];
        channel.internal_src = channel.src;
        channel.internal_dst = channel.dst;
        channel.internal_count = channel.effective_count(ch);

        if control.timing == TimingMode::Now {
            self.scheduler.push(EventKind::DmaActivate(ch), 2);
        }
    }

    /// Arm every enabled VBlank-triggered channel. Push order gives lower
    /// channels priority on the tie.
    pub(crate) fn dma_on_vblank(&mut self) {
        for ch in 0..4 {
            let control = self.dma.channels[ch].control;
            if control.enable && control.timing == TimingMode::VBlank {
                self.scheduler.push(EventKind::DmaActivate(ch), 0);
            }
        }
    }

    /// Arm every enabled HBlank-triggered channel.
    pub(crate) fn dma_on_hblank(&mut self) {
        for ch in 0..4 {
            let control = self.dma.channels[ch].control;
            if control.enable && control.timing == TimingMode::HBlank {
                self.scheduler.push(EventKind::DmaActivate(ch), 0);
            }
        }
    }

    /// Run channel `ch` to completion.
    pub(crate) fn dma_run(&mut self, ch: usize) {
        let control = self.dma.channels[ch].control;
        if !control.enable {
            // A control write between arming and activation disarmed us.
            return;
        }

        let mut src = self.dma.channels[ch].internal_src;
        let mut dst = self.dma.channels[ch].internal_dst;
        let count = self.dma.channels[ch].internal_count;

        // Source addresses are narrower on low channels; only channel 3 may
        // target the cartridge space.
        let src_region = src >> 24;
        let dst_region = dst >> 24;
        if src_region != 0xE {
            src &= if ch == 0 { 0x07FF_FFFF } else { 0x0FFF_FFFF };
        }
        if dst_region != 0xE {
            dst &= if ch < 3 { 0x07FF_FFFF } else { 0x0FFF_FFFF };
        }
        let src_is_cart = (0x8..=0xD).contains(&src_region);

        log::trace!(
            "dma{ch}: {count} x {} bytes {src:08X} -> {dst:08X}",
            control.chunk_size
        );

        let mut access = Access::NonSeq;
        for _ in 0..count {
            if control.chunk_size == 4 {
                // Sources below the external bus (the BIOS region) are not
                // readable by DMA; the last value latched keeps driving.
                if src >= 0x0200_0000 {
                    self.dma.last_load = self.bus_read32(src, access);
                }
                self.bus_write32(dst, self.dma.last_load, access);
            } else {
                if src >= 0x0200_0000 {
                    self.dma.last_load = self.bus_read16(src, access) as u32;
                }
                self.bus_write16(dst, self.dma.last_load as u16, access);
            }
            access = Access::Seq;

            if src_is_cart {
                // The cartridge bus always increments regardless of the
                // programmed source adjustment.
                src = src.wrapping_add(control.chunk_size);
            } else {
                match control.src_adjust {
                    AdjustMode::Increment => src = src.wrapping_add(control.chunk_size),
                    AdjustMode::Decrement => src = src.wrapping_sub(control.chunk_size),
                    AdjustMode::Fixed => {}
                    // Reload is meaningless for sources; hardware treats
                    // the encoding as increment.
                    AdjustMode::Reload => src = src.wrapping_add(control.chunk_size),
                }
            }
            match control.dst_adjust {
                AdjustMode::Increment | AdjustMode::Reload => {
                    dst = dst.wrapping_add(control.chunk_size)
                }
                AdjustMode::Decrement => dst = dst.wrapping_sub(control.chunk_size),
                AdjustMode::Fixed => {}
            }
        }

        let channel = &mut self.dma.channels[ch];
        channel.internal_src = src;
        channel.internal_dst = dst;
        channel.internal_count = 0;

        if control.repeat {
            channel.internal_count = channel.effective_count(ch);
            if control.dst_adjust == AdjustMode::Reload {
                channel.internal_dst = channel.dst;
            }
        } else {
            channel.control.enable = false;
        }

        if control.irq {
            self.raise_interrupt(IrqSource::dma(ch));
        }
    }
}
