//! System orchestrator
//!
//! `Gba` owns every component. The frame loop alternates between draining
//! due scheduler events and executing one CPU instruction; bus accesses
//! advance the clock, which is what makes events come due. Events are only
//! dispatched between instructions, so they always observe whole-instruction
//! state.

use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::dma::Dma;
use crate::interrupt::InterruptControl;
use crate::io::Io;
use crate::keypad::Keypad;
use crate::memory::{self, LoadError, Rom};
use crate::ppu::{Ppu, CYCLES_PER_FRAME, H_VISIBLE_CYCLES, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::scheduler::{Event, EventKind, Scheduler};
use crate::timers::Timer;

/// CPU power state. Halted and Stopped both park the CPU until an
/// interrupt becomes deliverable; Stopped is treated as a deep halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Normal,
    Halted,
    Stopped,
}

/// The whole console.
pub struct Gba {
    pub cpu: Cpu,
    pub bus: Bus,
    pub scheduler: Scheduler,
    pub ppu: Ppu,
    pub intr: InterruptControl,
    pub timers: [Timer; 4],
    pub dma: Dma,
    pub keypad: Keypad,
    pub io: Io,
    pub power: PowerState,
}

impl Gba {
    /// Build a console from a BIOS and cartridge image and put it in the
    /// post-BIOS boot state.
    pub fn new(bios: &[u8], rom: &[u8]) -> Result<Self, LoadError> {
        let bios = memory::load_bios(bios)?;
        let rom = Rom::load(rom)?;
        log::info!(
            "ROM loaded: \"{}\" code={} maker={} ({} bytes)",
            rom.title(),
            rom.code(),
            rom.maker(),
            rom.size()
        );

        let mut gba = Self {
            cpu: Cpu::new(),
            bus: Bus::new(bios, rom),
            scheduler: Scheduler::new(),
            ppu: Ppu::new(),
            intr: InterruptControl::default(),
            timers: [Timer::default(); 4],
            dma: Dma::default(),
            keypad: Keypad::new(),
            io: Io::default(),
            power: PowerState::Normal,
        };
        gba.start();
        Ok(gba)
    }

    /// Prime the pipeline and the PPU event chain. The prefetch accesses
    /// run before cycle zero so the counter starts clean.
    fn start(&mut self) {
        crate::cpu::arm::refill(self);
        let skew = self.scheduler.now();
        self.scheduler.advance(0u32.wrapping_sub(skew));
        self.scheduler.push(EventKind::HBlankStart, H_VISIBLE_CYCLES);
    }

    /// Reset to the power-on state, keeping the loaded images.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.scheduler = Scheduler::new();
        self.ppu = Ppu::new();
        self.intr = InterruptControl::default();
        self.timers = [Timer::default(); 4];
        self.dma = Dma::default();
        self.keypad = Keypad::new();
        self.io = Io::default();
        self.power = PowerState::Normal;
        self.bus.update_waitstates(0);
        self.start();
    }

    /// Internal CPU cycles with no bus activity.
    #[inline]
    pub(crate) fn idle(&mut self, cycles: u32) {
        self.scheduler.advance(cycles);
    }

    /// Run until the frame-end sentinel fires (one full frame of 228
    /// scanlines), then return. The framebuffer holds the finished frame.
    pub fn run_frame(&mut self) {
        self.scheduler.push(EventKind::FrameEnd, CYCLES_PER_FRAME);
        loop {
            while let Some(event) = self.scheduler.pop_due() {
                if self.dispatch_event(event) {
                    return;
                }
            }
            match self.power {
                PowerState::Normal => self.cpu_step(),
                // Halted: no instructions execute; skip straight to
                // whatever is scheduled next.
                PowerState::Halted | PowerState::Stopped => self.scheduler.fast_forward(),
            }
        }
    }

    /// Handle one event. Returns true for the frame-end sentinel.
    pub(crate) fn dispatch_event(&mut self, event: Event) -> bool {
        match event.kind {
            EventKind::FrameEnd => return true,
            EventKind::HBlankStart => self.ppu_hblank_start(),
            EventKind::HBlankEnd => self.ppu_hblank_end(),
            EventKind::VBlankLineStart => self.ppu_vblank_line_start(),
            EventKind::VBlankLineEnd => self.ppu_vblank_line_end(),
            EventKind::TimerOverflow(idx) => {
                let lateness = self.scheduler.now().wrapping_sub(event.time);
                self.timer_overflow(idx, lateness);
            }
            EventKind::DmaActivate(ch) => self.dma_run(ch),
            EventKind::Irq => self.irq_dispatch(),
        }
        false
    }

    /// The finished 240x160 ARGB8888 frame, row-major.
    pub fn framebuffer(&self) -> &[u32] {
        &self.ppu.framebuffer
    }

    pub fn framebuffer_size(&self) -> (usize, usize) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Cartridge header accessors for the frontend's window title.
    pub fn rom_title(&self) -> &str {
        self.bus.rom.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BIOS_SIZE;

    fn gba() -> Gba {
        Gba::new(&[0u8; BIOS_SIZE], &[0u8; 0x100]).unwrap()
    }

    #[test]
    fn test_bios_size_validated() {
        assert!(Gba::new(&[0u8; 123], &[0u8; 4]).is_err());
        assert!(Gba::new(&[0u8; BIOS_SIZE], &[0u8; 4]).is_ok());
    }

    #[test]
    fn test_initial_state() {
        let gba = gba();
        // Execution starts at the cartridge entry point, pipeline full:
        // R15 is two fetches ahead.
        assert_eq!(gba.cpu.regs[15], 0x0800_0008);
        assert_eq!(gba.cpu.regs[13], 0x0300_7F00);
        assert_eq!(gba.scheduler.now(), 0);
        assert_eq!(gba.power, PowerState::Normal);
    }

    #[test]
    fn test_run_frame_advances_one_frame() {
        let mut gba = gba();
        gba.run_frame();
        // ROM is zeroed: the CPU executes harmless ANDEQ instructions.
        assert!(gba.scheduler.now() >= CYCLES_PER_FRAME);
        assert!(gba.scheduler.now() < CYCLES_PER_FRAME + 100);
    }

    #[test]
    fn test_vcount_cycles_through_frame() {
        let mut gba = gba();
        gba.run_frame();
        // The frame-end sentinel fires on the final line-end boundary, so
        // the first frame ends with the last VBlank line still current.
        assert_eq!(gba.ppu.vcount, 227);
        gba.run_frame();
        assert_eq!(gba.ppu.vcount, 227);
    }

    #[test]
    fn test_halt_fast_forwards() {
        let mut gba = gba();
        gba.power = PowerState::Halted;
        gba.run_frame();
        // The CPU never stepped, so the clock landed exactly on events.
        assert_eq!(gba.scheduler.now(), CYCLES_PER_FRAME);
    }

    #[test]
    fn test_reset_restores_boot_state(){
        let mut gba = gba();
        gba.run_frame();
        gba.set_keyinput(0);
        gba.reset();
        assert_eq!(gba.scheduler.now(), 0);
        assert_eq!(gba.cpu.regs[15], 0x0800_0008);
        assert_eq!(gba.keypad.keyinput, 0x03FF);
    }
}
