//! Game Boy Advance Emulator Core
//!
//! This crate provides a platform-agnostic emulator core with a stable C ABI.
//! No OS APIs are used - the BIOS and cartridge images come in as byte
//! buffers and video frames go out as a pixel buffer.
//!
//! # Architecture
//!
//! The emulator is organized into several modules:
//! - `scheduler`: global cycle counter and timed event queue
//! - `memory`: BIOS/ROM images and load validation
//! - `bus`: address decoding, waitstates and open-bus behavior
//! - `io`: the memory-mapped register file
//! - `cpu`: ARM7TDMI (ARM + Thumb instruction sets)
//! - `interrupt`, `timers`, `dma`, `keypad`: the on-board peripherals
//! - `ppu`: scanline renderer driven by scheduler events
//! - `emu`: the system aggregate and frame loop
//!
//! # Memory Map (32-bit ARM address space)
//!
//! | Address Range           | Region              |
//! |-------------------------|---------------------|
//! | 0x00000000 - 0x00003FFF | BIOS (16 KiB)       |
//! | 0x02000000 - 0x0203FFFF | Work RAM (256 KiB)  |
//! | 0x03000000 - 0x03007FFF | Work RAM (32 KiB)   |
//! | 0x04000000 - 0x040003FF | I/O registers       |
//! | 0x05000000 - 0x050003FF | Palette RAM         |
//! | 0x06000000 - 0x06017FFF | VRAM (96 KiB)       |
//! | 0x07000000 - 0x070003FF | OAM                 |
//! | 0x08000000 - 0x0DFFFFFF | Cartridge ROM       |
//! | 0x0E000000 - 0x0E00FFFF | Cartridge SRAM      |

pub mod bus;
pub mod cpu;
pub mod dma;
pub mod emu;
pub mod interrupt;
pub mod io;
pub mod keypad;
pub mod memory;
pub mod ppu;
pub mod scheduler;
pub mod timers;


use std::ptr;
use std::slice;

pub use emu::{Gba, PowerState};
pub use keypad::Button;
pub use memory::LoadError;

fn load_error_code(err: &LoadError) -> i32 {
    match err {
        LoadError::BiosSize(_) => -2,
        LoadError::RomTooLarge(_) => -3,
    }
}

/// Create an emulator instance from BIOS and ROM images.
/// Returns null if either image is rejected.
#[no_mangle]
pub extern "C" fn gba_create(
    bios: *const u8,
    bios_len: usize,
    rom: *const u8,
    rom_len: usize,
) -> *mut Gba {
    if bios.is_null() || rom.is_null() {
        return ptr::null_mut();
    }

    let bios = unsafe { slice::from_raw_parts(bios, bios_len) };
    let rom = unsafe { slice::from_raw_parts(rom, rom_len) };

    match Gba::new(bios, rom) {
        Ok(gba) => Box::into_raw(Box::new(gba)),
        Err(err) => {
            log::error!("load rejected: {err}");
            ptr::null_mut()
        }
    }
}

/// Destroy an emulator instance.
/// Safe to call with null pointer.
#[no_mangle]
pub extern "C" fn gba_destroy(gba: *mut Gba) {
    if !gba.is_null() {
        unsafe {
            drop(Box::from_raw(gba));
        }
    }
}

/// Reset the emulator to the power-on state, keeping the loaded images.
#[no_mangle]
pub extern "C" fn gba_reset(gba: *mut Gba) {
    if gba.is_null() {
        return;
    }
    let gba = unsafe { &mut *gba };
    gba.reset();
}

/// Run one full video frame (228 scanlines).
#[no_mangle]
pub extern "C" fn gba_run_frame(gba: *mut Gba) {
    if gba.is_null() {
        return;
    }
    let gba = unsafe { &mut *gba };
    gba.run_frame();
}

/// Get a pointer to the framebuffer.
/// The framebuffer is ARGB8888 format, owned by the emulator.
/// Writes width and height to the provided pointers if non-null.
/// Returns null if emulator pointer is null.
#[no_mangle]
pub extern "C" fn gba_framebuffer(gba: *const Gba, w: *mut i32, h: *mut i32) -> *const u32 {
    if gba.is_null() {
        return ptr::null();
    }

    let gba = unsafe { &*gba };
    let (width, height) = gba.framebuffer_size();

    if !w.is_null() {
        unsafe { *w = width as i32 };
    }
    if !h.is_null() {
        unsafe { *h = height as i32 };
    }

    gba.framebuffer().as_ptr()
}

/// Set one button's state.
/// button: 0-9 in {A, B, SELECT, START, RIGHT, LEFT, UP, DOWN, R, L} order
/// down: non-zero for pressed, zero for released
#[no_mangle]
pub extern "C" fn gba_set_key(gba: *mut Gba, button: i32, down: i32) {
    if gba.is_null() {
        return;
    }
    let gba = unsafe { &mut *gba };
    let button = match button {
        0 => Button::A,
        1 => Button::B,
        2 => Button::Select,
        3 => Button::Start,
        4 => Button::Right,
        5 => Button::Left,
        6 => Button::Up,
        7 => Button::Down,
        8 => Button::R,
        9 => Button::L,
        _ => return,
    };
    gba.set_button(button, down != 0);
}

/// Replace the whole KEYINPUT register (inverted logic, 0 = pressed).
#[no_mangle]
pub extern "C" fn gba_set_keys(gba: *mut Gba, keyinput: u16) {
    if gba.is_null() {
        return;
    }
    let gba = unsafe { &mut *gba };
    gba.set_keyinput(keyinput);
}

/// Last load failure mapped to a status code, for frontends that want a
/// reason instead of a null pointer. Returns 0 on success.
#[no_mangle]
pub extern "C" fn gba_probe_images(
    bios: *const u8,
    bios_len: usize,
    rom: *const u8,
    rom_len: usize,
) -> i32 {
    if bios.is_null() || rom.is_null() {
        return -1;
    }
    let bios = unsafe { slice::from_raw_parts(bios, bios_len) };
    let rom = unsafe { slice::from_raw_parts(rom, rom_len) };
    if let Err(err) = memory::load_bios(bios).map(|_| ()) {
        return load_error_code(&err);
    }
    match memory::Rom::load(rom) {
        Ok(_) => 0,
        Err(err) => load_error_code(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BIOS_SIZE;

    #[test]
    fn test_create_destroy() {
        let bios = vec![0u8; BIOS_SIZE];
        let rom = vec![0u8; 0x100];
        let gba = gba_create(bios.as_ptr(), bios.len(), rom.as_ptr(), rom.len());
        assert!(!gba.is_null());
        gba_destroy(gba);
    }

    #[test]
    fn test_create_rejects_bad_bios() {
        let bios = vec![0u8; 100];
        let rom = vec![0u8; 0x100];
        let gba = gba_create(bios.as_ptr(), bios.len(), rom.as_ptr(), rom.len());
        assert!(gba.is_null());
        assert_eq!(
            gba_probe_images(bios.as_ptr(), bios.len(), rom.as_ptr(), rom.len()),
            -2
        );
    }

    #[test]
    fn test_framebuffer() {
        let bios = vec![0u8; BIOS_SIZE];
        let rom = vec![0u8; 0x100];
        let gba = gba_create(bios.as_ptr(), bios.len(), rom.as_ptr(), rom.len());
        let mut w: i32 = 0;
        let mut h: i32 = 0;
        let fb = gba_framebuffer(gba, &mut w, &mut h);

        assert!(!fb.is_null());
        assert_eq!(w, 240);
        assert_eq!(h, 160);

        gba_destroy(gba);
    }

    #[test]
    fn test_key_input() {
        let bios = vec![0u8; BIOS_SIZE];
        let rom = vec![0u8; 0x100];
        let gba = gba_create(bios.as_ptr(), bios.len(), rom.as_ptr(), rom.len());
        gba_set_key(gba, 0, 1);
        {
            let g = unsafe { &*gba };
            assert_eq!(g.keypad.keyinput & 1, 0);
        }
        gba_set_key(gba, 0, 0);
        {
            let g = unsafe { &*gba };
            assert_eq!(g.keypad.keyinput, 0x03FF);
        }
        // Out-of-range button ids are ignored.
        gba_set_key(gba, 42, 1);
        gba_destroy(gba);
    }

    #[test]
    fn test_null_safety() {
        gba_destroy(ptr::null_mut());
        gba_run_frame(ptr::null_mut());
        gba_reset(ptr::null_mut());
        gba_set_keys(ptr::null_mut(), 0);
        assert!(gba_framebuffer(ptr::null(), ptr::null_mut(), ptr::null_mut()).is_null());
        assert!(gba_create(ptr::null(), 0, ptr::null(), 0).is_null());
    }
}
