//! Thumb instruction set
//!
//! 16-bit opcodes decoded through a 1024-entry table indexed by bits 15-6.
//! The same physical-PC convention as ARM applies: R15 reads A+6 during
//! execution, so operand reads of the PC subtract 2.

use crate::bus::Access;
use crate::cpu::{alu_add, alu_sub, barrel_shifter, psr, vector, Mode, ShiftKind};
use crate::emu::Gba;

type ThumbHandler = fn(&mut Gba, u16);

#[inline]
fn decode_index(instr: u16) -> usize {
    ((instr >> 6) & 0x3FF) as usize
}

fn fetch_next(gba: &mut Gba) -> u16 {
    let instr = gba.cpu.pipeline[0] as u16;
    gba.cpu.pipeline[0] = gba.cpu.pipeline[1];
    let access = gba.cpu.next_fetch_access;
    gba.cpu.next_fetch_access = Access::Seq;
    let pc = gba.cpu.regs[15];
    gba.cpu.pipeline[1] = gba.bus_read16(pc, access) as u32;
    gba.cpu.regs[15] = pc.wrapping_add(2);
    instr
}

/// Refill both pipeline slots at the branch target in R15.
pub(crate) fn refill(gba: &mut Gba) {
    let pc = gba.cpu.regs[15] & !1;
    gba.cpu.pipeline[0] = gba.bus_read16(pc, Access::NonSeq) as u32;
    gba.cpu.pipeline[1] = gba.bus_read16(pc.wrapping_add(2), Access::Seq) as u32;
    gba.cpu.regs[15] = pc.wrapping_add(4);
    gba.cpu.next_fetch_access = Access::Seq;
}

pub(crate) fn step(gba: &mut Gba) {
    let instr = fetch_next(gba);
    THUMB_LUT[decode_index(instr)](gba, instr);
}

fn thumb_undefined(gba: &mut Gba, instr: u16) {
    log::warn!(
        "undefined Thumb instruction {:04X} at {:08X}",
        instr,
        gba.cpu.regs[15].wrapping_sub(6)
    );
    let lr = gba.cpu.regs[15].wrapping_sub(4);
    gba.exception(Mode::Und, vector::UNDEFINED, lr);
}

// Format 1: move shifted register
fn thumb_lsl_lsr_asr(gba: &mut Gba, instr: u16) {
    let kind = ShiftKind::from_bits((instr >> 11) as u32);
    let amt = ((instr >> 6) & 0x1F) as u32;
    let rs = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;

    let res = barrel_shifter(&gba.cpu, kind, gba.cpu.regs[rs], amt, true);
    gba.cpu.regs[rd] = res.value;
    gba.cpu.set_nzc(res.value, res.carry);
}

// Format 2: add/subtract
fn thumb_add_sub(gba: &mut Gba, instr: u16) {
    let imm = instr & (1 << 10) != 0;
    let sub = instr & (1 << 9) != 0;
    let rn = ((instr >> 6) & 7) as usize;
    let rs = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;

    let op1 = gba.cpu.regs[rs];
    let op2 = if imm { rn as u32 } else { gba.cpu.regs[rn] };

    let res = if sub {
        alu_sub(op1, op2, 0)
    } else {
        alu_add(op1, op2, 0)
    };
    gba.cpu.regs[rd] = res.value;
    gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
}

// Format 3: move/compare/add/subtract immediate
fn thumb_mov_cmp_add_sub_imm(gba: &mut Gba, instr: u16) {
    let op = (instr >> 11) & 3;
    let rd = ((instr >> 8) & 7) as usize;
    let imm = (instr & 0xFF) as u32;

    match op {
        0 => {
            gba.cpu.regs[rd] = imm;
            gba.cpu.set_nz(imm);
        }
        1 => {
            let res = alu_sub(gba.cpu.regs[rd], imm, 0);
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        2 => {
            let res = alu_add(gba.cpu.regs[rd], imm, 0);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        _ => {
            let res = alu_sub(gba.cpu.regs[rd], imm, 0);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
    }
}

// Format 4: register-register ALU operations
fn thumb_data_proc(gba: &mut Gba, instr: u16) {
    let op = (instr >> 6) & 0xF;
    let rs = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;

    let op1 = gba.cpu.regs[rd];
    let op2 = gba.cpu.regs[rs];
    let c_in = gba.cpu.flag(psr::C) as u32;

    match op {
        0x0 => {
            let res = op1 & op2;
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
        }
        0x1 => {
            let res = op1 ^ op2;
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
        }
        0x2 | 0x3 | 0x4 | 0x7 => {
            // Shifts by register amount.
            let kind = match op {
                0x2 => ShiftKind::Lsl,
                0x3 => ShiftKind::Lsr,
                0x4 => ShiftKind::Asr,
                _ => ShiftKind::Ror,
            };
            let res = barrel_shifter(&gba.cpu, kind, op1, op2 & 0xFF, false);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzc(res.value, res.carry);
            gba.idle(1);
        }
        0x5 => {
            let res = alu_add(op1, op2, c_in);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        0x6 => {
            let res = alu_sub(op1, op2, 1 - c_in);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        0x8 => {
            gba.cpu.set_nz(op1 & op2);
        }
        0x9 => {
            let res = alu_sub(0, op2, 0);
            gba.cpu.regs[rd] = res.value;
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        0xA => {
            let res = alu_sub(op1, op2, 0);
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        0xB => {
            let res = alu_add(op1, op2, 0);
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        0xC => {
            let res = op1 | op2;
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
        }
        0xD => {
            let rs_val = op2;
            let significant = rs_val ^ (((rs_val as i32) >> 31) as u32);
            let mut cycles = 1;
            cycles += (significant > 0xFF) as u32;
            cycles += (significant > 0xFFFF) as u32;
            cycles += (significant > 0xFF_FFFF) as u32;
            let res = op1.wrapping_mul(op2);
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
            gba.idle(cycles);
        }
        0xE => {
            let res = op1 & !op2;
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
        }
        _ => {
            let res = !op2;
            gba.cpu.regs[rd] = res;
            gba.cpu.set_nz(res);
        }
    }
}

/// Operand read with the PC compensated to the architectural value (A+4).
#[inline]
fn reg_pc4(gba: &Gba, r: usize) -> u32 {
    let val = gba.cpu.regs[r];
    if r == 15 {
        val.wrapping_sub(2)
    } else {
        val
    }
}

// Format 5: Hi register operations
fn thumb_hi_reg_ops(gba: &mut Gba, instr: u16) {
    let op = (instr >> 8) & 3;
    let rs = (((instr >> 3) & 7) | ((instr >> 3) & 8)) as usize;
    let rd = ((instr & 7) | ((instr >> 4) & 8)) as usize;

    let rs_val = reg_pc4(gba, rs);
    match op {
        0 => {
            let res = gba.cpu.regs[rd].wrapping_add(rs_val);
            let res = if rd == 15 { res.wrapping_sub(2) } else { res };
            gba.cpu.regs[rd] = res;
            if rd == 15 {
                gba.cpu.regs[15] &= !1;
                refill(gba);
            }
        }
        1 => {
            let rd_val = reg_pc4(gba, rd);
            let res = alu_sub(rd_val, rs_val, 0);
            gba.cpu.set_nzcv(res.value, res.carry, res.overflow);
        }
        2 => {
            gba.cpu.regs[rd] = rs_val;
            if rd == 15 {
                gba.cpu.regs[15] &= !1;
                refill(gba);
            }
        }
        _ => unreachable!("BX decodes separately"),
    }
}

// Format 5: BX
fn thumb_bx(gba: &mut Gba, instr: u16) {
    let rs = (((instr >> 3) & 7) | ((instr >> 3) & 8)) as usize;
    let target = reg_pc4(gba, rs);
    if target & 1 != 0 {
        gba.cpu.regs[15] = target & !1;
        refill(gba);
    } else {
        gba.cpu.cpsr &= !psr::T;
        gba.cpu.regs[15] = target & !3;
        super::arm::refill(gba);
    }
}

// Format 6: PC-relative load
fn thumb_ldr_pc_rel(gba: &mut Gba, instr: u16) {
    let rd = ((instr >> 8) & 7) as usize;
    let offset = ((instr & 0xFF) as u32) << 2;

    let addr = (gba.cpu.regs[15].wrapping_sub(2) & !2).wrapping_add(offset);
    gba.cpu.regs[rd] = gba.bus_read32(addr, Access::NonSeq);
    gba.idle(1);
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 7: load/store with register offset
fn thumb_ldr_str_reg(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let ro = ((instr >> 6) & 7) as usize;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(gba.cpu.regs[ro]);

    if load {
        gba.cpu.regs[rd] = gba.bus_read32(addr, Access::NonSeq);
        gba.idle(1);
    } else {
        gba.bus_write32(addr, gba.cpu.regs[rd], Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

fn thumb_ldrb_strb_reg(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let ro = ((instr >> 6) & 7) as usize;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(gba.cpu.regs[ro]);

    if load {
        gba.cpu.regs[rd] = gba.bus_read8(addr, Access::NonSeq) as u32;
        gba.idle(1);
    } else {
        gba.bus_write8(addr, gba.cpu.regs[rd] as u8, Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 8: load/store halfword with register offset
fn thumb_ldrh_strh_reg(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let ro = ((instr >> 6) & 7) as usize;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(gba.cpu.regs[ro]);

    if load {
        let half = gba.bus_read16(addr, Access::NonSeq) as u32;
        gba.cpu.regs[rd] = if addr & 1 != 0 {
            barrel_shifter(&gba.cpu, ShiftKind::Ror, half, 8, true).value
        } else {
            half
        };
        gba.idle(1);
    } else {
        gba.bus_write16(addr, gba.cpu.regs[rd] as u16, Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 8: sign-extended load
fn thumb_ldrsh_ldrsb_reg(gba: &mut Gba, instr: u16) {
    let half = instr & (1 << 11) != 0;
    let ro = ((instr >> 6) & 7) as usize;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(gba.cpu.regs[ro]);

    let val = if half {
        let v = gba.bus_read16(addr, Access::NonSeq) as u32;
        if addr & 1 != 0 {
            ((v >> 8) as u8 as i8) as i32 as u32
        } else {
            v as u16 as i16 as i32 as u32
        }
    } else {
        gba.bus_read8(addr, Access::NonSeq) as i8 as i32 as u32
    };
    gba.cpu.regs[rd] = val;
    gba.idle(1);
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 9: load/store with immediate offset
fn thumb_ldr_str_imm(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let offset = (((instr >> 6) & 0x1F) as u32) << 2;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(offset);

    if load {
        gba.cpu.regs[rd] = gba.bus_read32(addr, Access::NonSeq);
        gba.idle(1);
    } else {
        gba.bus_write32(addr, gba.cpu.regs[rd], Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

fn thumb_ldrb_strb_imm(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let offset = ((instr >> 6) & 0x1F) as u32;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(offset);

    if load {
        gba.cpu.regs[rd] = gba.bus_read8(addr, Access::NonSeq) as u32;
        gba.idle(1);
    } else {
        gba.bus_write8(addr, gba.cpu.regs[rd] as u8, Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 10: load/store halfword with immediate offset
fn thumb_ldrh_strh_imm(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let offset = (((instr >> 6) & 0x1F) as u32) << 1;
    let rb = ((instr >> 3) & 7) as usize;
    let rd = (instr & 7) as usize;
    let addr = gba.cpu.regs[rb].wrapping_add(offset);

    if load {
        gba.cpu.regs[rd] = gba.bus_read16(addr, Access::NonSeq) as u32;
        gba.idle(1);
    } else {
        gba.bus_write16(addr, gba.cpu.regs[rd] as u16, Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 11: SP-relative load/store
fn thumb_ldr_str_sp_rel(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let rd = ((instr >> 8) & 7) as usize;
    let offset = ((instr & 0xFF) as u32) << 2;
    let addr = gba.cpu.regs[13].wrapping_add(offset);

    if load {
        gba.cpu.regs[rd] = gba.bus_read32(addr, Access::NonSeq);
        gba.idle(1);
    } else {
        gba.bus_write32(addr, gba.cpu.regs[rd], Access::NonSeq);
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 12: load address from SP or PC
fn thumb_add_sp_pc(gba: &mut Gba, instr: u16) {
    let from_sp = instr & (1 << 11) != 0;
    let rd = ((instr >> 8) & 7) as usize;
    let offset = ((instr & 0xFF) as u32) << 2;

    let base = if from_sp {
        gba.cpu.regs[13]
    } else {
        gba.cpu.regs[15].wrapping_sub(2) & !2
    };
    gba.cpu.regs[rd] = base.wrapping_add(offset);
}

// Format 13: adjust stack pointer
fn thumb_add_sub_sp(gba: &mut Gba, instr: u16) {
    let offset = ((instr & 0x7F) as u32) << 2;
    if instr & (1 << 7) != 0 {
        gba.cpu.regs[13] = gba.cpu.regs[13].wrapping_sub(offset);
    } else {
        gba.cpu.regs[13] = gba.cpu.regs[13].wrapping_add(offset);
    }
}

// Format 14: push/pop
fn thumb_push_pop(gba: &mut Gba, instr: u16) {
    let pop = instr & (1 << 11) != 0;
    let pclr = instr & (1 << 8) != 0;
    let list = (instr & 0xFF) as u32;

    if list == 0 && !pclr {
        // Empty-list quirk: only R15 moves, SP steps a full 0x40.
        if pop {
            let val = gba.bus_read32(gba.cpu.regs[13], Access::NonSeq);
            gba.cpu.regs[13] = gba.cpu.regs[13].wrapping_add(0x40);
            gba.cpu.regs[15] = val & !1;
            refill(gba);
        } else {
            let addr = gba.cpu.regs[13].wrapping_sub(0x40);
            gba.bus_write32(addr, gba.cpu.regs[15], Access::NonSeq);
            gba.cpu.regs[13] = addr;
            gba.cpu.next_fetch_access = Access::NonSeq;
        }
        return;
    }

    let count = list.count_ones() + pclr as u32;
    let mut access = Access::NonSeq;
    gba.cpu.next_fetch_access = Access::NonSeq;

    if pop {
        let mut addr = gba.cpu.regs[13];
        gba.cpu.regs[13] = addr.wrapping_add(count * 4);
        for i in 0..8 {
            if list & (1 << i) != 0 {
                gba.cpu.regs[i] = gba.bus_read32(addr, access);
                access = Access::Seq;
                addr = addr.wrapping_add(4);
            }
        }
        if pclr {
            let val = gba.bus_read32(addr, access);
            gba.cpu.regs[15] = val & !1;
            refill(gba);
        }
        gba.idle(1);
    } else {
        let mut addr = gba.cpu.regs[13].wrapping_sub(count * 4);
        gba.cpu.regs[13] = addr;
        for i in 0..8 {
            if list & (1 << i) != 0 {
                gba.bus_write32(addr, gba.cpu.regs[i], access);
                access = Access::Seq;
                addr = addr.wrapping_add(4);
            }
        }
        if pclr {
            gba.bus_write32(addr, gba.cpu.regs[14], access);
        }
    }
}

// Format 15: multiple load/store
fn thumb_ldm_stm(gba: &mut Gba, instr: u16) {
    let load = instr & (1 << 11) != 0;
    let rb = ((instr >> 8) & 7) as usize;
    let list = (instr & 0xFF) as u32;

    let base = gba.cpu.regs[rb];

    if list == 0 {
        // Empty-list quirk: R15 transfers, base steps 0x40.
        if load {
            let val = gba.bus_read32(base, Access::NonSeq);
            gba.cpu.regs[rb] = base.wrapping_add(0x40);
            gba.cpu.regs[15] = val & !1;
            refill(gba);
        } else {
            gba.bus_write32(base, gba.cpu.regs[15], Access::NonSeq);
            gba.cpu.regs[rb] = base.wrapping_add(0x40);
            gba.cpu.next_fetch_access = Access::NonSeq;
        }
        return;
    }

    let final_addr = base.wrapping_add(list.count_ones() * 4);
    let lowest = list.trailing_zeros() as usize;
    let mut addr = base;
    let mut access = Access::NonSeq;

    if load {
        // Base in the list: the loaded value wins over writeback.
        if list & (1 << rb) == 0 {
            gba.cpu.regs[rb] = final_addr;
        }
        for i in 0..8 {
            if list & (1 << i) != 0 {
                gba.cpu.regs[i] = gba.bus_read32(addr, access);
                access = Access::Seq;
                addr = addr.wrapping_add(4);
            }
        }
        gba.idle(1);
    } else {
        for i in 0..8 {
            if list & (1 << i) != 0 {
                let val = if i == rb && i != lowest {
                    final_addr
                } else {
                    gba.cpu.regs[i]
                };
                gba.bus_write32(addr, val, access);
                access = Access::Seq;
                addr = addr.wrapping_add(4);
            }
        }
        gba.cpu.regs[rb] = final_addr;
    }
    gba.cpu.next_fetch_access = Access::NonSeq;
}

// Format 16: conditional branch
fn thumb_bcc(gba: &mut Gba, instr: u16) {
    let cond = ((instr >> 8) & 0xF) as u32;
    if !gba.cpu.check_cond(cond) {
        return;
    }
    let offset = ((instr & 0xFF) as i8 as i32) << 1;
    gba.cpu.regs[15] = gba
        .cpu
        .regs[15]
        .wrapping_add(offset as u32)
        .wrapping_sub(2);
    refill(gba);
}

// Format 17: SWI
fn thumb_swi(gba: &mut Gba, _instr: u16) {
    let lr = gba.cpu.regs[15].wrapping_sub(4);
    gba.exception(Mode::Svc, vector::SWI, lr);
}

// Format 18: unconditional branch
fn thumb_branch(gba: &mut Gba, instr: u16) {
    let offset = (((instr & 0x7FF) as i32) << 21 >> 21) << 1;
    gba.cpu.regs[15] = gba
        .cpu
        .regs[15]
        .wrapping_add(offset as u32)
        .wrapping_sub(2);
    refill(gba);
}

// Format 19: long branch with link, first half
fn thumb_bl_prefix(gba: &mut Gba, instr: u16) {
    let offset = (((instr & 0x7FF) as i32) << 21 >> 21) << 12;
    gba.cpu.regs[14] = gba
        .cpu
        .regs[15]
        .wrapping_sub(2)
        .wrapping_add(offset as u32);
}

// Format 19: long branch with link, second half
fn thumb_bl_suffix(gba: &mut Gba, instr: u16) {
    let offset = ((instr & 0x7FF) as u32) << 1;
    let target = gba.cpu.regs[14].wrapping_add(offset);
    // Return address with bit 0 set, marking a Thumb return.
    gba.cpu.regs[14] = gba.cpu.regs[15].wrapping_sub(4) | 1;
    gba.cpu.regs[15] = target & !1;
    refill(gba);
}

const fn build_lut() -> [ThumbHandler; 1024] {
    let mut lut: [ThumbHandler; 1024] = [thumb_undefined; 1024];
    let mut i = 0;
    while i < 1024 {
        lut[i] = if i & 0b1111100000 == 0b0001100000 {
            thumb_add_sub
        } else if i & 0b1110000000 == 0b0000000000 {
            thumb_lsl_lsr_asr
        } else if i & 0b1110000000 == 0b0010000000 {
            thumb_mov_cmp_add_sub_imm
        } else if i & 0b1111110000 == 0b0100000000 {
            thumb_data_proc
        } else if i & 0b1111111100 == 0b0100011100 {
            thumb_bx
        } else if i & 0b1111110000 == 0b0100010000 {
            thumb_hi_reg_ops
        } else if i & 0b1111100000 == 0b0100100000 {
            thumb_ldr_pc_rel
        } else if i & 0b1111011000 == 0b0101001000 {
            thumb_ldrh_strh_reg
        } else if i & 0b1111011000 == 0b0101011000 {
            thumb_ldrsh_ldrsb_reg
        } else if i & 0b1111011000 == 0b0101000000 {
            thumb_ldr_str_reg
        } else if i & 0b1111011000 == 0b0101010000 {
            thumb_ldrb_strb_reg
        } else if i & 0b1111000000 == 0b0110000000 {
            thumb_ldr_str_imm
        } else if i & 0b1111000000 == 0b0111000000 {
            thumb_ldrb_strb_imm
        } else if i & 0b1111000000 == 0b1000000000 {
            thumb_ldrh_strh_imm
        } else if i & 0b1111000000 == 0b1001000000 {
            thumb_ldr_str_sp_rel
        } else if i & 0b1111000000 == 0b1010000000 {
            thumb_add_sp_pc
        } else if i & 0b1111111100 == 0b1011000000 {
            thumb_add_sub_sp
        } else if i & 0b1111011000 == 0b1011010000 {
            thumb_push_pop
        } else if i & 0b1111000000 == 0b1100000000 {
            thumb_ldm_stm
        } else if i & 0b1111111100 == 0b1101111100 {
            thumb_swi
        } else if i & 0b1111111100 == 0b1101111000 {
            // Condition 1110 in the branch slot is undefined.
            thumb_undefined
        } else if i & 0b1111000000 == 0b1101000000 {
            thumb_bcc
        } else if i & 0b1111100000 == 0b1110000000 {
            thumb_branch
        } else if i & 0b1111100000 == 0b1111000000 {
            thumb_bl_prefix
        } else if i & 0b1111100000 == 0b1111100000 {
            thumb_bl_suffix
        } else {
            thumb_undefined
        };
        i += 1;
    }
    lut
}

static THUMB_LUT: [ThumbHandler; 1024] = build_lut();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_index() {
        // MOV R0, #1 = 0x2001 -> format 3
        assert_eq!(decode_index(0x2001), 0b0010000000);
        // BX R0 = 0x4700
        assert_eq!(decode_index(0x4700), 0b0100011100);
    }

    #[test]
    fn test_lut_routing() {
        assert!(std::ptr::fn_addr_eq(
            THUMB_LUT[0b0010000000],
            thumb_mov_cmp_add_sub_imm as ThumbHandler
        ));
        assert!(std::ptr::fn_addr_eq(
            THUMB_LUT[0b0100011100],
            thumb_bx as ThumbHandler
        ));
        assert!(std::ptr::fn_addr_eq(
            THUMB_LUT[0b0001100000],
            thumb_add_sub as ThumbHandler
        ));
        assert!(std::ptr::fn_addr_eq(
            THUMB_LUT[0b1101111100],
            thumb_swi as ThumbHandler
        ));
        assert!(std::ptr::fn_addr_eq(
            THUMB_LUT[0b1101111000],
            thumb_undefined as ThumbHandler
        ));
    }
}
