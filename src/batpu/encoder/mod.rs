// src/batpu/encoder/mod.rs
use crate::batpu::instruction::{Instruction, Operands};
use crate::batpu::isa::{MAX_PROGRAM_WORDS, NUM_REGISTERS, lookup};

fn check_reg(r: u8) -> Result<u16, &'static str> {
    if (r as usize) < NUM_REGISTERS { Ok(r as u16) } else { Err("register out of range") }
}

fn check_addr(a: u16) -> Result<u16, &'static str> {
    if (a as usize) < MAX_PROGRAM_WORDS { Ok(a) } else { Err("address out of 10-bit range") }
}

fn check_offset(o: i8) -> Result<u16, &'static str> {
    if (-8..=7).contains(&o) { Ok((o as u8 & 0xF) as u16) } else { Err("offset out of 4-bit signed range") }
}

/// Packs an instruction. The fixed bits come from the encoding table; the
/// operand fields follow the row's shape.
pub fn encode(inst: Instruction) -> Result<u16, &'static str> {
    let (mnemonic, ops) = inst.split();
    let head = lookup(mnemonic).ok_or("mnemonic missing from encoding table")?.head();

    // group forms (Reg, RegReg) keep their operands in the low byte
    let fields = match ops {
        Operands::None => 0,
        Operands::Reg(x) => check_reg(x)? << 4,
        Operands::RegReg(x, y) => (check_reg(x)? << 4) | check_reg(y)?,
        Operands::RegRegReg(a, b, c) => (check_reg(a)? << 8) | (check_reg(b)? << 4) | check_reg(c)?,
        Operands::RegImm8(a, imm) => (check_reg(a)? << 8) | imm as u16,
        Operands::Addr10(a) => check_addr(a)?,
        Operands::CondAddr10(cond, a) => (cond.bits() << 10) | check_addr(a)?,
        Operands::RegRegOffset(a, b, o) => (check_reg(a)? << 8) | (check_reg(b)? << 4) | check_offset(o)?,
    };
    Ok(head | fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batpu::isa::Cond;

    #[test]
    fn fixed_words() {
        assert_eq!(encode(Instruction::Nop).unwrap(), 0x0000);
        assert_eq!(encode(Instruction::Hlt).unwrap(), 0x1000);
        assert_eq!(encode(Instruction::Add { ra: 1, rb: 2, rc: 3 }).unwrap(), 0x2123);
        assert_eq!(encode(Instruction::Ldi { ra: 1, imm: 0xFF }).unwrap(), 0x81FF);
        assert_eq!(encode(Instruction::Inc { ra: 4 }).unwrap(), 0x7440);
    }

    #[test]
    fn brh_packs_condition_above_address() {
        let w = encode(Instruction::Brh { cond: Cond::NotCarry, addr: 1023 }).unwrap();
        assert_eq!(w, 0xBFFF);
        let w = encode(Instruction::Brh { cond: Cond::Zero, addr: 5 }).unwrap();
        assert_eq!(w, 0xB005);
    }

    #[test]
    fn negative_offset_is_twos_complement_nibble() {
        let w = encode(Instruction::Str { ra: 1, rb: 2, offset: -1 }).unwrap();
        assert_eq!(w, 0xF12F);
    }

    #[test]
    fn group_words_carry_the_extension() {
        assert_eq!(encode(Instruction::Lsh { ra: 1, rc: 2 }).unwrap(), 0x7112);
        assert_eq!(encode(Instruction::Mov { ra: 5, rb: 6 }).unwrap(), 0x7356);
        assert_eq!(encode(Instruction::Neg { ra: 9 }).unwrap(), 0x7790);
        assert_eq!(encode(Instruction::Cal { addr: 3 }).unwrap(), 0xC003);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(encode(Instruction::Mov { ra: 16, rb: 0 }).is_err());
        assert!(encode(Instruction::Jmp { addr: 1024 }).is_err());
        assert!(encode(Instruction::Lod { ra: 0, rb: 0, offset: 8 }).is_err());
    }
}
