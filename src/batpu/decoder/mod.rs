use crate::batpu::instruction::{Instruction, Operands};
use crate::batpu::isa::{self, Cond, OPC_GROUP, Shape};

#[inline] fn bits(v:u16, hi:u8, lo:u8)->u16 { (v >> lo) & ((1u16 << (hi-lo+1)) - 1) }
#[inline] fn sext4(v:u16) -> i8 { (((v as u8) << 4) as i8) >> 4 }

/// Strict decode: the row is found in the encoding table by major opcode
/// (and extension for the group), and bits the row's shape leaves unused
/// must be zero.
pub fn decode(word: u16) -> Result<Instruction, &'static str> {
    let major = bits(word, 15, 12);
    let ext = (major == OPC_GROUP).then(|| bits(word, 11, 8));
    let info = isa::by_encoding(major, ext).ok_or("undefined group extension")?;

    let a = bits(word, 11, 8) as u8;
    let b = bits(word, 7, 4) as u8;
    let c = bits(word, 3, 0) as u8;
    let reserved = |ok: bool| if ok { Ok(()) } else { Err("reserved bits set") };

    let ops = match info.shape {
        Shape::None => {
            reserved(bits(word, 11, 0) == 0)?;
            Operands::None
        }
        Shape::Reg => {
            reserved(c == 0)?;
            Operands::Reg(b)
        }
        Shape::RegReg => Operands::RegReg(b, c),
        Shape::RegRegReg => Operands::RegRegReg(a, b, c),
        Shape::RegImm8 => Operands::RegImm8(a, bits(word, 7, 0) as u8),
        Shape::Addr10 => {
            reserved(bits(word, 11, 10) == 0)?;
            Operands::Addr10(bits(word, 9, 0))
        }
        Shape::CondAddr10 => Operands::CondAddr10(Cond::from_bits(bits(word, 11, 10)), bits(word, 9, 0)),
        Shape::RegRegOffset => Operands::RegRegOffset(a, b, sext4(c as u16)),
    };
    Instruction::build(info.mnemonic, ops).ok_or("operands do not match mnemonic")
}

/// Renders one word as assembler text. Undefined patterns become
/// `invalid opcode` so a listing never aborts.
pub fn disasm(word: u16) -> String {
    match decode(word) {
        Ok(i) => pretty_instr(&i),
        Err(_) => "invalid opcode".into(),
    }
}

pub fn pretty_instr(i: &Instruction) -> String {
    let (m, ops) = i.split();
    match ops {
        Operands::None => m.to_string(),
        Operands::Reg(ra) => format!("{m} r{ra}"),
        Operands::RegReg(ra, rb) => format!("{m} r{ra} r{rb}"),
        Operands::RegRegReg(ra, rb, rc) => format!("{m} r{ra} r{rb} r{rc}"),
        // adi adds, so its byte reads better signed
        Operands::RegImm8(ra, imm) if matches!(i, Instruction::Adi { .. }) => format!("{m} r{ra} {}", imm as i8),
        Operands::RegImm8(ra, imm) => format!("{m} r{ra} {imm}"),
        Operands::Addr10(addr) => format!("{m} {addr}"),
        Operands::CondAddr10(cond, addr) => format!("{m} {} {addr}", cond.name()),
        Operands::RegRegOffset(ra, rb, 0) => format!("{m} r{ra} r{rb}"),
        Operands::RegRegOffset(ra, rb, offset) => format!("{m} r{ra} r{rb} {offset}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batpu::encoder::encode;

    #[test]
    fn decodes_what_the_encoder_produces() {
        let samples = [
            Instruction::Sub { ra: 3, rb: 4, rc: 5 },
            Instruction::Lsh { ra: 1, rc: 2 },
            Instruction::Neg { ra: 9 },
            Instruction::Adi { ra: 2, imm: 0xFE },
            Instruction::Brh { cond: Cond::Carry, addr: 700 },
            Instruction::Lod { ra: 1, rb: 2, offset: -8 },
        ];
        for inst in samples {
            assert_eq!(decode(encode(inst).unwrap()), Ok(inst));
        }
    }

    #[test]
    fn reserved_bits_are_invalid() {
        assert!(decode(0x0001).is_err());
        assert!(decode(0x1800).is_err());
        assert!(decode(0xA400).is_err());
        assert!(decode(0xD00F).is_err());
    }

    #[test]
    fn group_extensions_follow_the_table() {
        assert_eq!(decode(0x7112), Ok(Instruction::Lsh { ra: 1, rc: 2 }));
        assert_eq!(decode(0x7356), Ok(Instruction::Mov { ra: 5, rb: 6 }));
        assert_eq!(decode(0x7640), Ok(Instruction::Not { ra: 4 }));
        // single-register forms leave the last nibble clear
        assert!(decode(0x7641).is_err());
        assert!(decode(0x7F00).is_err());
    }

    #[test]
    fn text_rendering() {
        assert_eq!(disasm(0x2123), "add r1 r2 r3");
        assert_eq!(disasm(0x91FF), "adi r1 -1");
        assert_eq!(disasm(0x81FF), "ldi r1 255");
        assert_eq!(disasm(0xB40C), "brh notzero 12");
        assert_eq!(disasm(0xF120), "str r1 r2");
        assert_eq!(disasm(0xE12D), "lod r1 r2 -3");
        assert_eq!(disasm(0x7800), "invalid opcode");
    }
}
