// batpu/instruction.rs
use crate::batpu::isa::Cond;

/// Decoded instruction. Register fields are 0..=15, addresses 0..=1023,
/// offsets -8..=7; the encoder and decoder keep them in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop, Hlt,

    // ALU, rC := rA op rB
    Add{ ra:u8, rb:u8, rc:u8 }, Sub{ ra:u8, rb:u8, rc:u8 },
    Nor{ ra:u8, rb:u8, rc:u8 }, And{ ra:u8, rb:u8, rc:u8 },
    Xor{ ra:u8, rb:u8, rc:u8 },

    // group 7
    Rsh{ ra:u8, rc:u8 }, Lsh{ ra:u8, rc:u8 },
    Cmp{ ra:u8, rb:u8 }, Mov{ ra:u8, rb:u8 },
    Inc{ ra:u8 }, Dec{ ra:u8 }, Not{ ra:u8 }, Neg{ ra:u8 },

    // immediates
    Ldi{ ra:u8, imm:u8 }, Adi{ ra:u8, imm:u8 },

    // control flow
    Jmp{ addr:u16 }, Brh{ cond:Cond, addr:u16 }, Cal{ addr:u16 }, Ret,

    // memory, address = rB + offset
    Lod{ ra:u8, rb:u8, offset:i8 }, Str{ ra:u8, rb:u8, offset:i8 },
}

/// Operand values in source order, one variant per [`Shape`](crate::batpu::isa::Shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    Reg(u8),
    RegReg(u8, u8),
    RegRegReg(u8, u8, u8),
    RegImm8(u8, u8),
    Addr10(u16),
    CondAddr10(Cond, u16),
    RegRegOffset(u8, u8, i8),
}

impl Instruction {
    /// Inverse of [`Instruction::split`]. `None` when the operands do not fit
    /// the mnemonic.
    pub fn build(mnemonic: &str, ops: Operands) -> Option<Instruction> {
        use Instruction::*;
        use Operands as O;
        Some(match (mnemonic, ops) {
            ("nop", O::None) => Nop,
            ("hlt", O::None) => Hlt,
            ("ret", O::None) => Ret,
            ("add", O::RegRegReg(ra, rb, rc)) => Add { ra, rb, rc },
            ("sub", O::RegRegReg(ra, rb, rc)) => Sub { ra, rb, rc },
            ("nor", O::RegRegReg(ra, rb, rc)) => Nor { ra, rb, rc },
            ("and", O::RegRegReg(ra, rb, rc)) => And { ra, rb, rc },
            ("xor", O::RegRegReg(ra, rb, rc)) => Xor { ra, rb, rc },
            ("rsh", O::RegReg(ra, rc)) => Rsh { ra, rc },
            ("lsh", O::RegReg(ra, rc)) => Lsh { ra, rc },
            ("cmp", O::RegReg(ra, rb)) => Cmp { ra, rb },
            ("mov", O::RegReg(ra, rb)) => Mov { ra, rb },
            ("inc", O::Reg(ra)) => Inc { ra },
            ("dec", O::Reg(ra)) => Dec { ra },
            ("not", O::Reg(ra)) => Not { ra },
            ("neg", O::Reg(ra)) => Neg { ra },
            ("ldi", O::RegImm8(ra, imm)) => Ldi { ra, imm },
            ("adi", O::RegImm8(ra, imm)) => Adi { ra, imm },
            ("jmp", O::Addr10(addr)) => Jmp { addr },
            ("cal", O::Addr10(addr)) => Cal { addr },
            ("brh", O::CondAddr10(cond, addr)) => Brh { cond, addr },
            ("lod", O::RegRegOffset(ra, rb, offset)) => Lod { ra, rb, offset },
            ("str", O::RegRegOffset(ra, rb, offset)) => Str { ra, rb, offset },
            _ => return None,
        })
    }

    /// Mnemonic and operands, the form the encoding table works with.
    pub fn split(self) -> (&'static str, Operands) {
        use Instruction::*;
        use Operands as O;
        match self {
            Nop => ("nop", O::None),
            Hlt => ("hlt", O::None),
            Ret => ("ret", O::None),
            Add { ra, rb, rc } => ("add", O::RegRegReg(ra, rb, rc)),
            Sub { ra, rb, rc } => ("sub", O::RegRegReg(ra, rb, rc)),
            Nor { ra, rb, rc } => ("nor", O::RegRegReg(ra, rb, rc)),
            And { ra, rb, rc } => ("and", O::RegRegReg(ra, rb, rc)),
            Xor { ra, rb, rc } => ("xor", O::RegRegReg(ra, rb, rc)),
            Rsh { ra, rc } => ("rsh", O::RegReg(ra, rc)),
            Lsh { ra, rc } => ("lsh", O::RegReg(ra, rc)),
            Cmp { ra, rb } => ("cmp", O::RegReg(ra, rb)),
            Mov { ra, rb } => ("mov", O::RegReg(ra, rb)),
            Inc { ra } => ("inc", O::Reg(ra)),
            Dec { ra } => ("dec", O::Reg(ra)),
            Not { ra } => ("not", O::Reg(ra)),
            Neg { ra } => ("neg", O::Reg(ra)),
            Ldi { ra, imm } => ("ldi", O::RegImm8(ra, imm)),
            Adi { ra, imm } => ("adi", O::RegImm8(ra, imm)),
            Jmp { addr } => ("jmp", O::Addr10(addr)),
            Cal { addr } => ("cal", O::Addr10(addr)),
            Brh { cond, addr } => ("brh", O::CondAddr10(cond, addr)),
            Lod { ra, rb, offset } => ("lod", O::RegRegOffset(ra, rb, offset)),
            Str { ra, rb, offset } => ("str", O::RegRegOffset(ra, rb, offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batpu::isa::{OPCODES, Shape};

    fn sample(shape: Shape) -> Operands {
        match shape {
            Shape::None => Operands::None,
            Shape::Reg => Operands::Reg(3),
            Shape::RegReg => Operands::RegReg(3, 4),
            Shape::RegRegReg => Operands::RegRegReg(3, 4, 5),
            Shape::RegImm8 => Operands::RegImm8(3, 200),
            Shape::Addr10 => Operands::Addr10(700),
            Shape::CondAddr10 => Operands::CondAddr10(Cond::Carry, 700),
            Shape::RegRegOffset => Operands::RegRegOffset(3, 4, -2),
        }
    }

    #[test]
    fn every_table_row_builds_and_splits_back() {
        for info in &OPCODES {
            let ops = sample(info.shape);
            let inst = Instruction::build(info.mnemonic, ops)
                .unwrap_or_else(|| panic!("{} does not take {:?}", info.mnemonic, info.shape));
            assert_eq!(inst.split(), (info.mnemonic, ops));
        }
    }

    #[test]
    fn mismatched_operands_are_refused() {
        assert_eq!(Instruction::build("add", Operands::Reg(1)), None);
        assert_eq!(Instruction::build("frob", Operands::None), None);
    }
}
