// batpu/isa.rs
//! Encoding table shared by the assembler and the decoder.
//!
//! A word is 16 bits: the top nibble is the major opcode, the remaining three
//! nibbles hold operands. Major opcode 7 is a two-register group whose second
//! nibble selects the actual operation.

pub const WORD_BITS: usize = 16;
pub const MAX_PROGRAM_WORDS: usize = 1024;
pub const NUM_REGISTERS: usize = 16;
pub const CALL_STACK_DEPTH: usize = 16;

// major opcodes
pub const OPC_NOP: u16 = 0x0;
pub const OPC_HLT: u16 = 0x1;
pub const OPC_ADD: u16 = 0x2;
pub const OPC_SUB: u16 = 0x3;
pub const OPC_NOR: u16 = 0x4;
pub const OPC_AND: u16 = 0x5;
pub const OPC_XOR: u16 = 0x6;
pub const OPC_GROUP: u16 = 0x7;
pub const OPC_LDI: u16 = 0x8;
pub const OPC_ADI: u16 = 0x9;
pub const OPC_JMP: u16 = 0xA;
pub const OPC_BRH: u16 = 0xB;
pub const OPC_CAL: u16 = 0xC;
pub const OPC_RET: u16 = 0xD;
pub const OPC_LOD: u16 = 0xE;
pub const OPC_STR: u16 = 0xF;

// group 7 extension codes
pub const EXT_RSH: u16 = 0x0;
pub const EXT_LSH: u16 = 0x1;
pub const EXT_CMP: u16 = 0x2;
pub const EXT_MOV: u16 = 0x3;
pub const EXT_INC: u16 = 0x4;
pub const EXT_DEC: u16 = 0x5;
pub const EXT_NOT: u16 = 0x6;
pub const EXT_NEG: u16 = 0x7;

/// Operand layout of a mnemonic, as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Reg,
    RegReg,
    RegRegReg,
    RegImm8,
    Addr10,
    CondAddr10,
    /// `rA rB [offset]`
    RegRegOffset,
}

impl Shape {
    pub fn usage(self) -> &'static str {
        match self {
            Shape::None => "no operands",
            Shape::Reg => "'rA'",
            Shape::RegReg => "'rA rB'",
            Shape::RegRegReg => "'rA rB rC'",
            Shape::RegImm8 => "'rA imm8'",
            Shape::Addr10 => "'address'",
            Shape::CondAddr10 => "'condition address'",
            Shape::RegRegOffset => "'rA rB [offset]'",
        }
    }
}

/// One row of the catalog: mnemonic, major opcode, optional group extension.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub mnemonic: &'static str,
    pub major: u16,
    pub ext: Option<u16>,
    pub shape: Shape,
}

const fn op(mnemonic: &'static str, major: u16, shape: Shape) -> OpInfo {
    OpInfo { mnemonic, major, ext: None, shape }
}

const fn grp(mnemonic: &'static str, ext: u16, shape: Shape) -> OpInfo {
    OpInfo { mnemonic, major: OPC_GROUP, ext: Some(ext), shape }
}

pub static OPCODES: [OpInfo; 23] = [
    op("nop", OPC_NOP, Shape::None),
    op("hlt", OPC_HLT, Shape::None),
    op("add", OPC_ADD, Shape::RegRegReg),
    op("sub", OPC_SUB, Shape::RegRegReg),
    op("nor", OPC_NOR, Shape::RegRegReg),
    op("and", OPC_AND, Shape::RegRegReg),
    op("xor", OPC_XOR, Shape::RegRegReg),
    grp("rsh", EXT_RSH, Shape::RegReg),
    grp("lsh", EXT_LSH, Shape::RegReg),
    op("ldi", OPC_LDI, Shape::RegImm8),
    op("adi", OPC_ADI, Shape::RegImm8),
    op("jmp", OPC_JMP, Shape::Addr10),
    op("brh", OPC_BRH, Shape::CondAddr10),
    op("cal", OPC_CAL, Shape::Addr10),
    op("ret", OPC_RET, Shape::None),
    op("lod", OPC_LOD, Shape::RegRegOffset),
    op("str", OPC_STR, Shape::RegRegOffset),
    grp("cmp", EXT_CMP, Shape::RegReg),
    grp("mov", EXT_MOV, Shape::RegReg),
    grp("inc", EXT_INC, Shape::Reg),
    grp("dec", EXT_DEC, Shape::Reg),
    grp("not", EXT_NOT, Shape::Reg),
    grp("neg", EXT_NEG, Shape::Reg),
];

pub fn lookup(mnemonic: &str) -> Option<&'static OpInfo> {
    OPCODES.iter().find(|o| o.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Row for a major opcode plus, for the group, its extension code.
pub fn by_encoding(major: u16, ext: Option<u16>) -> Option<&'static OpInfo> {
    OPCODES.iter().find(|o| o.major == major && o.ext == ext)
}

impl OpInfo {
    /// Fixed bits of the word: major opcode and group extension.
    pub fn head(&self) -> u16 {
        (self.major << 12) | (self.ext.unwrap_or(0) << 8)
    }
}

/// Branch condition carried in bits 11..10 of a `brh` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Zero,
    NotZero,
    Carry,
    NotCarry,
}

impl Cond {
    pub fn bits(self) -> u16 {
        match self {
            Cond::Zero => 0,
            Cond::NotZero => 1,
            Cond::Carry => 2,
            Cond::NotCarry => 3,
        }
    }

    pub fn from_bits(bits: u16) -> Cond {
        match bits & 0b11 {
            0 => Cond::Zero,
            1 => Cond::NotZero,
            2 => Cond::Carry,
            _ => Cond::NotCarry,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cond::Zero => "zero",
            Cond::NotZero => "notzero",
            Cond::Carry => "carry",
            Cond::NotCarry => "notcarry",
        }
    }

    pub fn parse(tok: &str) -> Option<Cond> {
        match tok.to_ascii_lowercase().as_str() {
            "zero" | "z" | "eq" | "=" => Some(Cond::Zero),
            "notzero" | "nz" | "ne" | "!=" => Some(Cond::NotZero),
            "carry" | "c" | "ge" | ">=" => Some(Cond::Carry),
            "notcarry" | "nc" | "lt" | "<" => Some(Cond::NotCarry),
            _ => None,
        }
    }

    pub fn holds(self, zero: bool, carry: bool) -> bool {
        match self {
            Cond::Zero => zero,
            Cond::NotZero => !zero,
            Cond::Carry => carry,
            Cond::NotCarry => !carry,
        }
    }
}

/// Tokens that cannot be used as define or label names.
pub fn is_reserved(name: &str) -> bool {
    lookup(name).is_some()
        || Cond::parse(name).is_some()
        || name.eq_ignore_ascii_case("define")
        || crate::batpu::asm::utils::looks_like_reg(name)
}

pub fn binary_string(word: u16) -> String {
    format!("{word:0width$b}", width = WORD_BITS)
}
