use std::collections::HashMap;

use crate::batpu::encoder::encode;
use crate::batpu::instruction::{Instruction, Operands};
use crate::batpu::isa::{self, Cond, MAX_PROGRAM_WORDS, Shape};

use super::errors::{AsmError, Diagnostics};
use super::program::Program;
use super::utils::*;

/// A define or label, with the 0-based line that bound it.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    value: i64,
    line: usize,
}

type Symbols = HashMap<String, Symbol>;

// ---------- API ----------
pub fn assemble(text: &str) -> Result<Program, Diagnostics> {
    let lines = preprocess(text);
    let mut errors = Vec::<AsmError>::new();

    // 1st pass: symbol table. Labels bind to the index of the next instruction.
    let mut symbols = Symbols::new();
    let mut items: Vec<(usize, String)> = Vec::new(); // (line number, instruction text)

    for (line_no, raw) in &lines {
        let (head, rest) = split_head(raw);

        if head.eq_ignore_ascii_case("define") {
            if let Err(msg) = bind_define(rest, *line_no, &mut symbols) {
                errors.push(AsmError { line: *line_no, msg });
            }
            continue;
        }

        if let Some(name) = head.strip_prefix('.') {
            let value = items.len() as i64;
            if let Err(msg) = bind(name, value, *line_no, &mut symbols) {
                errors.push(AsmError { line: *line_no, msg });
            }
            // an instruction may follow the label on the same line
            if !rest.is_empty() {
                items.push((*line_no, rest.to_string()));
            }
            continue;
        }

        items.push((*line_no, raw.clone()));
    }

    if items.len() > MAX_PROGRAM_WORDS {
        let (line, _) = items[MAX_PROGRAM_WORDS];
        errors.push(AsmError {
            line,
            msg: format!(
                "program has {} instructions, limit is {MAX_PROGRAM_WORDS}",
                items.len()
            ),
        });
    }

    // 2nd pass: encode
    let mut words = Vec::with_capacity(items.len());
    let mut word_lines = Vec::with_capacity(items.len());
    for (line, s) in &items {
        let encoded = parse_instr(s, &symbols)
            .and_then(|inst| encode(inst).map_err(|e| e.to_string()));
        match encoded {
            Ok(word) => {
                words.push(word);
                word_lines.push(*line);
            }
            Err(msg) => errors.push(AsmError { line: *line, msg }),
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Err(Diagnostics(errors));
    }

    Ok(Program {
        text: words,
        lines: word_lines,
    })
}

// ---------- Internals ----------
fn split_head(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

fn bind(name: &str, value: i64, line: usize, symbols: &mut Symbols) -> Result<(), String> {
    if !is_symbol_name(name) {
        return Err(format!("invalid symbol name: {name:?}"));
    }
    if isa::is_reserved(name) {
        return Err(format!("symbol name is reserved: {name}"));
    }
    if let Some(prev) = symbols.get(name) {
        return Err(format!(
            "symbol '{name}' already defined on line {}",
            prev.line + 1
        ));
    }
    symbols.insert(name.to_string(), Symbol { value, line });
    Ok(())
}

fn bind_define(rest: &str, line: usize, symbols: &mut Symbols) -> Result<(), String> {
    let parts = split_operands(rest);
    if parts.len() != 2 {
        return Err("define: expected 'define NAME VALUE'".into());
    }
    let value = resolve_value(&parts[1], symbols)?;
    bind(&parts[0], value, line, symbols)
}

fn resolve_value(tok: &str, symbols: &Symbols) -> Result<i64, String> {
    if let Some(v) = parse_imm(tok) {
        return Ok(v);
    }
    let name = tok.strip_prefix('.').unwrap_or(tok);
    if !is_symbol_name(name) {
        return Err(format!("invalid literal: {tok}"));
    }
    symbols
        .get(name)
        .map(|s| s.value)
        .ok_or_else(|| format!("undefined symbol: {tok}"))
}

fn get_reg(tok: &str) -> Result<u8, String> {
    if let Some(r) = parse_reg(tok) {
        Ok(r)
    } else if looks_like_reg(tok) {
        Err(format!("register out of range: {tok} (r0..r15)"))
    } else {
        Err(format!("expected register, got {tok}"))
    }
}

fn get_imm8(tok: &str, symbols: &Symbols, ctx: &str) -> Result<u8, String> {
    let v = check_range(resolve_value(tok, symbols)?, -128, 255, ctx)?;
    Ok((v & 0xFF) as u8)
}

fn get_addr(tok: &str, symbols: &Symbols, ctx: &str) -> Result<u16, String> {
    let v = check_range(resolve_value(tok, symbols)?, 0, MAX_PROGRAM_WORDS as i64 - 1, ctx)?;
    Ok(v as u16)
}

fn get_offset(ops: &[String], symbols: &Symbols, ctx: &str) -> Result<i8, String> {
    match ops.get(2) {
        Some(tok) => Ok(check_range(resolve_value(tok, symbols)?, -8, 7, ctx)? as i8),
        None => Ok(0),
    }
}

fn arity_ok(shape: Shape, n: usize) -> bool {
    match shape {
        Shape::None => n == 0,
        Shape::Reg | Shape::Addr10 => n == 1,
        Shape::RegReg | Shape::RegImm8 | Shape::CondAddr10 => n == 2,
        Shape::RegRegReg => n == 3,
        Shape::RegRegOffset => n == 2 || n == 3,
    }
}

fn parse_instr(s: &str, symbols: &Symbols) -> Result<Instruction, String> {
    // ex: "add r1 r2 r3" or "add r1, r2, r3"
    let (head, rest) = split_head(s);
    let ops = split_operands(rest);
    let info = isa::lookup(head).ok_or_else(|| format!("unknown mnemonic: {head}"))?;
    let m = info.mnemonic;

    if !arity_ok(info.shape, ops.len()) {
        return Err(format!(
            "{m}: expected {}, got {} operand(s)",
            info.shape.usage(),
            ops.len()
        ));
    }

    let operands = match info.shape {
        Shape::None => Operands::None,
        Shape::Reg => Operands::Reg(get_reg(&ops[0])?),
        Shape::RegReg => Operands::RegReg(get_reg(&ops[0])?, get_reg(&ops[1])?),
        Shape::RegRegReg => {
            Operands::RegRegReg(get_reg(&ops[0])?, get_reg(&ops[1])?, get_reg(&ops[2])?)
        }
        Shape::RegImm8 => Operands::RegImm8(get_reg(&ops[0])?, get_imm8(&ops[1], symbols, m)?),
        Shape::Addr10 => Operands::Addr10(get_addr(&ops[0], symbols, m)?),
        Shape::CondAddr10 => {
            let cond = Cond::parse(&ops[0])
                .ok_or_else(|| format!("brh: unknown condition: {}", ops[0]))?;
            Operands::CondAddr10(cond, get_addr(&ops[1], symbols, m)?)
        }
        Shape::RegRegOffset => Operands::RegRegOffset(
            get_reg(&ops[0])?,
            get_reg(&ops[1])?,
            get_offset(&ops, symbols, m)?,
        ),
    };
    Instruction::build(m, operands).ok_or_else(|| format!("{m}: operands do not fit"))
}
