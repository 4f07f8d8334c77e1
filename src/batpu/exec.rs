// batpu/exec.rs
use serde::Serialize;

use crate::batpu::{
    asm::Program,
    breakpoints::Breakpoints,
    decoder,
    errors::Fault,
    instruction::Instruction,
    memory::Bus,
    registers::{Cpu, CpuState},
};

/// Why a `run` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    Halted,
    Breakpoint,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    /// Instructions executed by this call.
    pub executed: u64,
    pub fault: Option<Fault>,
}

#[inline]
fn add_flags(cpu: &mut Cpu, a: u8, b: u8) -> u8 {
    let (res, carry) = a.overflowing_add(b);
    cpu.flags.zero = res == 0;
    cpu.flags.carry = carry;
    res
}

// carry means "no borrow"
#[inline]
fn sub_flags(cpu: &mut Cpu, a: u8, b: u8) -> u8 {
    let res = a.wrapping_sub(b);
    cpu.flags.zero = res == 0;
    cpu.flags.carry = a >= b;
    res
}

#[inline]
fn logic_flags(cpu: &mut Cpu, res: u8) -> u8 {
    cpu.flags.zero = res == 0;
    cpu.flags.carry = false;
    res
}

/// Executes one instruction. `Ok(false)` once the CPU is halted (including
/// when it already was). `hlt` counts as executed and leaves the PC on the
/// `hlt` word. A fault halts the CPU with the PC on the faulting word and is
/// returned as `Err`.
pub fn step<B: Bus>(cpu: &mut Cpu, mem: &mut B, program: &Program) -> Result<bool, Fault> {
    if cpu.halted() {
        return Ok(false);
    }
    let pc = cpu.pc;
    let Some(word) = program.word(pc as usize) else {
        // ran off the end of the program
        cpu.state = CpuState::Halted;
        return Ok(false);
    };
    let instr = match decoder::decode(word) {
        Ok(i) => i,
        Err(_) => {
            cpu.state = CpuState::Halted;
            return Err(Fault::IllegalInstruction { pc, word });
        }
    };
    tracing::trace!(pc, word, ?instr, "exec");
    let mut next = pc.wrapping_add(1);

    match instr {
        Instruction::Nop => {}
        Instruction::Hlt => {
            cpu.state = CpuState::Halted;
            cpu.instructions += 1;
            cpu.last_pc = Some(pc);
            return Ok(false);
        }

        Instruction::Add{ra,rb,rc} => { let (a, b) = (cpu.read(ra), cpu.read(rb)); let v = add_flags(cpu, a, b); cpu.write(rc, v); }
        Instruction::Sub{ra,rb,rc} => { let (a, b) = (cpu.read(ra), cpu.read(rb)); let v = sub_flags(cpu, a, b); cpu.write(rc, v); }
        Instruction::Nor{ra,rb,rc} => { let r = !(cpu.read(ra) | cpu.read(rb)); let v = logic_flags(cpu, r); cpu.write(rc, v); }
        Instruction::And{ra,rb,rc} => { let r = cpu.read(ra) & cpu.read(rb); let v = logic_flags(cpu, r); cpu.write(rc, v); }
        Instruction::Xor{ra,rb,rc} => { let r = cpu.read(ra) ^ cpu.read(rb); let v = logic_flags(cpu, r); cpu.write(rc, v); }

        Instruction::Rsh{ra,rc} => {
            let a = cpu.read(ra);
            let res = a >> 1;
            cpu.flags.carry = a & 1 != 0;
            cpu.flags.zero = res == 0;
            cpu.write(rc, res);
        }
        Instruction::Lsh{ra,rc} => {
            let a = cpu.read(ra);
            let res = a << 1;
            cpu.flags.carry = a & 0x80 != 0;
            cpu.flags.zero = res == 0;
            cpu.write(rc, res);
        }
        Instruction::Cmp{ra,rb} => { let (a, b) = (cpu.read(ra), cpu.read(rb)); sub_flags(cpu, a, b); }
        Instruction::Mov{ra,rb} => { let v = cpu.read(rb); cpu.write(ra, v); }
        Instruction::Inc{ra} => { let a = cpu.read(ra); let v = add_flags(cpu, a, 1); cpu.write(ra, v); }
        Instruction::Dec{ra} => { let a = cpu.read(ra); let v = sub_flags(cpu, a, 1); cpu.write(ra, v); }
        Instruction::Not{ra} => { let r = !cpu.read(ra); let v = logic_flags(cpu, r); cpu.write(ra, v); }
        Instruction::Neg{ra} => { let r = cpu.read(ra).wrapping_neg(); let v = logic_flags(cpu, r); cpu.write(ra, v); }

        Instruction::Ldi{ra,imm} => cpu.write(ra, imm),
        Instruction::Adi{ra,imm} => { let a = cpu.read(ra); let v = add_flags(cpu, a, imm); cpu.write(ra, v); }

        Instruction::Jmp{addr} => next = addr,
        Instruction::Brh{cond,addr} if cond.holds(cpu.flags.zero, cpu.flags.carry) => next = addr,
        Instruction::Brh{..} => {}
        Instruction::Cal{addr} => {
            if !cpu.push_return(next) {
                cpu.state = CpuState::Halted;
                return Err(Fault::CallStackOverflow { pc });
            }
            next = addr;
        }
        Instruction::Ret => match cpu.pop_return() {
            Some(ret) => next = ret,
            None => {
                cpu.state = CpuState::Halted;
                return Err(Fault::CallStackUnderflow { pc });
            }
        },

        Instruction::Lod{ra,rb,offset} => {
            let a = cpu.read(rb).wrapping_add(offset as u8);
            let v = mem.load8(a);
            cpu.write(ra, v);
        }
        Instruction::Str{ra,rb,offset} => {
            let a = cpu.read(rb).wrapping_add(offset as u8);
            let v = cpu.read(ra);
            mem.store8(a, v);
        }
    }

    cpu.pc = next;
    cpu.instructions += 1;
    cpu.last_pc = Some(pc);
    Ok(true)
}

/// Steps until halt, `max` instructions, or a breakpoint. The breakpoint at
/// the starting PC is ignored so a paused run can always make progress.
pub fn run<B: Bus>(
    cpu: &mut Cpu,
    mem: &mut B,
    program: &Program,
    breakpoints: &Breakpoints,
    max: u64,
) -> RunOutcome {
    let start = cpu.instructions;
    if cpu.halted() {
        return RunOutcome { reason: StopReason::Halted, executed: 0, fault: None };
    }
    cpu.state = CpuState::Running;

    let mut fault = None;
    let reason = loop {
        let executed = cpu.instructions - start;
        if executed >= max {
            break StopReason::Limit;
        }
        if executed > 0 && breakpoints.contains(cpu.pc as usize) {
            break StopReason::Breakpoint;
        }
        match step(cpu, mem, program) {
            Ok(true) => {}
            Ok(false) => break StopReason::Halted,
            Err(f) => {
                fault = Some(f);
                break StopReason::Halted;
            }
        }
    };

    if cpu.state == CpuState::Running {
        cpu.state = CpuState::Ready;
    }
    RunOutcome { reason, executed: cpu.instructions - start, fault }
}
