// File: src/debug.rs
//
// Bytecode disassembler. Pure inspection: renders a chunk (or a single
// instruction) into a String and never touches process output itself.
// Used by the `print-code` and `trace-execution` features and by tests.

use std::convert::TryFrom;

use crate::bytecode::{Chunk, OpCode};

/// Renders every instruction in `chunk` under a `== name ==` header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", name));
    let mut offset = 0;
    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
    }
    out
}

/// Renders the instruction at `offset` and returns the offset of the next
/// one. Instruction widths vary, so callers loop on the return value.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    out.push_str(&format!("{:04} ", offset));
    if offset > 0 && chunk.lines[offset] == chunk.lines[offset - 1] {
        out.push_str("   | ");
    } else {
        out.push_str(&format!("{:4} ", chunk.lines[offset]));
    }

    let byte = chunk.code[offset];
    let op = match OpCode::try_from(byte) {
        Ok(op) => op,
        Err(_) => {
            out.push_str(&format!("unknown opcode {}\n", byte));
            return offset + 1;
        }
    };

    match op {
        OpCode::Constant
        | OpCode::GetGlobal
        | OpCode::DefineConstGlobal
        | OpCode::DefineLetGlobal
        | OpCode::SetGlobal => constant_instruction(op, chunk, offset, out),
        OpCode::ConstantLong => constant_long_instruction(op, chunk, offset, out),
        OpCode::GetLocal
        | OpCode::SetLocal
        | OpCode::GetUpvalue
        | OpCode::SetUpvalue
        | OpCode::Call => byte_instruction(op, chunk, offset, out),
        OpCode::Jump | OpCode::JumpIfFalse => jump_instruction(op, 1, chunk, offset, out),
        OpCode::Loop => jump_instruction(op, -1, chunk, offset, out),
        OpCode::Closure => closure_instruction(op, chunk, offset, out),
        _ => simple_instruction(op, offset, out),
    }
}

fn simple_instruction(op: OpCode, offset: usize, out: &mut String) -> usize {
    out.push_str(op.name());
    out.push('\n');
    offset + 1
}

fn byte_instruction(op: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let slot = chunk.code[offset + 1];
    out.push_str(&format!("{:<16} {:4}\n", op.name(), slot));
    offset + 2
}

fn constant_instruction(op: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let constant = chunk.code[offset + 1] as usize;
    out.push_str(&format!("{:<16} {:4} '{}'\n", op.name(), constant, chunk.constants[constant]));
    offset + 2
}

fn constant_long_instruction(op: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let constant = ((chunk.code[offset + 1] as usize) << 16)
        | ((chunk.code[offset + 2] as usize) << 8)
        | chunk.code[offset + 3] as usize;
    out.push_str(&format!("{:<16} {:4} '{}'\n", op.name(), constant, chunk.constants[constant]));
    offset + 4
}

fn jump_instruction(op: OpCode, sign: i64, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let jump = ((chunk.code[offset + 1] as u16) << 8) | chunk.code[offset + 2] as u16;
    let target = offset as i64 + 3 + sign * jump as i64;
    out.push_str(&format!("{:<16} {:4} -> {}\n", op.name(), offset, target));
    offset + 3
}

fn closure_instruction(op: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let mut offset = offset + 1;
    let constant = chunk.code[offset] as usize;
    offset += 1;
    out.push_str(&format!("{:<16} {:4} {}\n", op.name(), constant, chunk.constants[constant]));

    if let crate::value::Value::Function(function) = &chunk.constants[constant] {
        for _ in 0..function.upvalue_count {
            let is_local = chunk.code[offset];
            let index = chunk.code[offset + 1];
            out.push_str(&format!(
                "{:04}      |                     {} {}\n",
                offset,
                if is_local == 1 { "local" } else { "upvalue" },
                index
            ));
            offset += 2;
        }
    }
    offset
}
