// File: src/errors.rs
//
// Structured error types for the Ember interpreter. Compile errors are
// accumulated by the compiler; runtime errors carry a typed kind plus the
// call-stack trace captured at the point of failure. Both render their
// diagnostic text through Display so callers decide where it goes.

use std::fmt;

/// Where a compile error points in the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    /// At a concrete lexeme: `Error at 'foo'`.
    At(String),
    /// At end of input: `Error at end`.
    AtEnd,
    /// No lexeme, used for lexer-produced error tokens whose message already
    /// says what was seen.
    None,
}

/// One diagnostic produced during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub line: usize,
    pub location: ErrorLocation,
    pub message: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error", self.line)?;
        match &self.location {
            ErrorLocation::At(lexeme) => write!(f, " at '{}'", lexeme)?,
            ErrorLocation::AtEnd => write!(f, " at end")?,
            ErrorLocation::None => {}
        }
        write!(f, ": {}", self.message)
    }
}

/// Every way execution can fail at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    UndefinedVariable(String),
    AlreadyDefined(String),
    ConstReassignment(String),
    OperandMustBeNumber,
    OperandsMustBeNumbers,
    AddTypeMismatch,
    ArityMismatch { expected: usize, got: usize },
    StackOverflow,
    NotCallable,
    UnknownOpcode(u8),
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::UndefinedVariable(name) => {
                write!(f, "Undefined variable '{}'.", name)
            }
            RuntimeErrorKind::AlreadyDefined(name) => {
                write!(f, "Variable '{}' already defined.", name)
            }
            RuntimeErrorKind::ConstReassignment(name) => {
                write!(f, "Can't assign to constant variable '{}'.", name)
            }
            RuntimeErrorKind::OperandMustBeNumber => write!(f, "Operand must be a number."),
            RuntimeErrorKind::OperandsMustBeNumbers => write!(f, "Operands must be numbers."),
            RuntimeErrorKind::AddTypeMismatch => {
                write!(f, "Operands must be two numbers or two strings.")
            }
            RuntimeErrorKind::ArityMismatch { expected, got } => {
                write!(f, "Expected {} arguments, but got {}", expected, got)
            }
            RuntimeErrorKind::StackOverflow => write!(f, "Stack overflow."),
            RuntimeErrorKind::NotCallable => write!(f, "Can only call functions and classes."),
            RuntimeErrorKind::UnknownOpcode(byte) => write!(f, "Unknown opcode {}.", byte),
        }
    }
}

/// One frame of the trace printed with a runtime error. `name` is `None`
/// for the top-level script.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub line: usize,
    pub name: Option<String>,
}

/// A runtime failure with the frames that were live when it happened,
/// innermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub trace: Vec<TraceFrame>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        for frame in &self.trace {
            match &frame.name {
                Some(name) => writeln!(f, "[line {}] in {}()", frame.line, name)?,
                None => writeln!(f, "[line {}] in script", frame.line)?,
            }
        }
        Ok(())
    }
}

/// The failure modes of `Vm::interpret`.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretError {
    Compile(Vec<CompileError>),
    Runtime(RuntimeError),
}

impl InterpretError {
    /// Conventional process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            InterpretError::Compile(_) => 65,
            InterpretError::Runtime(_) => 70,
        }
    }
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpretError::Compile(errors) => {
                for error in errors {
                    writeln!(f, "{}", error)?;
                }
                Ok(())
            }
            InterpretError::Runtime(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for InterpretError {}
