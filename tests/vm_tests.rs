// Integration tests for the Ember interpreter.
//
// These run complete programs through the public API and assert on the
// exact bytes written to the program's output, plus the shape of the
// diagnostics for failing programs.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use ember::compiler;
use ember::debug::disassemble_chunk;
use ember::errors::{ErrorLocation, InterpretError, RuntimeErrorKind};
use ember::table::Strings;
use ember::vm::Vm;

#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run(source: &str) -> (Result<(), InterpretError>, String) {
    let capture = Capture::default();
    let mut vm = Vm::with_output(Box::new(capture.clone()));
    let result = vm.interpret(source);
    let output = String::from_utf8(capture.0.borrow().clone()).expect("utf-8 output");
    (result, output)
}

fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    assert!(result.is_ok(), "unexpected failure: {:?}", result);
    output
}

#[test]
fn arithmetic_with_precedence() {
    assert_eq!(output_of("print 1 + 2 * 3;"), "7");
}

#[test]
fn interned_strings_compare_equal() {
    assert_eq!(output_of("let a = \"hi\"; let b = \"hi\"; println a == b;"), "true\n");
}

#[test]
fn for_loop_accumulates() {
    assert_eq!(
        output_of("let x = 0; for (let i = 0; i < 3; i = i + 1) { x = x + i; } print x;"),
        "3"
    );
}

#[test]
fn counter_closure_keeps_state() {
    assert_eq!(
        output_of(
            "fun make() { let n = 0; fun inc() { n = n + 1; return n; } return inc; } \
             let f = make(); print f(); print f(); print f();"
        ),
        "123"
    );
}

#[test]
fn const_reassignment_is_a_compile_error() {
    let (result, output) = run("const K = 10; K = 11;");
    assert_eq!(output, "");
    match result {
        Err(error @ InterpretError::Compile(_)) => {
            assert_eq!(error.exit_code(), 65);
            assert_eq!(
                error.to_string(),
                "[line 1] Error at '=': Can't assign to 'const' variable.\n"
            );
        }
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn interpolation_stringifies_expressions() {
    assert_eq!(output_of("let s = \"x=${1+2}\"; println s;"), "x=3\n");
}

#[test]
fn switch_cases_do_not_fall_through() {
    assert_eq!(
        output_of(
            "switch (2) { case 1: println \"a\"; case 2: println \"b\"; default: println \"c\"; }"
        ),
        "b\n"
    );
}

#[test]
fn print_matches_value_formatting() {
    assert_eq!(output_of("print 2.5;"), "2.5");
    assert_eq!(output_of("print true;"), "true");
    assert_eq!(output_of("print nil;"), "nil");
    assert_eq!(output_of("print \"text\";"), "text");
    assert_eq!(output_of("fun f() {} print f;"), "<fn f>");
    assert_eq!(output_of("print clock;"), "<native fn>");
}

#[test]
fn println_appends_newline() {
    assert_eq!(output_of("println 1; println 2;"), "1\n2\n");
}

#[test]
fn utf8_passes_through_strings() {
    assert_eq!(output_of("println \"héllo ✨\";"), "héllo ✨\n");
}

#[test]
fn nested_closures_capture_through_levels() {
    assert_eq!(
        output_of(
            "fun outer() { let a = 1; fun middle() { fun inner() { return a; } return inner; } \
             return middle; } print outer()()();"
        ),
        "1"
    );
}

#[test]
fn loop_controls_inside_while() {
    assert_eq!(
        output_of(
            "let i = 0; while (true) { i = i + 1; if (i == 2) continue; if (i > 4) break; print i; }"
        ),
        "134"
    );
}

#[test]
fn modulo_is_ieee_fmod() {
    assert_eq!(output_of("print 7.5 % 2;"), "1.5");
    assert_eq!(output_of("print -7 % 3;"), "-1");
}

#[test]
fn compile_errors_accumulate_across_statements() {
    let (result, _) = run("let = 1;\nlet b = ;\n");
    match result {
        Err(InterpretError::Compile(errors)) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].line, 1);
            assert_eq!(errors[1].line, 2);
        }
        other => panic!("expected compile errors, got {:?}", other),
    }
}

#[test]
fn error_at_end_locates_eof() {
    let (result, _) = run("print 1");
    match result {
        Err(InterpretError::Compile(errors)) => {
            assert_eq!(errors[0].location, ErrorLocation::AtEnd);
            assert_eq!(errors[0].message, "Expect ';' after value.");
        }
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn runtime_error_renders_message_and_trace() {
    let (result, _) = run("fun boom() { return 1 + nil; }\nboom();");
    match result {
        Err(error @ InterpretError::Runtime(_)) => {
            assert_eq!(error.exit_code(), 70);
            assert_eq!(
                error.to_string(),
                "Operands must be two numbers or two strings.\n\
                 [line 1] in boom()\n\
                 [line 2] in script\n"
            );
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn wrong_arity_reports_expected_and_got() {
    let (result, _) = run("fun two(a, b) { return a; } two(1, 2, 3);");
    match result {
        Err(InterpretError::Runtime(error)) => {
            assert_eq!(error.kind, RuntimeErrorKind::ArityMismatch { expected: 2, got: 3 });
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn repl_style_session_accumulates_state() {
    let capture = Capture::default();
    let mut vm = Vm::with_output(Box::new(capture.clone()));
    vm.interpret("fun double(n) { return n * 2; }").expect("define");
    vm.interpret("let x = double(21);").expect("use earlier definition");
    vm.interpret("println x;").expect("read earlier global");
    assert_eq!(String::from_utf8(capture.0.borrow().clone()).unwrap(), "42\n");
}

#[test]
fn disassembly_round_trips_opcode_names() {
    let mut strings = Strings::new();
    let function = compiler::compile(
        "let a = 1; if (a < 2) { print a; } fun f(x) { return x; } f(a);",
        &mut strings,
    )
    .expect("compiles");

    let text = disassemble_chunk(&function.chunk, "script");
    let mut mnemonics = Vec::new();
    for line in text.lines().skip(1) {
        if let Some(word) = line.split_whitespace().find(|w| w.starts_with("OP_")) {
            mnemonics.push(word.to_string());
        }
    }

    // Re-walk the chunk and compare against the rendered mnemonics.
    let mut expected = Vec::new();
    let mut offset = 0;
    while offset < function.chunk.code.len() {
        let op = ember::bytecode::OpCode::try_from(function.chunk.code[offset])
            .expect("well-formed bytecode");
        expected.push(op.name().to_string());
        let mut scratch = String::new();
        offset = ember::debug::disassemble_instruction(&function.chunk, offset, &mut scratch);
    }
    assert_eq!(mnemonics, expected);
}

#[test]
fn chunk_lines_cover_every_byte() {
    let mut strings = Strings::new();
    let function = compiler::compile("let a = 1;\nlet b = 2;\nprint a + b;", &mut strings)
        .expect("compiles");
    assert_eq!(function.chunk.code.len(), function.chunk.lines.len());
    assert!(function.chunk.lines.contains(&1));
    assert!(function.chunk.lines.contains(&3));
}

#[test]
fn long_constant_pool_switches_encoding() {
    // More than 256 distinct constants forces CONSTANT_LONG for the tail.
    let mut source = String::new();
    for i in 0..300 {
        source.push_str(&format!("print {}.5;", i));
    }
    let mut strings = Strings::new();
    let function = compiler::compile(&source, &mut strings).expect("compiles");
    assert!(function.chunk.constants.len() > 256);
    assert!(function.chunk.code.contains(&(ember::bytecode::OpCode::ConstantLong as u8)));

    // And the program still runs correctly end to end.
    let (result, output) = run(&source);
    assert!(result.is_ok());
    assert!(output.starts_with("0.51.52.5"));
    assert!(output.ends_with("299.5"));
}

#[test]
fn reserved_class_tokens_do_not_parse() {
    let (result, _) = run("class Foo {}");
    assert!(matches!(result, Err(InterpretError::Compile(_))));
    let (result, _) = run("print this;");
    assert!(matches!(result, Err(InterpretError::Compile(_))));
}
