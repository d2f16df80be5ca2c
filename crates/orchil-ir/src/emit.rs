use std::fmt::Write;

use crate::record::*;

/// Render a converted test in the declarative record format.
///
/// The layout is stable: header fields, the sorted symbolic list, one
/// `[thread.N]` section per thread, then the `[final]` section. Downstream
/// consumers rely on the exact field names, quoting, and section order.
pub fn emit_record(test: &ConvertedTest) -> String {
    let mut out = String::new();
    write_header(&mut out, test);
    for thread in &test.threads {
        write_thread(&mut out, test, thread);
    }
    write_final(&mut out, &test.final_state);
    out
}

fn write_header(out: &mut String, test: &ConvertedTest) {
    writeln!(out, "arch = \"{}\"", escape_str(&test.arch)).unwrap();
    writeln!(out, "name = \"{}\"", escape_str(&test.name)).unwrap();
    for (key, value) in &test.info {
        writeln!(out, "{key} = \"{}\"", escape_str(value)).unwrap();
    }
    let symbolic: Vec<String> = test
        .initial
        .sorted_symbolic()
        .iter()
        .map(|name| format!("\"{}\"", escape_str(name)))
        .collect();
    writeln!(out, "symbolic = [{}]", symbolic.join(", ")).unwrap();
}

fn write_thread(out: &mut String, test: &ConvertedTest, thread: &ThreadCode) {
    writeln!(out).unwrap();
    writeln!(out, "[thread.{}]", thread.thread).unwrap();

    let inits: Vec<String> = test
        .initial
        .thread_registers(thread.thread)
        .map(|r| format!("{} = \"{}\"", r.reg, escape_str(&r.value.to_string())))
        .collect();
    if inits.is_empty() {
        writeln!(out, "init = {{}}").unwrap();
    } else {
        writeln!(out, "init = {{ {} }}", inits.join(", ")).unwrap();
    }

    writeln!(out, "code = \"\"\"").unwrap();
    for line in &thread.code {
        match line {
            CodeLine::Label(label) => writeln!(out, "{label}:").unwrap(),
            CodeLine::Instr(text) => writeln!(out, "\t{}", escape_str(text)).unwrap(),
        }
    }
    writeln!(out, "\"\"\"").unwrap();
}

fn write_final(out: &mut String, final_state: &CompiledFinal) {
    writeln!(out).unwrap();
    writeln!(out, "[final]").unwrap();
    writeln!(out, "expect = \"{}\"", final_state.expect).unwrap();
    writeln!(
        out,
        "assertion = \"{}\"",
        escape_str(&final_state.assertion.to_string())
    )
    .unwrap();
}

/// Escape a string for embedding in a double-quoted record value.
fn escape_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
