//! SurrealQL-style text rendering of stored values.

use std::fmt::Write;
use std::time::Duration;

use super::Node;
use crate::engine::is_plain_ident;

pub(super) fn render(node: &Node, pretty: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, node, pretty, 0);
    out
}

fn write_node(out: &mut String, node: &Node, pretty: bool, depth: usize) {
    match node {
        Node::None => out.push_str("NONE"),
        Node::Null => out.push_str("NULL"),
        Node::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Node::Long(v) => {
            let _ = write!(out, "{v}");
        }
        Node::Double(v) => write_double(out, *v),
        Node::Decimal(v) => {
            let _ = write!(out, "{v}dec");
        }
        Node::String(v) => write_quoted(out, v),
        Node::Uuid(v) => {
            let _ = write!(out, "u'{v}'");
        }
        Node::Duration(v) => write_duration(out, *v),
        Node::Bytes(v) => {
            out.push_str("b\"");
            for byte in v {
                let _ = write!(out, "{byte:02X}");
            }
            out.push('"');
        }
        Node::Geometry(v) => {
            let _ = write!(out, "{v}");
        }
        Node::Thing(record) => {
            write_ident(out, &record.table);
            let _ = write!(out, ":{}", record.key);
        }
        Node::Array(cell) => cell.read(|state| {
            if state.items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in state.items.iter().enumerate() {
                separator(out, i, pretty, depth + 1);
                write_node(out, item, pretty, depth + 1);
            }
            close(out, ']', pretty, depth);
        }),
        Node::Object(cell) => cell.read(|state| {
            if state.items.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in state.items.iter().enumerate() {
                separator(out, i, pretty, depth + 1);
                if !pretty && i == 0 {
                    out.push(' ');
                }
                if is_plain_ident(key) {
                    out.push_str(key);
                } else {
                    write_quoted(out, key);
                }
                out.push_str(": ");
                write_node(out, item, pretty, depth + 1);
            }
            if !pretty {
                out.push(' ');
            }
            close(out, '}', pretty, depth);
        }),
    }
}

fn separator(out: &mut String, index: usize, pretty: bool, depth: usize) {
    if index > 0 {
        out.push(',');
        if !pretty {
            out.push(' ');
        }
    }
    if pretty {
        out.push('\n');
        indent(out, depth);
    }
}

fn close(out: &mut String, bracket: char, pretty: bool, depth: usize) {
    if pretty {
        out.push('\n');
        indent(out, depth);
    }
    out.push(bracket);
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_double(out: &mut String, v: f64) {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let _ = write!(out, "{v}f");
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn write_ident(out: &mut String, s: &str) {
    if is_plain_ident(s) {
        out.push_str(s);
    } else {
        let _ = write!(out, "⟨{}⟩", s.replace('⟩', "\\⟩"));
    }
}

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: u64 = 7 * SECS_PER_DAY;
const SECS_PER_YEAR: u64 = 365 * SECS_PER_DAY;

fn write_duration(out: &mut String, d: Duration) {
    if d.is_zero() {
        out.push_str("0ns");
        return;
    }
    let mut secs = d.as_secs();
    for (unit, size) in [
        ("y", SECS_PER_YEAR),
        ("w", SECS_PER_WEEK),
        ("d", SECS_PER_DAY),
        ("h", SECS_PER_HOUR),
        ("m", SECS_PER_MINUTE),
        ("s", 1),
    ] {
        let count = secs / size;
        if count > 0 {
            let _ = write!(out, "{count}{unit}");
            secs %= size;
        }
    }
    let mut nanos = d.subsec_nanos();
    for (unit, size) in [("ms", 1_000_000), ("µs", 1_000), ("ns", 1)] {
        let count = nanos / size;
        if count > 0 {
            let _ = write!(out, "{count}{unit}");
            nanos %= size;
        }
    }
}
