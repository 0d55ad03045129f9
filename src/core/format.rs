//! Named-argument template parsing and message rendering
//!
//! A template is ordinary text interspersed with `%`-introduced verbs. A
//! verb may carry a name clause, `%{name}`, naming the argument it
//! consumes; [`rewrite`] strips the clauses and collects the named
//! arguments, producing a conventional positional format string that
//! [`render`] then substitutes values into.
//!
//! Parsing is deliberately infallible: malformed verbs are copied through
//! verbatim and missing arguments become the `MISSING` sentinel, so that
//! logging itself can never fail on a bad template.

use super::event::{Arg, Args, Value};
use std::fmt::Write;

/// Rewrite `template` into a positional format string, appending it to
/// `fmt` and the extracted arguments to `args`.
///
/// Every non-escaped verb consumes one value from `values` in order, even
/// when it has no name clause; exhausted input substitutes
/// [`Value::missing`]. `%%` is copied through and consumes nothing. A
/// trailing lone `%` or an unterminated name clause is copied as-is,
/// consumes nothing, and ends parsing.
pub fn rewrite(template: &str, values: &[Value], fmt: &mut String, args: &mut Args) {
    let mut rest = template;
    let mut values = values.iter();

    loop {
        match rest.find('%') {
            None => {
                fmt.push_str(rest);
                return;
            }
            Some(off) => {
                fmt.push_str(&rest[..=off]);
                rest = &rest[off + 1..];
            }
        }

        // Escaped '%': copy both and keep going.
        if let Some(stripped) = rest.strip_prefix('%') {
            fmt.push('%');
            rest = stripped;
            continue;
        }

        // Trailing lone '%': already copied, consumes nothing.
        if rest.is_empty() {
            return;
        }

        let mut name = "";

        // Copy verb characters until the first ASCII letter ends the verb.
        // A '{' opens a name clause which is stripped from the output.
        loop {
            let Some(c) = rest.chars().next() else {
                break;
            };

            if c == '{' {
                let clause = &rest[1..];
                match clause.find('}') {
                    Some(j) => {
                        name = &clause[..j];
                        rest = &clause[j + 1..];
                    }
                    None => {
                        // Unterminated name clause: copy the remainder
                        // verbatim, emit no argument.
                        fmt.push_str(rest);
                        return;
                    }
                }
            } else {
                fmt.push(c);
                rest = &rest[c.len_utf8()..];
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        }

        let value = values.next().cloned().unwrap_or_else(Value::missing);
        args.push(Arg {
            name: name.to_string(),
            value,
        });
    }
}

/// Render a positional format string into `out`, substituting `values` in
/// order.
///
/// Supports flags (`-`, `0`, `+`, `#`, space), width and precision, and
/// the conversions `s`/`v` (display), `q` (quoted), `d`/`i`, `x`/`X`,
/// `o`, `b` (integers), `f`/`F` (fixed-point), `e`/`E` (scientific),
/// `g` (shortest float) and `t` (bool); any other conversion letter
/// falls back to the display form. The space flag reserves a sign
/// column for non-negative `d`/`i`/`f` output; `+` takes precedence
/// over it. Exhausted values render as `MISSING`. Rendering never
/// fails.
pub fn render(fmt: &str, values: &[Value], out: &mut String) {
    let mut rest = fmt;
    let mut values = values.iter();

    loop {
        match rest.find('%') {
            None => {
                out.push_str(rest);
                return;
            }
            Some(off) => {
                out.push_str(&rest[..off]);
                rest = &rest[off + 1..];
            }
        }

        if let Some(stripped) = rest.strip_prefix('%') {
            out.push('%');
            rest = stripped;
            continue;
        }

        if rest.is_empty() {
            out.push('%');
            return;
        }

        let mut spec = Spec::default();
        loop {
            match rest.as_bytes().first() {
                Some(b'-') => spec.left_align = true,
                Some(b'0') => spec.zero_pad = true,
                Some(b'+') => spec.plus_sign = true,
                Some(b'#') => spec.alt = true,
                Some(b' ') => spec.space_sign = true,
                _ => break,
            }
            rest = &rest[1..];
        }
        spec.width = take_number(&mut rest);
        if let Some(after) = rest.strip_prefix('.') {
            rest = after;
            spec.precision = Some(take_number(&mut rest).unwrap_or(0));
        }

        // The conversion is the first ASCII letter; anything else left in
        // the verb is skipped, mirroring the rewrite pass.
        let mut verb = 'v';
        while let Some(c) = rest.chars().next() {
            rest = &rest[c.len_utf8()..];
            if c.is_ascii_alphabetic() {
                verb = c;
                break;
            }
        }

        match values.next() {
            None => out.push_str("MISSING"),
            Some(value) => {
                let piece = format_value(value, verb, &spec);
                pad(out, &piece, &spec);
            }
        }
    }
}

#[derive(Default)]
struct Spec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    alt: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

fn take_number(rest: &mut &str) -> Option<usize> {
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    let number = rest[..end].parse().ok();
    *rest = &rest[end..];
    number
}

fn format_value(value: &Value, verb: char, spec: &Spec) -> String {
    let mut piece = String::new();

    match verb {
        'd' | 'i' => match integer_of(value) {
            Some(i) if spec.plus_sign => drop(write!(piece, "{:+}", i)),
            Some(i) if spec.space_sign && i >= 0 => drop(write!(piece, " {}", i)),
            Some(i) => drop(write!(piece, "{}", i)),
            None => drop(write!(piece, "{}", value)),
        },
        'x' => match integer_of(value) {
            Some(i) if spec.alt => drop(write!(piece, "{:#x}", i)),
            Some(i) => drop(write!(piece, "{:x}", i)),
            None => drop(write!(piece, "{}", value)),
        },
        'X' => match integer_of(value) {
            Some(i) if spec.alt => drop(write!(piece, "{:#X}", i)),
            Some(i) => drop(write!(piece, "{:X}", i)),
            None => drop(write!(piece, "{}", value)),
        },
        'o' => match integer_of(value) {
            Some(i) if spec.alt => drop(write!(piece, "{:#o}", i)),
            Some(i) => drop(write!(piece, "{:o}", i)),
            None => drop(write!(piece, "{}", value)),
        },
        'b' => match integer_of(value) {
            Some(i) => drop(write!(piece, "{:b}", i)),
            None => drop(write!(piece, "{}", value)),
        },
        'f' | 'F' => match float_of(value) {
            Some(f) => {
                let precision = spec.precision.unwrap_or(6);
                if spec.plus_sign {
                    let _ = write!(piece, "{:+.*}", precision, f);
                } else if spec.space_sign && !f.is_sign_negative() {
                    let _ = write!(piece, " {:.*}", precision, f);
                } else {
                    let _ = write!(piece, "{:.*}", precision, f);
                }
            }
            None => drop(write!(piece, "{}", value)),
        },
        'e' => match float_of(value) {
            Some(f) => drop(write!(piece, "{:e}", f)),
            None => drop(write!(piece, "{}", value)),
        },
        'E' => match float_of(value) {
            Some(f) => drop(write!(piece, "{:E}", f)),
            None => drop(write!(piece, "{}", value)),
        },
        // Shortest representation that round-trips; Rust's default float
        // display already produces it.
        'g' | 'G' => match float_of(value) {
            Some(f) => drop(write!(piece, "{}", f)),
            None => drop(write!(piece, "{}", value)),
        },
        'q' => {
            quote(&value.to_string(), &mut piece);
        }
        _ => {
            // 's', 'v', 't' and anything unrecognized: display form,
            // with precision truncating strings.
            let _ = write!(piece, "{}", value);
            if let (Some(precision), Value::String(_)) = (spec.precision, value) {
                if let Some((end, _)) = piece.char_indices().nth(precision) {
                    piece.truncate(end);
                }
            }
        }
    }

    piece
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Uint(u) => i64::try_from(*u).ok(),
        Value::Float(f) => Some(*f as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Uint(u) => Some(*u as f64),
        _ => None,
    }
}

fn quote(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn pad(out: &mut String, piece: &str, spec: &Spec) {
    let width = spec.width.unwrap_or(0);
    let len = piece.chars().count();

    if len >= width {
        out.push_str(piece);
        return;
    }

    let fill = if spec.zero_pad && !spec.left_align { '0' } else { ' ' };
    if spec.left_align {
        out.push_str(piece);
        for _ in len..width {
            out.push(' ');
        }
    } else {
        for _ in len..width {
            out.push(fill);
        }
        out.push_str(piece);
    }
}
