//! Display text of values
//!
//! Values print the way a debugger prints them:
//! - chars as `65 'A'`, bools as `true`/`false`, enums by enumerator name
//! - pointers as `(struct node *) 0x601000`; `char *` with the string it
//!   points to; function pointers with the function name
//! - structs as `{<base> = {...}, a = 1, next = 0x0}`
//! - arrays as `{1, 2, 3}`, runs of identical elements as `0 <repeats 16 times>`,
//!   char arrays as strings
//! - references as `(int &) @0x601000: 5`
//!
//! The pointer and reference type prefix is shown only for the outermost
//! value, not for members and elements.

use super::value::ImageValue;
use crate::explore::{InspectError, ValueHandle};
use crate::memory::compound_members;
use crate::memory::value::{Address, Scalar};
use crate::parser::ast::Type;
use std::fmt::Write;

/// Most array elements or string characters shown before eliding with `...`
pub const RENDER_ELEMENT_LIMIT: usize = 200;

/// Shortest run of identical elements collapsed into `<repeats N times>`
const REPEAT_THRESHOLD: usize = 10;

pub(crate) fn render_value(value: &ImageValue) -> Result<String, InspectError> {
    let mut out = String::new();
    write_value(&mut out, value, true)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &ImageValue, top_level: bool) -> Result<(), InspectError> {
    let image = value.image();
    match value.type_ref().resolved() {
        Type::Void => out.push_str("void"),
        Type::Bool => match value.scalar()?.as_i64() {
            0 => out.push_str("false"),
            1 => out.push_str("true"),
            n => {
                let _ = write!(out, "{}", n);
            }
        },
        Type::Char { .. } => {
            let n = value.scalar()?.as_i64();
            let _ = write!(out, "{} '{}'", n, escape_char(n as u8, '\''));
        }
        Type::Int { .. } => match value.scalar()? {
            Scalar::UInt(n) => {
                let _ = write!(out, "{}", n);
            }
            other => {
                let _ = write!(out, "{}", other.as_i64());
            }
        },
        Type::Float => out.push_str(&format_float(value.scalar()?.as_f64(), true)),
        Type::Double => out.push_str(&format_float(value.scalar()?.as_f64(), false)),
        Type::Enum(tag) => {
            let n = value.scalar()?.as_i64();
            match image.defs().enumerator_name(&tag, n) {
                Some(name) => out.push_str(name),
                None => {
                    let _ = write!(out, "{}", n);
                }
            }
        }
        Type::Pointer(target) => write_pointer(out, value, &target, top_level)?,
        Type::Reference(_) => {
            let addr = value.scalar()?.as_bits();
            if top_level {
                let _ = write!(out, "({}) ", value.type_ref());
            }
            let _ = write!(out, "@0x{:x}: ", addr);
            write_value(out, &value.referenced_value()?, false)?;
        }
        Type::Array(elem, len) => write_array(out, value, &elem, len)?,
        Type::Struct(tag) | Type::Union(tag) => write_compound(out, value, &tag)?,
        Type::Function { .. } => {
            let addr = value.address().unwrap_or(0);
            let _ = write!(out, "{{{}}} 0x{:x}", value.type_ref(), addr);
            if let Some(name) = image.function_at(addr) {
                let _ = write!(out, " <{}>", name);
            }
        }
        Type::Named(name) => return Err(InspectError::UnknownType { name }),
    }
    Ok(())
}

fn write_pointer(
    out: &mut String,
    value: &ImageValue,
    target: &Type,
    top_level: bool,
) -> Result<(), InspectError> {
    let image = value.image();
    let addr = value.scalar()?.as_bits();
    let target = image.defs().strip_typedefs(target);

    match target {
        Type::Char { .. } if addr != 0 => {
            let _ = write!(out, "0x{:x} ", addr);
            match read_c_string(value, addr) {
                Ok(text) => out.push_str(&text),
                Err(err) => {
                    let _ = write!(out, "<error: {}>", err);
                }
            }
        }
        _ => {
            if top_level {
                let _ = write!(out, "({}) ", value.type_ref());
            }
            let _ = write!(out, "0x{:x}", addr);
            if let Some(name) = image.function_at(addr) {
                let _ = write!(out, " <{}>", name);
            }
        }
    }
    Ok(())
}

/// Read the NUL-terminated string at `addr`, quoted and escaped
fn read_c_string(value: &ImageValue, addr: Address) -> Result<String, InspectError> {
    let image = value.image();
    let mut bytes = Vec::new();
    let mut truncated = false;
    loop {
        let byte = image.read_memory(addr + bytes.len() as u64, 1)?[0];
        if byte == 0 {
            break;
        }
        if bytes.len() == RENDER_ELEMENT_LIMIT {
            truncated = true;
            break;
        }
        bytes.push(byte);
    }
    Ok(quote(&bytes, truncated))
}

fn write_array(
    out: &mut String,
    value: &ImageValue,
    elem: &Type,
    len: Option<usize>,
) -> Result<(), InspectError> {
    let len = len.unwrap_or(0);
    let image = value.image();

    if matches!(image.defs().strip_typedefs(elem), Type::Char { .. }) {
        let bytes = value.bytes()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let shown = end.min(RENDER_ELEMENT_LIMIT);
        out.push_str(&quote(&bytes[..shown], end > shown));
        return Ok(());
    }

    // Force one read of the whole array so an unreadable tail fails as a unit
    value.bytes()?;

    let shown = len.min(RENDER_ELEMENT_LIMIT);
    let mut elements = Vec::with_capacity(shown);
    for i in 0..shown {
        let mut text = String::new();
        write_value(&mut text, &value.index(i as i64)?, false)?;
        elements.push(text);
    }

    let mut items = Vec::new();
    let mut i = 0;
    while i < elements.len() {
        let run = elements[i..]
            .iter()
            .take_while(|e| **e == elements[i])
            .count();
        if run >= REPEAT_THRESHOLD {
            items.push(format!("{} <repeats {} times>", elements[i], run));
            i += run;
        } else {
            items.push(elements[i].clone());
            i += 1;
        }
    }
    if len > shown {
        items.push("...".to_string());
    }

    let _ = write!(out, "{{{}}}", items.join(", "));
    Ok(())
}

fn write_compound(out: &mut String, value: &ImageValue, tag: &str) -> Result<(), InspectError> {
    let slots = compound_members(tag, value.image().defs());
    if slots.is_empty() {
        out.push_str("{<No data fields>}");
        return Ok(());
    }

    out.push('{');
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if slot.is_base_class {
            let _ = write!(out, "<{}> = ", slot.name);
            write_value(out, &value.cast(slot.ty.clone())?, false)?;
        } else {
            let _ = write!(out, "{} = ", slot.name);
            write_value(out, &value.member(&slot.name)?, false)?;
        }
    }
    out.push('}');
    Ok(())
}

fn format_float(f: f64, single: bool) -> String {
    if f.is_nan() {
        return if f.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if f.is_infinite() {
        return if f < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if single {
        (f as f32).to_string()
    } else {
        f.to_string()
    }
}

/// Escape one byte for display inside `delimiter` quotes
fn escape_char(byte: u8, delimiter: char) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        b'\\' => "\\\\".to_string(),
        b if b as char == delimiter => format!("\\{}", delimiter),
        b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
        b => format!("\\{:03o}", b),
    }
}

fn quote(bytes: &[u8], truncated: bool) -> String {
    let body: String = bytes.iter().map(|&b| escape_char(b, '"')).collect();
    if truncated {
        format!("\"{}\"...", body)
    } else {
        format!("\"{}\"", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_char() {
        assert_eq!(escape_char(b'A', '\''), "A");
        assert_eq!(escape_char(0, '\''), "\\000");
        assert_eq!(escape_char(b'\n', '\''), "\\n");
        assert_eq!(escape_char(b'\'', '\''), "\\'");
        assert_eq!(escape_char(b'\'', '"'), "'");
        assert_eq!(escape_char(0xff, '\''), "\\377");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(b"say \"hi\"", false), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(b"abc", true), "\"abc\"...");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(2.5, false), "2.5");
        assert_eq!(format_float(3.0, false), "3");
        assert_eq!(format_float(0.1f32 as f64, true), "0.1");
        assert_eq!(format_float(f64::INFINITY, false), "inf");
    }
}
