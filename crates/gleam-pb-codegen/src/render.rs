//! Gleam source rendering.
//!
//! Lays out a [`PackageRecord`] as one Gleam module. Section order is fixed:
//! imports, header, types, show helpers, printers, enum printers, default
//! generators, then the bridge functions of each entity.

use crate::record::{
    BridgeRecord, CodecRecord, EnumPrinterRecord, GeneratorRecord, PackageRecord, PrinterRecord,
    TypeRecord,
};
use crate::naming::{BYTES_PARAM, ENUM_PARAM, MESSAGE_PARAM, PRESENCE_PARAM};
use crate::support::CODEC_MODULE_NAME;

const INDENT: &str = "  ";

const SHOW_HELPERS: &str = r#"// printers

fn primitive_show_int(a: Int) -> String {
  string.inspect(a)
}

fn primitive_show_float(a: Float) -> String {
  string.inspect(a)
}

fn primitive_show_bool(a: Bool) -> String {
  string.inspect(a)
}

fn primitive_show_string(a: String) -> String {
  string.append("\"", string.append(a, "\""))
}

fn primitive_show_bit_string(a: BitString) -> String {
  string.inspect(a)
}

fn primitive_show_inspect(a) -> String {
  string.inspect(a)
}
"#;

/// Render one package module
pub fn render_package(record: &PackageRecord) -> String {
    let mut code = String::new();

    for import in &record.imports {
        code.push_str(&format!("import {import}\n"));
    }
    code.push('\n');

    code.push_str(&format!(
        "/// {} package types generated by gleam_pb\n/// DO NOT EDIT\n",
        record.label
    ));

    for ty in &record.types {
        code.push('\n');
        render_type(&mut code, ty);
    }

    code.push('\n');
    code.push_str(SHOW_HELPERS);

    for printer in &record.printers {
        code.push('\n');
        render_printer(&mut code, printer);
    }

    for printer in &record.enum_printers {
        code.push('\n');
        render_enum_printer(&mut code, printer);
    }

    code.push_str("\n// generators\n");
    for generator in &record.generators {
        code.push('\n');
        render_generator(&mut code, generator);
    }

    for bridge in &record.bridges {
        code.push('\n');
        render_bridge(&mut code, bridge);
    }

    code
}

fn render_type(code: &mut String, ty: &TypeRecord) {
    code.push_str(&format!("pub type {} {{\n", ty.name));
    for ctor in &ty.constructors {
        code.push_str(&format!("{INDENT}{ctor}\n"));
    }
    code.push_str("}\n");
}

fn render_printer(code: &mut String, printer: &PrinterRecord) {
    code.push_str(&format!(
        "pub fn show_{}(a: {}) -> List(String) {{\n",
        printer.stem, printer.type_name
    ));
    code.push_str(&format!("{INDENT}[\n"));
    code.push_str(&format!("{INDENT}{INDENT}\"{}\",\n", printer.label));
    code.push_str(&format!("{INDENT}{INDENT}\"(\",\n"));
    for field in &printer.fields {
        code.push_str(&format!("{INDENT}{INDENT}{field},\n"));
        code.push_str(&format!("{INDENT}{INDENT}\", \",\n"));
    }
    code.push_str(&format!("{INDENT}{INDENT}\")\",\n"));
    code.push_str(&format!("{INDENT}]\n"));
    code.push_str("}\n");
}

fn render_enum_printer(code: &mut String, printer: &EnumPrinterRecord) {
    code.push_str(&format!(
        "pub fn show_{}(a: {}) -> String {{\n",
        printer.stem, printer.type_name
    ));
    code.push_str(&format!("{INDENT}case a {{\n"));
    for (ctor, literal) in &printer.arms {
        code.push_str(&format!("{INDENT}{INDENT}{ctor} -> \"{literal}\"\n"));
    }
    code.push_str(&format!("{INDENT}}}\n"));
    code.push_str("}\n");
}

fn render_generator(code: &mut String, generator: &GeneratorRecord) {
    code.push_str(&format!(
        "pub fn default_{}() -> {} {{\n",
        generator.stem, generator.type_name
    ));
    code.push_str(&format!(
        "{INDENT}{}\n",
        call(&generator.type_name, &generator.args)
    ));
    code.push_str("}\n");
}

fn call(constructor: &str, args: &[String]) -> String {
    if args.is_empty() {
        constructor.to_string()
    } else {
        format!("{constructor}({})", args.join(", "))
    }
}

fn render_bridge(code: &mut String, bridge: &BridgeRecord) {
    match bridge {
        BridgeRecord::Enum {
            entity,
            stem,
            type_name,
            extract_arms,
            symbol_bindings,
            reconstruct_arms,
        } => {
            code.push_str(&format!("// --- {entity} ---\n\n"));

            code.push_str(&format!(
                "pub fn extract_{stem}({ENUM_PARAM}: {type_name}) -> atom.Atom {{\n"
            ));
            push_case(code, ENUM_PARAM, extract_arms);
            code.push_str("}\n\n");

            code.push_str(&format!(
                "pub fn reconstruct_{stem}({ENUM_PARAM}: atom.Atom) -> {type_name} {{\n"
            ));
            push_lines(code, symbol_bindings);
            code.push('\n');
            push_case(code, ENUM_PARAM, reconstruct_arms);
            code.push_str("}\n");
        }
        BridgeRecord::OneOf {
            entity,
            stem,
            type_name,
            dispatch,
            extract_arms,
            tag_bindings,
            dispatch_arms,
            fallback_arm,
        } => {
            code.push_str(&format!("// --- {entity} ---\n\n"));

            code.push_str(&format!(
                "pub fn extract_{stem}({MESSAGE_PARAM}: {type_name}) -> dynamic.Dynamic {{\n"
            ));
            push_case(code, MESSAGE_PARAM, extract_arms);
            code.push_str("}\n\n");

            code.push_str(&format!(
                "pub fn reconstruct_{stem}({PRESENCE_PARAM}: gleam_pb.Undefined(#(atom.Atom, dynamic.Dynamic))) -> option.Option({type_name}) {{\n"
            ));
            let arms = vec![
                "gleam_pb.Undefined -> option.None".to_string(),
                format!("gleam_pb.Wrapper({MESSAGE_PARAM}) -> {MESSAGE_PARAM} |> {dispatch} |> option.Some"),
                format!(
                    "{MESSAGE_PARAM} -> {MESSAGE_PARAM} |> gleam_pb.force_a_to_b |> {dispatch} |> option.Some"
                ),
            ];
            push_case(code, PRESENCE_PARAM, &arms);
            code.push_str("}\n\n");

            code.push_str(&format!(
                "fn {dispatch}({MESSAGE_PARAM}: #(atom.Atom, dynamic.Dynamic)) -> {type_name} {{\n"
            ));
            push_lines(code, tag_bindings);
            code.push('\n');
            code.push_str(&format!("{INDENT}case {MESSAGE_PARAM} {{\n"));
            for arm in dispatch_arms {
                code.push_str(&format!("{INDENT}{INDENT}{arm}\n"));
            }
            code.push_str(&format!(
                "{INDENT}{INDENT}// unverified shape: unknown tag, payload taken as the last member\n"
            ));
            code.push_str(&format!("{INDENT}{INDENT}{fallback_arm}\n"));
            code.push_str(&format!("{INDENT}}}\n"));
            code.push_str("}\n");
        }
        BridgeRecord::Message {
            entity,
            stem,
            type_name,
            extract_fields,
            external_tuple,
            bindings,
            reconstruct_args,
            codec,
        } => {
            code.push_str(&format!("// --- {entity} ---\n\n"));

            code.push_str(&format!(
                "pub fn extract_{stem}(reserved__struct_name: atom.Atom, m: {type_name}) -> dynamic.Dynamic {{\n"
            ));
            code.push_str(&format!("{INDENT}#(\n"));
            code.push_str(&format!("{INDENT}{INDENT}reserved__struct_name,\n"));
            for field in extract_fields {
                code.push_str(&format!("{INDENT}{INDENT}{field},\n"));
            }
            code.push_str(&format!("{INDENT})\n"));
            code.push_str(&format!("{INDENT}|> dynamic.from\n"));
            code.push_str("}\n\n");

            code.push_str(&format!(
                "pub fn reconstruct_{stem}({MESSAGE_PARAM}: {external_tuple}) -> {type_name} {{\n"
            ));
            let mut pattern = vec!["_".to_string()];
            pattern.extend(bindings.iter().cloned());
            code.push_str(&format!("{INDENT}let #({}) = {MESSAGE_PARAM}\n", pattern.join(", ")));
            code.push_str(&format!("{INDENT}{}\n", call(type_name, reconstruct_args)));
            code.push_str("}\n");

            if let Some(codec) = codec {
                code.push('\n');
                render_codec(code, stem, type_name, external_tuple, codec);
            }
        }
    }
}

fn render_codec(
    code: &mut String,
    stem: &str,
    type_name: &str,
    external_tuple: &str,
    codec: &CodecRecord,
) {
    let name = format!("atom.create_from_string(\"{}\")", codec.symbol);
    let decode = &codec.decode_external;

    code.push_str(&format!(
        "pub fn encode_{stem}({MESSAGE_PARAM}: {type_name}) -> BitString {{\n"
    ));
    code.push_str(&format!("{INDENT}let reserved__name = {name}\n\n"));
    code.push_str(&format!("{INDENT}extract_{stem}(reserved__name, {MESSAGE_PARAM})\n"));
    code.push_str(&format!("{INDENT}|> gleam_pb.encode(reserved__name)\n"));
    code.push_str("}\n\n");

    code.push_str(&format!(
        "external fn {decode}(BitString, atom.Atom) -> {external_tuple} =\n"
    ));
    code.push_str(&format!(
        "{INDENT}\"{CODEC_MODULE_NAME}\" \"decode_msg\"\n\n"
    ));

    code.push_str(&format!(
        "pub fn decode_{stem}({BYTES_PARAM}: BitString) -> {type_name} {{\n"
    ));
    code.push_str(&format!("{INDENT}let reserved__name = {name}\n\n"));
    code.push_str(&format!("{INDENT}{decode}({BYTES_PARAM}, reserved__name)\n"));
    code.push_str(&format!("{INDENT}|> reconstruct_{stem}\n"));
    code.push_str("}\n");
}

fn push_lines(code: &mut String, lines: &[String]) {
    for line in lines {
        code.push_str(&format!("{INDENT}{line}\n"));
    }
}

fn push_case(code: &mut String, subject: &str, arms: &[String]) {
    code.push_str(&format!("{INDENT}case {subject} {{\n"));
    for arm in arms {
        code.push_str(&format!("{INDENT}{INDENT}{arm}\n"));
    }
    code.push_str(&format!("{INDENT}}}\n"));
}
