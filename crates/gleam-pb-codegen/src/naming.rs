//! Naming convention utilities for Gleam code generation.
//!
//! Every generated identifier is derived here, so the type builder, the
//! bridge and the printers can never disagree about a name.
//!
//! # Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `Outer.Inner` | [`type_name`] | `OuterInner` |
//! | `OuterInner` | [`function_stem`] | `outer_inner` |
//! | `COLOR_RED` | [`to_constructor_name`] | `ColorRed` |
//! | `demo.shop` | [`module_path`] | `demo/shop` |
//! | `.demo.shop.Item` | [`codec_symbol`] | `demo.shop.Item` |
//!
//! # Reserved namespace
//!
//! Identifiers used internally by generated bridge functions all start with
//! [`RESERVED_PREFIX`]. Schema-derived labels are renamed with a `pb_` prefix
//! when they would enter that namespace, hit a Gleam keyword, shadow one of
//! the baseline module aliases, or are not a valid lowercase Gleam name.

/// Prefix of every bridge-internal identifier
pub const RESERVED_PREFIX: &str = "reserved__";

/// Parameter names of generated bridge and codec functions. Imported module
/// aliases are plain names, so these must stay in the reserved namespace.
pub const MESSAGE_PARAM: &str = "reserved__m";
pub const ENUM_PARAM: &str = "reserved__e";
pub const PRESENCE_PARAM: &str = "reserved__u";
pub const BYTES_PARAM: &str = "reserved__b";

/// Prefix added to labels that cannot be used as-is
pub const LABEL_PREFIX: &str = "pb_";

const GLEAM_KEYWORDS: &[&str] = &[
    "as",
    "assert",
    "auto",
    "case",
    "const",
    "delegate",
    "derive",
    "echo",
    "else",
    "external",
    "fn",
    "if",
    "implement",
    "import",
    "let",
    "macro",
    "opaque",
    "panic",
    "pub",
    "test",
    "todo",
    "type",
    "use",
];

/// Aliases of the modules every generated file imports
pub const BASELINE_ALIASES: &[&str] = &[
    "option", "list", "pair", "dynamic", "atom", "gleam_pb", "string",
];

/// Prelude types a generated type must not shadow
const PRELUDE_TYPES: &[&str] = &[
    "Int",
    "Float",
    "String",
    "Bool",
    "List",
    "Result",
    "Nil",
    "BitString",
    "BitArray",
    "UtfCodepoint",
];

/// Prelude constructors a generated constructor must not shadow
const PRELUDE_CONSTRUCTORS: &[&str] = &["True", "False", "Nil", "Ok", "Error"];

/// Convert a string to PascalCase.
///
/// Handles snake_case and kebab-case; the rest of each word is kept.
///
/// # Examples
///
/// ```
/// use gleam_pb_codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
/// assert_eq!(to_pascal_case("HTTPRequest"), "HTTPRequest");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert PascalCase or camelCase to snake_case.
///
/// Existing underscores are kept; dots and dashes become underscores.
///
/// # Examples
///
/// ```
/// use gleam_pb_codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("OuterInner"), "outer_inner");
/// assert_eq!(to_snake_case("HTTPRequest"), "http_request");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '.' | '-' => out.push('_'),
            c if c.is_ascii_uppercase() => {
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                    _ => false,
                };
                if boundary {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }

    out
}

/// Convert an enumerant to a Gleam constructor name.
///
/// All-caps words are lowered after their first letter, mixed-case words
/// keep their casing.
///
/// # Examples
///
/// ```
/// use gleam_pb_codegen::naming::to_constructor_name;
///
/// assert_eq!(to_constructor_name("COLOR_RED"), "ColorRed");
/// assert_eq!(to_constructor_name("v2Alpha"), "V2Alpha");
/// ```
pub fn to_constructor_name(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let shout = !word.chars().any(|c| c.is_ascii_lowercase());
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) if shout => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Gleam type name for a package-relative proto name (`Outer.Inner`).
pub fn type_name(relative_name: &str) -> String {
    let name: String = relative_name.split('.').map(to_pascal_case).collect();
    if PRELUDE_TYPES.contains(&name.as_str()) || PRELUDE_CONSTRUCTORS.contains(&name.as_str()) {
        format!("Pb{name}")
    } else {
        name
    }
}

/// Function name stem for a generated type (`extract_<stem>`, `show_<stem>`)
pub fn function_stem(type_name: &str) -> String {
    to_snake_case(type_name)
}

/// Constructor name for one enumerant of `enum_type`
pub fn enum_constructor(enum_type: &str, value: &str) -> String {
    let name = to_constructor_name(value);
    if PRELUDE_CONSTRUCTORS.contains(&name.as_str()) {
        format!("{enum_type}{name}")
    } else {
        name
    }
}

/// Record label for a proto field or oneof name.
///
/// # Examples
///
/// ```
/// use gleam_pb_codegen::naming::field_label;
///
/// assert_eq!(field_label("display_name"), "display_name");
/// assert_eq!(field_label("type"), "pb_type");
/// assert_eq!(field_label("reserved__x"), "pb_reserved__x");
/// assert_eq!(field_label("fooBar"), "foo_bar");
/// ```
pub fn field_label(name: &str) -> String {
    let label = if name.chars().any(|c| c.is_ascii_uppercase()) {
        to_snake_case(name)
    } else {
        name.to_string()
    };

    if needs_prefix(&label) {
        format!("{LABEL_PREFIX}{label}")
    } else {
        label
    }
}

fn needs_prefix(label: &str) -> bool {
    label.starts_with(RESERVED_PREFIX)
        || GLEAM_KEYWORDS.contains(&label)
        || BASELINE_ALIASES.contains(&label)
        || !label.starts_with(|c: char| c.is_ascii_lowercase())
}

/// Gleam module path for a proto package (`demo.shop` → `demo/shop`)
pub fn module_path(package: &str) -> String {
    package
        .split('.')
        .filter(|s| !s.is_empty())
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join("/")
}

/// Lower snake form of a proto package, as shown by printers
pub fn package_label(package: &str) -> String {
    module_path(package).replace('/', ".")
}

/// Alias under which a module path is imported (its last segment)
pub fn module_alias(module_path: &str) -> &str {
    module_path.rsplit('/').next().unwrap_or(module_path)
}

/// Symbol the codec uses for a message, from its fully qualified name.
///
/// `protoc-erl -pkgs` names messages by their full proto name, so the leading
/// dot is all that goes.
pub fn codec_symbol(full_name: &str) -> &str {
    full_name.trim_start_matches('.')
}

/// Bridge-internal identifier in the reserved namespace
pub fn reserved(name: &str) -> String {
    format!("{RESERVED_PREFIX}{name}")
}
