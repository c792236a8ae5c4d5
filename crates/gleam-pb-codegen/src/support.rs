//! The `gleam_pb` support module, emitted once per compilation.

/// Module name, also the alias generated code uses for it
pub const SUPPORT_MODULE_NAME: &str = "gleam_pb";

/// Erlang module produced by `protoc-erl -modname`
pub const CODEC_MODULE_NAME: &str = "gleam_gpb";

/// Source of `gleam_pb.gleam`
pub const SUPPORT_MODULE: &str = r#"import gleam/dynamic
import gleam/option
import gleam/erlang/atom

// helper funcs and types

pub type Undefined(a) {
  Undefined
  Wrapper(a)
}

pub fn encode(m: dynamic.Dynamic, name: atom.Atom) -> BitString {
  encode_msg(m, name, [True])
}

pub fn option_to_gpb(o: option.Option(a)) -> dynamic.Dynamic {
  case o {
    option.Some(v) -> v |> dynamic.from
    option.None -> Undefined |> dynamic.from
  }
}

pub fn wrapper_to_option(w: Undefined(a)) -> option.Option(a) {
  case w {
    Undefined -> option.None
    Wrapper(v) -> v |> option.Some
  }
}

pub fn undefined_to_option(a: a) -> option.Option(b) {
  case dynamic.from(a) == dynamic.from(Undefined) {
    True -> option.None
    False -> a |> force_a_to_b |> option.Some
  }
}

pub fn force_a_to_b(a: a) -> b {
  a |> dynamic.from |> dynamic.unsafe_coerce
}

external fn encode_msg(dynamic.Dynamic, atom.Atom, List(Bool)) -> BitString =
  "gleam_gpb" "encode_msg"
"#;
