#![allow(non_snake_case)]

use super::*;
use crate::testing::{lower_first, schema};
use crate::typedef::{Constructor, Slot, SlotSource};
use gleam_pb_core::ProtoType;
use gleam_pb_core::fixtures::*;

fn local_ref(name: &str, kind: RefKind) -> TypeRef {
    TypeRef {
        name: name.to_string(),
        stem: naming::function_stem(name),
        module: None,
        symbol: format!("shop.{name}"),
        kind,
    }
}

fn color() -> TypeRef {
    local_ref(
        "Color",
        RefKind::Enum {
            default_constructor: "ColorRed".into(),
        },
    )
}

fn shop_package() -> crate::package::LoweredPackage {
    let schema = schema(vec![
        file("shop.proto", "shop")
            .message(
                message("Item")
                    .field(scalar("name", 1, ProtoType::String))
                    .oneof(
                        "price",
                        vec![
                            scalar("cents", 2, ProtoType::Int64),
                            message_field("tag", 3, ".shop.Item.Tag"),
                        ],
                    )
                    .field(enum_field("color", 4, ".shop.Color").repeated())
                    .nested(message("Tag").field(scalar("label", 1, ProtoType::String))),
            )
            .enumeration(enumeration("Color", &["COLOR_RED", "COLOR_BLUE"])),
    ]);
    lower_first(&schema)
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn Conversion___for_type___scalars_are_direct() {
    assert_eq!(
        Conversion::for_type(&GleamType::Int),
        Conversion::Direct(GleamType::Int)
    );
    assert!(Conversion::for_type(&GleamType::List(Box::new(GleamType::String))).is_direct());
}

#[test]
fn Conversion___for_type___optional_oneof_is_oneof() {
    let oneof = local_ref("ItemPrice", RefKind::OneOf);
    let ty = GleamType::Option(Box::new(GleamType::Ref(oneof.clone())));

    assert_eq!(Conversion::for_type(&ty), Conversion::OneOf(oneof));
}

#[test]
fn Conversion___external_type___per_shape() {
    let optional_int = Conversion::for_type(&GleamType::Option(Box::new(GleamType::Int)));
    let colors = Conversion::for_type(&GleamType::List(Box::new(GleamType::Ref(color()))));
    let oneof = Conversion::OneOf(local_ref("ItemPrice", RefKind::OneOf));

    assert_eq!(optional_int.external_type(), "dynamic.Dynamic");
    assert_eq!(colors.external_type(), "List(atom.Atom)");
    assert_eq!(
        oneof.external_type(),
        "gleam_pb.Undefined(#(atom.Atom, dynamic.Dynamic))"
    );
}

#[test]
fn Conversion___extract_expr___direct_passes_through() {
    let tags = Conversion::for_type(&GleamType::List(Box::new(GleamType::String)));

    assert_eq!(tags.extract_expr("m.tags"), "m.tags");
    assert_eq!(tags.reconstruct_expr("reserved__f0"), "reserved__f0");
}

#[test]
fn Conversion___extract_expr___message_passes_codec_symbol() {
    let item = Conversion::Message(local_ref("Item", RefKind::Message));

    assert_eq!(
        item.extract_expr("x"),
        "extract_item(atom.create_from_string(\"shop.Item\"), x)"
    );
    assert_eq!(
        item.reconstruct_expr("x"),
        "reconstruct_item(gleam_pb.force_a_to_b(x))"
    );
}

#[test]
fn Conversion___extract_expr___optional_message_maps_inside_option() {
    let ty = GleamType::Option(Box::new(GleamType::Ref(local_ref("Item", RefKind::Message))));
    let conversion = Conversion::for_type(&ty);

    assert_eq!(
        conversion.extract_expr("m.item"),
        "gleam_pb.option_to_gpb(option.map(m.item, fn(reserved__v0) { \
         extract_item(atom.create_from_string(\"shop.Item\"), reserved__v0) }))"
    );
    assert_eq!(
        conversion.reconstruct_expr("reserved__f0"),
        "option.map(gleam_pb.undefined_to_option(reserved__f0), fn(reserved__v0) { \
         reconstruct_item(gleam_pb.force_a_to_b(reserved__v0)) })"
    );
}

#[test]
fn Conversion___extract_expr___optional_scalar_uses_undefined() {
    let conversion = Conversion::for_type(&GleamType::Option(Box::new(GleamType::Float)));

    assert_eq!(conversion.extract_expr("m.w"), "gleam_pb.option_to_gpb(m.w)");
    assert_eq!(
        conversion.reconstruct_expr("reserved__f1"),
        "gleam_pb.undefined_to_option(reserved__f1)"
    );
}

#[test]
fn Conversion___extract_expr___map_converts_each_side() {
    let ty = GleamType::Map(Box::new(GleamType::String), Box::new(GleamType::Ref(color())));
    let conversion = Conversion::for_type(&ty);

    assert_eq!(
        conversion.extract_expr("m.by_name"),
        "list.map(m.by_name, fn(reserved__p0) { #(pair.first(reserved__p0), \
         extract_color(pair.second(reserved__p0))) })"
    );
}

#[test]
fn Conversion___extract_expr___nested_lambdas_use_distinct_names() {
    let ty = GleamType::List(Box::new(GleamType::Map(
        Box::new(GleamType::Int),
        Box::new(GleamType::Ref(color())),
    )));

    let expr = Conversion::for_type(&ty).extract_expr("m.grid");

    assert!(expr.contains("fn(reserved__e0)"));
    assert!(expr.contains("fn(reserved__p1)"));
}

#[test]
fn Conversion___reconstruct_dynamic___coerces_non_messages() {
    let cents = Conversion::Direct(GleamType::Int);
    let tag = Conversion::Message(local_ref("ItemTag", RefKind::Message));

    assert_eq!(
        cents.reconstruct_dynamic("reserved__v"),
        "gleam_pb.force_a_to_b(reserved__v)"
    );
    assert_eq!(
        tag.reconstruct_dynamic("reserved__v"),
        "reconstruct_item_tag(gleam_pb.force_a_to_b(reserved__v))"
    );
}

// ============================================================================
// Specs built from the package
// ============================================================================

#[test]
fn message_bridge___slots_mirror_type_slots() {
    let package = shop_package();
    let def = package.type_def("Item").unwrap();

    let BridgeSpec::Message(bridge) = package.bridge("item").unwrap() else {
        panic!("expected a message bridge");
    };

    let bridge_labels: Vec<&str> = bridge.slots.iter().map(|s| s.label.as_str()).collect();
    let type_labels: Vec<&str> = def.slots().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(bridge_labels, type_labels);
    assert_eq!(bridge.symbol, "shop.Item");
    assert!(bridge.codec_wrappers);
}

#[test]
fn message_bridge___nested_message___has_no_codec_wrappers() {
    let package = shop_package();

    let BridgeSpec::Message(bridge) = package.bridge("item_tag").unwrap() else {
        panic!("expected a message bridge");
    };

    assert!(!bridge.codec_wrappers);
    assert_eq!(bridge.symbol, "shop.Item.Tag");
}

#[test]
fn MessageBridge___external_tuple___lists_codec_types_in_order() {
    let package = shop_package();

    let BridgeSpec::Message(bridge) = package.bridge("item").unwrap() else {
        panic!("expected a message bridge");
    };

    assert_eq!(
        bridge.external_tuple(),
        "#(atom.Atom, String, gleam_pb.Undefined(#(atom.Atom, dynamic.Dynamic)), List(atom.Atom))"
    );
}

#[test]
fn oneof_bridge___fallback_is_last_member() {
    let package = shop_package();

    let BridgeSpec::OneOf(bridge) = package.bridge("item_price").unwrap() else {
        panic!("expected a oneof bridge");
    };

    assert_eq!(bridge.fallback, UnverifiedShape { member: 1 });
    assert_eq!(bridge.fallback_member().constructor, "ItemPriceTag");
    assert_eq!(bridge.fallback_member().tag, "tag");
}

#[test]
fn oneof_bridge___member_without_slot___is_invalid_schema() {
    let def = TypeDef {
        name: "Broken".into(),
        stem: "broken".into(),
        kind: EntityKind::OneOf,
        source: ".x.Msg.broken".into(),
        symbol: String::new(),
        constructors: vec![Constructor {
            name: "BrokenA".into(),
            symbol: Some("a".into()),
            slots: Vec::new(),
        }],
    };

    assert!(matches!(oneof_bridge(&def), Err(GenError::InvalidSchema(_))));
}

#[test]
fn enum_bridge___wrong_kind___is_invalid_schema() {
    let def = TypeDef {
        name: "Item".into(),
        stem: "item".into(),
        kind: EntityKind::Message,
        source: ".x.Item".into(),
        symbol: "x.Item".into(),
        constructors: vec![Constructor {
            name: "Item".into(),
            symbol: None,
            slots: vec![Slot {
                label: "n".into(),
                ty: GleamType::Int,
                source: SlotSource::Field("n".into()),
            }],
        }],
    };

    assert!(matches!(enum_bridge(&def), Err(GenError::InvalidSchema(_))));
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn BridgeSpec___to_record___enum_reconstruct_panics_on_unknown_atom() {
    let package = shop_package();

    let BridgeRecord::Enum {
        extract_arms,
        symbol_bindings,
        reconstruct_arms,
        ..
    } = package.bridge("color").unwrap().to_record()
    else {
        panic!("expected an enum record");
    };

    assert_eq!(
        extract_arms[0],
        "ColorRed -> atom.create_from_string(\"COLOR_RED\")"
    );
    assert_eq!(
        symbol_bindings[1],
        "let reserved__symbol_1 = atom.create_from_string(\"COLOR_BLUE\")"
    );
    assert_eq!(
        reconstruct_arms,
        vec![
            "reserved__s if reserved__s == reserved__symbol_0 -> ColorRed",
            "reserved__s if reserved__s == reserved__symbol_1 -> ColorBlue",
            "_ -> panic",
        ]
    );
}

#[test]
fn BridgeSpec___to_record___oneof_arms_and_fallback() {
    let package = shop_package();

    let BridgeRecord::OneOf {
        entity,
        dispatch,
        extract_arms,
        dispatch_arms,
        fallback_arm,
        ..
    } = package.bridge("item_price").unwrap().to_record()
    else {
        panic!("expected a oneof record");
    };

    assert_eq!(entity, "shop.Item.price");
    assert_eq!(dispatch, "reserved__dispatch_item_price");
    assert_eq!(
        extract_arms[0],
        "ItemPriceCents(reserved__v) -> #(atom.create_from_string(\"cents\"), reserved__v) |> dynamic.from"
    );
    assert_eq!(
        dispatch_arms[0],
        "#(reserved__t, reserved__v) if reserved__t == reserved__tag_0 -> \
         ItemPriceCents(gleam_pb.force_a_to_b(reserved__v))"
    );
    assert_eq!(
        fallback_arm,
        "#(_, reserved__v) -> ItemPriceTag(reconstruct_item_tag(gleam_pb.force_a_to_b(reserved__v)))"
    );
}

#[test]
fn BridgeSpec___to_record___message_fields_in_slot_order() {
    let package = shop_package();

    let BridgeRecord::Message {
        entity,
        extract_fields,
        bindings,
        reconstruct_args,
        codec,
        ..
    } = package.bridge("item").unwrap().to_record()
    else {
        panic!("expected a message record");
    };

    assert_eq!(entity, "shop.Item");
    assert_eq!(
        extract_fields,
        vec![
            "reserved__m.name".to_string(),
            "gleam_pb.option_to_gpb(option.map(reserved__m.price, extract_item_price))".to_string(),
            "list.map(reserved__m.color, fn(reserved__e0) { extract_color(reserved__e0) })".to_string(),
        ]
    );
    assert_eq!(bindings, vec!["reserved__f0", "reserved__f1", "reserved__f2"]);
    assert_eq!(reconstruct_args[1], "reconstruct_item_price(reserved__f1)");
    assert_eq!(
        codec,
        Some(CodecRecord {
            symbol: "shop.Item".into(),
            decode_external: "reserved__decode_item".into(),
        })
    );
}
