//! Parser tests: grammar coverage, symbol table effects, constant folding
//! and error recovery.

use super::*;
use crate::ast::*;

/// Parse a source string, returning the unit and the parser for
/// diagnostics and symbol table inspection.
fn parse(source: &str) -> (TranslationUnit, Parser<'_>) {
    let mut parser = Parser::new(source, "test.idl");
    let unit = parser.parse();
    (unit, parser)
}

fn parse_ok(source: &str) -> TranslationUnit {
    let (unit, parser) = parse(source);
    assert!(
        !parser.has_errors(),
        "unexpected errors: {:?}",
        parser.diagnostics()
    );
    unit
}

fn first_const(unit: &TranslationUnit) -> &ConstNode {
    match &unit.definitions[0] {
        Definition::Const(node) => node,
        other => panic!("expected const, got {:?}", other),
    }
}

// ============================================================
// Definitions
// ============================================================

#[test]
fn empty_unit() {
    let unit = parse_ok("");
    assert!(unit.definitions.is_empty());
    assert_eq!(unit.filename, "test.idl");
}

#[test]
fn module_with_nested_definitions() {
    let unit = parse_ok("module M { struct S { long x; }; enum E { A, B }; };");
    let Definition::Module(module) = &unit.definitions[0] else {
        panic!("expected module");
    };
    assert_eq!(module.name, "M");
    assert_eq!(module.definitions.len(), 2);
}

#[test]
fn reopened_module_is_not_a_duplicate() {
    let (unit, parser) = parse("module M { struct A { long x; }; }; module M { struct B { long y; }; };");
    assert!(!parser.has_errors(), "{:?}", parser.diagnostics());
    assert_eq!(unit.definitions.len(), 2);
    // Both openings share one scope.
    assert!(parser.symbol_table().lookup_qualified("M::A").is_some());
    assert!(parser.symbol_table().lookup_qualified("M::B").is_some());
}

#[test]
fn forward_interface_then_definition() {
    let (unit, parser) = parse("interface I; interface I { void f(); };");
    assert!(!parser.has_errors(), "{:?}", parser.diagnostics());

    let Definition::Interface(fwd) = &unit.definitions[0] else {
        panic!("expected interface");
    };
    assert!(fwd.is_forward);

    let Definition::Interface(full) = &unit.definitions[1] else {
        panic!("expected interface");
    };
    assert!(!full.is_forward);
    assert_eq!(full.contents.len(), 1);
}

#[test]
fn forward_struct() {
    let unit = parse_ok("struct Node; struct Node { long value; };");
    let Definition::Struct(fwd) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    assert!(fwd.is_forward);
}

#[test]
fn duplicate_definition_is_an_error() {
    let (_, parser) = parse("struct S { long x; }; enum S { A };");
    assert!(parser.has_errors());
    let messages: Vec<_> = parser.diagnostics().iter().map(|d| d.message.clone()).collect();
    assert!(
        messages.iter().any(|m| m.contains("Duplicate definition of 'S'")),
        "{:?}",
        messages
    );
}

#[test]
fn interface_modifiers() {
    let unit = parse_ok("abstract interface A { }; local interface L { };");
    let Definition::Interface(a) = &unit.definitions[0] else {
        panic!();
    };
    assert!(a.is_abstract && !a.is_local);
    let Definition::Interface(l) = &unit.definitions[1] else {
        panic!();
    };
    assert!(l.is_local && !l.is_abstract);
}

#[test]
fn abstract_on_module_is_reported() {
    let (_, parser) = parse("abstract module M { };");
    assert!(parser.has_errors());
}

#[test]
fn abstract_on_struct_is_reported() {
    let (_, parser) = parse("abstract struct S { long x; };");
    assert!(parser.has_errors());
}

#[test]
fn interface_inheritance_keeps_order_and_qualification() {
    let unit = parse_ok(
        "interface A { }; module M { interface B { }; }; interface C : ::M::B, A { };",
    );
    let Definition::Interface(c) = &unit.definitions[2] else {
        panic!();
    };
    assert_eq!(c.bases, vec!["::M::B".to_string(), "A".to_string()]);
}

#[test]
fn interface_members() {
    let unit = parse_ok(
        "interface I {\n\
         readonly attribute long count;\n\
         attribute string name;\n\
         oneway void notify(in string msg);\n\
         long add(in long a, inout long b, out long c) raises (Overflow, ::M::Bad);\n\
         struct Nested { long x; };\n\
         };",
    );
    let Definition::Interface(iface) = &unit.definitions[0] else {
        panic!();
    };
    assert_eq!(iface.contents.len(), 5);

    let InterfaceMember::Attribute(count) = &iface.contents[0] else {
        panic!("expected attribute");
    };
    assert!(count.is_readonly);

    let InterfaceMember::Attribute(name) = &iface.contents[1] else {
        panic!("expected attribute");
    };
    assert!(!name.is_readonly);

    let InterfaceMember::Operation(notify) = &iface.contents[2] else {
        panic!("expected operation");
    };
    assert!(notify.is_oneway);
    assert_eq!(notify.parameters.len(), 1);
    assert_eq!(notify.parameters[0].direction, ParamDirection::In);

    let InterfaceMember::Operation(add) = &iface.contents[3] else {
        panic!("expected operation");
    };
    assert!(!add.is_oneway);
    assert_eq!(add.parameters.len(), 3);
    assert_eq!(add.parameters[1].direction, ParamDirection::InOut);
    assert_eq!(add.parameters[2].direction, ParamDirection::Out);
    assert_eq!(add.raises, vec!["Overflow".to_string(), "::M::Bad".to_string()]);

    assert!(matches!(&iface.contents[4], InterfaceMember::Nested(Definition::Struct(_))));
}

#[test]
fn readonly_on_operation_is_reported() {
    let (_, parser) = parse("interface I { readonly void f(); };");
    assert!(parser.has_errors());
}

#[test]
fn oneway_on_attribute_is_reported() {
    let (_, parser) = parse("interface I { oneway attribute long x; };");
    assert!(parser.has_errors());
}

#[test]
fn struct_member_declarators() {
    let unit = parse_ok("struct S { long a, b; octet raw[16]; };");
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!();
    };
    assert_eq!(s.members.len(), 3);
    assert_eq!(s.members[0].name, "a");
    assert_eq!(s.members[1].name, "b");
    let TypeNode::Array { dimensions, .. } = &s.members[2].ty else {
        panic!("expected array type");
    };
    assert_eq!(dimensions, &vec![16]);
}

#[test]
fn union_cases_and_labels() {
    let unit = parse_ok(
        "union U switch (long) { case 1: string a; case 2: case 3: long b; default: boolean c; };",
    );
    let Definition::Union(u) = &unit.definitions[0] else {
        panic!();
    };
    assert!(matches!(
        u.discriminator,
        TypeNode::Basic { ty: BasicType::Long, .. }
    ));
    assert_eq!(u.cases.len(), 3);
    assert_eq!(u.cases[0].labels, vec![CaseLabel::Value(ConstValue::Int(1))]);
    assert_eq!(
        u.cases[1].labels,
        vec![
            CaseLabel::Value(ConstValue::Int(2)),
            CaseLabel::Value(ConstValue::Int(3)),
        ]
    );
    assert_eq!(u.cases[2].labels, vec![CaseLabel::Default]);
    assert_eq!(u.cases[2].name, "c");
}

#[test]
fn enum_enumerators_in_order() {
    let unit = parse_ok("enum Color { RED, GREEN, BLUE };");
    let Definition::Enum(color) = &unit.definitions[0] else {
        panic!();
    };
    assert_eq!(color.enumerators, vec!["RED", "GREEN", "BLUE"]);
}

#[test]
fn enumerators_land_in_surrounding_scope() {
    let (_, parser) = parse("module M { enum Color { RED, GREEN }; };");
    let table = parser.symbol_table();
    // The enumerators live next to the enum, not inside a Color scope.
    let red = table.lookup_qualified("M::RED").expect("RED in M");
    assert_eq!(red.kind, crate::symbols::SymbolKind::EnumValue);
    assert!(table.lookup_qualified("M::Color::RED").is_none());
}

#[test]
fn typedef_declarators_and_dimensions() {
    let unit = parse_ok("typedef octet UUID[16], Raw;");
    let Definition::Typedef(td) = &unit.definitions[0] else {
        panic!();
    };
    assert_eq!(td.declarators.len(), 2);
    assert_eq!(td.declarators[0].name, "UUID");
    assert_eq!(td.declarators[0].array_dimensions, vec![16]);
    assert_eq!(td.declarators[1].name, "Raw");
    assert!(td.declarators[1].array_dimensions.is_empty());
}

// ============================================================
// Types
// ============================================================

#[test]
fn sequence_types() {
    let unit = parse_ok("typedef sequence<long> Longs; typedef sequence<string, 10> Names;");
    let Definition::Typedef(longs) = &unit.definitions[0] else {
        panic!();
    };
    let TypeNode::Sequence { element, bound, .. } = &longs.source else {
        panic!("expected sequence");
    };
    assert!(matches!(**element, TypeNode::Basic { ty: BasicType::Long, .. }));
    assert!(bound.is_none());

    let Definition::Typedef(names) = &unit.definitions[1] else {
        panic!();
    };
    let TypeNode::Sequence { bound, .. } = &names.source else {
        panic!("expected sequence");
    };
    assert_eq!(*bound, Some(10));
}

#[test]
fn bounded_strings() {
    let unit = parse_ok("typedef string<32> Short; typedef wstring Wide;");
    let Definition::Typedef(short) = &unit.definitions[0] else {
        panic!();
    };
    assert!(matches!(
        short.source,
        TypeNode::String { bound: Some(32), wide: false, .. }
    ));
    let Definition::Typedef(wide) = &unit.definitions[1] else {
        panic!();
    };
    assert!(matches!(
        wide.source,
        TypeNode::String { bound: None, wide: true, .. }
    ));
}

#[test]
fn unsigned_and_long_type_spellings() {
    let unit = parse_ok(
        "struct T { unsigned short a; unsigned long b; long long c; unsigned long long d; long double e; };",
    );
    let Definition::Struct(t) = &unit.definitions[0] else {
        panic!();
    };
    let kinds: Vec<BasicType> = t
        .members
        .iter()
        .map(|m| match m.ty {
            TypeNode::Basic { ty, .. } => ty,
            _ => panic!("expected basic type"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            BasicType::UShort,
            BasicType::ULong,
            BasicType::LongLong,
            BasicType::ULongLong,
            BasicType::LongDouble,
        ]
    );
}

#[test]
fn unsigned_without_int_type_is_reported() {
    let (_, parser) = parse("struct S { unsigned octet x; };");
    assert!(parser.has_errors());
}

#[test]
fn scoped_name_types() {
    let unit = parse_ok("module M { struct S { long x; }; }; struct T { ::M::S abs; M::S rel; };");
    let Definition::Struct(t) = &unit.definitions[1] else {
        panic!();
    };
    let TypeNode::ScopedName { parts, absolute, .. } = &t.members[0].ty else {
        panic!("expected scoped name");
    };
    assert!(*absolute);
    assert_eq!(parts, &vec!["M".to_string(), "S".to_string()]);
    let TypeNode::ScopedName { absolute, .. } = &t.members[1].ty else {
        panic!("expected scoped name");
    };
    assert!(!*absolute);
}

// ============================================================
// Constant folding
// ============================================================

#[test]
fn arithmetic_precedence() {
    let (unit, _) = parse("const long C = 1 + 2 * 3;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(7));
}

#[test]
fn parenthesized_expressions() {
    let (unit, _) = parse("const long C = (1 + 2) * 3;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(9));
}

#[test]
fn unary_operators() {
    let (unit, _) = parse("const long C = -(3 + 4);");
    assert_eq!(first_const(&unit).value, ConstValue::Int(-7));

    let (unit, _) = parse("const long C = ~0;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(-1));

    let (unit, _) = parse("const long C = +5;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(5));
}

#[test]
fn bitwise_and_shift_operators() {
    let (unit, _) = parse("const long C = 1 << 4 | 3 & 6 ^ 1;");
    // precedence (low to high): | ^ & shift
    let expected = 1i64.checked_shl(4).unwrap() | ((3 & 6) ^ 1);
    assert_eq!(first_const(&unit).value, ConstValue::Int(expected));

    let (unit, _) = parse("const long C = 256 >> 2;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(64));
}

#[test]
fn division_by_zero_is_suppressed() {
    let (unit, parser) = parse("const long C = 10 / 0;");
    // The folded value keeps the dividend; no crash, no error.
    assert_eq!(first_const(&unit).value, ConstValue::Int(10));
    assert!(!parser.has_errors());

    let (unit, _) = parse("const long C = 10 % 0;");
    assert_eq!(first_const(&unit).value, ConstValue::Int(10));
}

#[test]
fn float_folding() {
    let (unit, _) = parse("const double D = 1.5 * 4.0;");
    assert_eq!(first_const(&unit).value, ConstValue::Float(6.0));
}

#[test]
fn boolean_and_string_constants() {
    let (unit, _) = parse("const boolean B = TRUE;");
    assert_eq!(first_const(&unit).value, ConstValue::Bool(true));

    let (unit, _) = parse("const string S = \"hello\";");
    assert_eq!(first_const(&unit).value, ConstValue::Str("hello".to_string()));

    let (unit, _) = parse("const char C = 'x';");
    assert_eq!(first_const(&unit).value, ConstValue::Str("x".to_string()));
}

#[test]
fn constant_references_substitute_values() {
    let (unit, parser) = parse("const long A = 6; const long B = A * 7;");
    assert!(!parser.has_errors());
    let Definition::Const(b) = &unit.definitions[1] else {
        panic!();
    };
    assert_eq!(b.value, ConstValue::Int(42));
}

#[test]
fn scoped_constant_references() {
    let (unit, parser) = parse("module M { const long A = 5; }; const long B = M::A + 1;");
    assert!(!parser.has_errors(), "{:?}", parser.diagnostics());
    let Definition::Const(b) = &unit.definitions[1] else {
        panic!();
    };
    assert_eq!(b.value, ConstValue::Int(6));
}

#[test]
fn enum_references_fold_to_ordinal() {
    let (unit, parser) = parse("enum Color { RED, GREEN, BLUE }; const long C = GREEN;");
    assert!(!parser.has_errors(), "{:?}", parser.diagnostics());
    let Definition::Const(c) = &unit.definitions[1] else {
        panic!();
    };
    assert_eq!(c.value, ConstValue::Int(1));
}

#[test]
fn unknown_constant_warns_and_substitutes_zero() {
    let (unit, parser) = parse("const long C = MISSING + 3;");
    assert!(!parser.has_errors());
    assert_eq!(parser.warnings().count(), 1);
    assert_eq!(first_const(&unit).value, ConstValue::Int(3));
}

#[test]
fn constant_dimension_in_array_declarator() {
    let unit = parse_ok("const long SIZE = 8; typedef octet Block[SIZE * 2];");
    let Definition::Typedef(td) = &unit.definitions[1] else {
        panic!();
    };
    assert_eq!(td.declarators[0].array_dimensions, vec![16]);
}

// ============================================================
// Symbol table effects
// ============================================================

#[test]
fn scope_round_trip_for_all_named_symbols() {
    let (_, parser) = parse(
        "module M {\n\
           module Inner { const long K = 1; };\n\
           interface I { void f(); attribute long a; };\n\
           struct S { long x; };\n\
           union U switch (long) { case 1: long v; };\n\
           enum E { E1, E2 };\n\
           typedef long Tid;\n\
           exception Oops { string what_happened; };\n\
         };",
    );
    let table = parser.symbol_table();
    for fqn in [
        "M",
        "M::Inner",
        "M::Inner::K",
        "M::I",
        "M::I::f",
        "M::I::a",
        "M::S",
        "M::U",
        "M::E",
        "M::E1",
        "M::E2",
        "M::Tid",
        "M::Oops",
    ] {
        let sym = table.lookup_qualified(fqn);
        assert!(sym.is_some(), "missing {}", fqn);
        assert_eq!(sym.unwrap().fully_qualified_name, fqn);
    }
}

// ============================================================
// Error recovery
// ============================================================

#[test]
fn recovery_reports_errors_in_separate_definitions() {
    let (unit, parser) = parse(
        "struct Bad1 { long }; struct Good { long x; }; struct Bad2 { 42 };",
    );
    let errors: Vec<_> = parser
        .diagnostics()
        .iter()
        .filter(|d| !d.is_warning())
        .collect();
    assert!(errors.len() >= 2, "expected errors from both bad structs: {:?}", errors);
    // The good definition between them still parsed.
    assert!(unit
        .definitions
        .iter()
        .any(|d| matches!(d, Definition::Struct(s) if s.name == "Good")));
}

#[test]
fn missing_semicolon_recovers_at_next_definition() {
    let (unit, parser) = parse("struct A { long x; }\nstruct B { long y; };");
    assert!(parser.has_errors());
    assert!(unit
        .definitions
        .iter()
        .any(|d| matches!(d, Definition::Struct(s) if s.name == "B")));
}

#[test]
fn cascading_errors_are_suppressed() {
    // A run of garbage inside one definition produces one error, not one
    // per token.
    let (_, parser) = parse("struct S { + + + + long x; };");
    let errors = parser
        .diagnostics()
        .iter()
        .filter(|d| !d.is_warning())
        .count();
    assert_eq!(errors, 1);
}

#[test]
fn line_directives_are_transparent_to_the_grammar() {
    let unit = parse_ok("#line 10 \"other.idl\"\nstruct S { long x; };");
    assert_eq!(unit.definitions.len(), 1);
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!();
    };
    assert_eq!(s.location.file, "other.idl");
    assert_eq!(s.location.line, 10);
}

#[test]
fn pragmas_are_transparent_to_the_grammar() {
    let unit = parse_ok("#pragma prefix \"acme\"\nstruct S { long x; };");
    assert_eq!(unit.definitions.len(), 1);
}
