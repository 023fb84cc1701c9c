//! End-to-end tests for struct and exception mapping.

use iborb_idl::compile_idl;

#[test]
fn struct_with_string_and_sequence_members() {
    let header = compile_idl(
        "struct S { string name; sequence<long> xs; };",
        "s.idl",
    )
    .unwrap();

    assert!(header.contains("struct S {"));
    assert!(header.contains("std::string name;"));
    assert!(header.contains("std::vector<int32_t> xs;"));
    assert!(header.contains("bool operator==(const S& other) const {"));
    assert!(header.contains("return name == other.name && xs == other.xs;"));
    assert!(header.contains("bool operator!=(const S& other) const {"));
}

#[test]
fn equality_compares_members_in_declared_order() {
    let header = compile_idl(
        "struct P { long first; long second; long third; };",
        "p.idl",
    )
    .unwrap();
    assert!(header.contains(
        "return first == other.first && second == other.second && third == other.third;"
    ));
}

#[test]
fn empty_struct_equality_is_trivially_true() {
    let header = compile_idl("struct Unit { };", "unit.idl").unwrap();
    assert!(header.contains("(void)other;"));
    assert!(header.contains("return true;"));
}

#[test]
fn member_array_declarators() {
    let header = compile_idl("struct Frame { octet payload[64]; };", "frame.idl").unwrap();
    assert!(header.contains("std::array<uint8_t, 64> payload;"));
}

#[test]
fn forward_struct_declaration() {
    let header = compile_idl(
        "struct Node; struct Node { long value; };",
        "node.idl",
    )
    .unwrap();
    let forward = header.find("struct Node;").expect("forward declaration");
    let full = header.find("struct Node {").expect("definition");
    assert!(forward < full);
}

#[test]
fn exception_mapping() {
    let idl = r#"
        exception NotFound {
            string reason;
            long code;
        };
    "#;
    let header = compile_idl(idl, "errors.idl").unwrap();

    assert!(header.contains("class NotFound : public std::exception {"));
    assert!(header.contains("std::string reason;"));
    assert!(header.contains("int32_t code;"));
    assert!(header.contains("NotFound(const std::string& reason_, const int32_t& code_)"));
    assert!(header.contains("    : reason(reason_), code(code_) {}"));
    assert!(header.contains("NotFound() = default;"));
    assert!(header.contains("const char* what() const noexcept override {"));
    assert!(header.contains("return \"NotFound\";"));
}

#[test]
fn empty_exception_has_default_constructor_only() {
    let header = compile_idl("exception Boom { };", "boom.idl").unwrap();
    assert!(header.contains("class Boom : public std::exception {"));
    assert!(header.contains("Boom() = default;"));
    assert!(!header.contains("Boom(const"));
    assert!(header.contains("return \"Boom\";"));
}
