//! End-to-end tests for union mapping.

use iborb_idl::compile_idl;

#[test]
fn union_maps_to_discriminated_class() {
    let idl = "union U switch (long) { case 1: string a; case 2: case 3: long b; default: boolean c; };";
    let header = compile_idl(idl, "u.idl").unwrap();

    assert!(header.contains("class U {"));

    // Discriminator accessor pair returns the mapped switch type.
    assert!(header.contains("int32_t _d() const { return discriminator_; }"));
    assert!(header.contains("void _d(int32_t d) { discriminator_ = d; }"));

    // One name-matched getter/setter pair per case member.
    assert!(header.contains("std::string a() const { return a_; }"));
    assert!(header.contains("void a(const std::string& value) { a_ = value; }"));
    assert!(header.contains("int32_t b() const { return b_; }"));
    assert!(header.contains("void b(const int32_t& value) { b_ = value; }"));
    assert!(header.contains("bool c() const { return c_; }"));
    assert!(header.contains("void c(const bool& value) { c_ = value; }"));

    // Private storage for the discriminator and each case member.
    assert!(header.contains("private:"));
    assert!(header.contains("int32_t discriminator_;"));
    assert!(header.contains("std::string a_;"));
    assert!(header.contains("int32_t b_;"));
    assert!(header.contains("bool c_;"));
}

#[test]
fn union_cases_emit_in_declared_order() {
    let idl = "union V switch (short) { case 1: long first; case 2: string second; };";
    let header = compile_idl(idl, "v.idl").unwrap();

    let first = header.find("first() const").unwrap();
    let second = header.find("second() const").unwrap();
    assert!(first < second);
    assert!(header.contains("int16_t _d() const"));
}

#[test]
fn union_over_enum_discriminator() {
    let idl = r#"
        enum Kind { KIND_A, KIND_B };
        union Value switch (Kind) {
            case KIND_A: long num;
            case KIND_B: string text;
        };
    "#;
    let header = compile_idl(idl, "value.idl").unwrap();
    assert!(header.contains("Kind _d() const { return discriminator_; }"));
    assert!(header.contains("Kind discriminator_;"));
}
