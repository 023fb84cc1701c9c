//! End-to-end tests for interface mapping.

use iborb_idl::compile_idl;

#[test]
fn forward_declaration_precedes_class() {
    let header = compile_idl(
        "interface I; interface I { long f(in long x); };",
        "fwd.idl",
    )
    .unwrap();

    let forward = header.find("class I;").expect("forward declaration");
    let class = header.find("class I {").expect("class definition");
    assert!(forward < class);
    assert!(header.contains("virtual int32_t f(int32_t x) = 0;"));
}

#[test]
fn virtual_destructor_and_pointer_alias() {
    let header = compile_idl("interface Session { };", "session.idl").unwrap();
    assert!(header.contains("virtual ~Session() = default;"));
    assert!(header.contains("using SessionPtr = std::shared_ptr<Session>;"));
}

#[test]
fn inheritance_is_virtual_and_ordered() {
    let idl = r#"
        module Base { interface Root { }; };
        interface Mixin { };
        interface Leaf : ::Base::Root, Mixin { };
    "#;
    let header = compile_idl(idl, "inherit.idl").unwrap();
    assert!(header.contains("class Leaf : public virtual ::Base::Root, public virtual Mixin {"));
}

#[test]
fn attribute_accessors() {
    let idl = r#"
        interface Config {
            readonly attribute long size;
            attribute string label;
        };
    "#;
    let header = compile_idl(idl, "config.idl").unwrap();

    assert!(header.contains("virtual int32_t size() const = 0;"));
    assert!(!header.contains("virtual void size("));
    assert!(header.contains("virtual std::string label() const = 0;"));
    assert!(header.contains("virtual void label(const std::string& value) = 0;"));
}

#[test]
fn parameter_directions_map_to_passing_conventions() {
    let idl = r#"
        interface Calc {
            void run(in long ticks, in string tag, inout double acc, out boolean done);
        };
    "#;
    let header = compile_idl(idl, "calc.idl").unwrap();
    assert!(header.contains(
        "virtual void run(int32_t ticks, const std::string& tag, double& acc, bool& done) = 0;"
    ));
}

#[test]
fn oneway_operations_and_raises_are_accepted() {
    let idl = r#"
        exception Unreachable { };
        interface Bus {
            oneway void post(in string msg);
            void send(in string msg) raises (Unreachable);
        };
    "#;
    let header = compile_idl(idl, "bus.idl").unwrap();
    assert!(header.contains("virtual void post(const std::string& msg) = 0;"));
    assert!(header.contains("virtual void send(const std::string& msg) = 0;"));
}

#[test]
fn nested_types_inside_interfaces() {
    let idl = r#"
        interface Store {
            struct Entry { string key; string value; };
            enum Mode { READ, WRITE };
            Entry get(in string key);
        };
    "#;
    let header = compile_idl(idl, "store.idl").unwrap();

    assert!(header.contains("class Store {"));
    assert!(header.contains("struct Entry {"));
    assert!(header.contains("enum class Mode {"));
    assert!(header.contains("virtual Entry get(const std::string& key) = 0;"));
}
