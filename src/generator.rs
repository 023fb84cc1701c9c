//! C++11 code generation.
//!
//! [`Cpp11Generator`] walks a [`TranslationUnit`] and renders C++ header
//! text (and, optionally, an implementation file holding only namespace
//! scaffolding) into in-memory buffers. Generation is one function per node
//! variant, all in this module; the closed AST makes the dispatch a plain
//! `match`.
//!
//! The generator never fails hard: problems accumulate as diagnostics and
//! [`Cpp11Generator::generate`] reports overall success. An optional
//! borrowed [`SymbolTable`] is consulted to flag scoped type references
//! that never resolved to a declaration.

use crate::ast::*;
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::span::{SourceLocation, Span};
use crate::symbols::SymbolTable;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration options for code generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Where to write the generated files; `None` keeps output in memory.
    pub output_dir: Option<PathBuf>,
    pub header_extension: String,
    pub source_extension: String,
    /// One indentation level.
    pub indent: String,
    /// Emit the `.cpp` namespace scaffolding alongside the header.
    pub generate_implementation: bool,
    /// Emit a `using XPtr = std::shared_ptr<X>;` alias per interface.
    pub use_smart_pointers: bool,
    pub add_include_guards: bool,
    pub add_doxygen: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            header_extension: ".hpp".to_string(),
            source_extension: ".cpp".to_string(),
            indent: "  ".to_string(),
            generate_implementation: true,
            use_smart_pointers: true,
            add_include_guards: true,
            add_doxygen: true,
        }
    }
}

const GUARD_PREFIX: &str = "IBORB_GENERATED_";

/// The C++11 generator.
pub struct Cpp11Generator<'a> {
    config: GeneratorConfig,
    symbols: Option<&'a SymbolTable>,
    header: String,
    source: String,
    indent_level: usize,
    /// Open namespaces, innermost last. Used for closing comments and for
    /// the implementation file.
    namespace_stack: Vec<String>,
    /// Open named scopes (namespaces and interfaces), used to resolve
    /// relative type references against the symbol table.
    scope_stack: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    include_guard: String,
}

impl<'a> Cpp11Generator<'a> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            symbols: None,
            header: String::new(),
            source: String::new(),
            indent_level: 0,
            namespace_stack: Vec::new(),
            scope_stack: Vec::new(),
            diagnostics: Vec::new(),
            include_guard: String::new(),
        }
    }

    /// Borrow the symbol table built during parsing; scoped references that
    /// fail to resolve against it are reported as warnings.
    pub fn with_symbol_table(mut self, table: &'a SymbolTable) -> Self {
        self.symbols = Some(table);
        self
    }

    /// Generate code for a translation unit. Returns `true` when no
    /// non-warning diagnostic was produced.
    pub fn generate(&mut self, unit: &TranslationUnit) -> bool {
        self.header.clear();
        self.source.clear();
        self.diagnostics.clear();
        self.indent_level = 0;
        self.namespace_stack.clear();
        self.scope_stack.clear();

        let base_name = Path::new(&unit.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generated".to_string());

        if self.config.add_include_guards {
            self.include_guard = make_include_guard(&base_name);
            let guard = self.include_guard.clone();
            self.write_header_line(&format!("#ifndef {}", guard));
            self.write_header_line(&format!("#define {}", guard));
            self.write_header_line("");
        }

        self.emit_includes();
        self.write_header_line("");

        for def in &unit.definitions {
            self.emit_definition(def);
        }

        if self.config.add_include_guards {
            self.write_header_line("");
            let guard = self.include_guard.clone();
            self.write_header_line(&format!("#endif // {}", guard));
        }

        if self.config.output_dir.is_some() {
            self.write_output_files(&base_name, &unit.filename);
        }

        !self.diagnostics.iter().any(|d| !d.is_warning())
    }

    pub fn header_content(&self) -> &str {
        &self.header
    }

    pub fn source_content(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ============================================================
    // Output helpers
    // ============================================================

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn outdent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn write_header_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent_level {
                self.header.push_str(&self.config.indent);
            }
            self.header.push_str(line);
        }
        self.header.push('\n');
    }

    fn write_source_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent_level {
                self.source.push_str(&self.config.indent);
            }
            self.source.push_str(line);
        }
        self.source.push('\n');
    }

    fn error(&mut self, message: String, filename: &str) {
        self.diagnostics.push(
            Diagnostic::error(message, Span::dummy(), SourceLocation::start_of(filename))
                .with_error_code(ErrorCode::OutputWrite),
        );
    }

    // ============================================================
    // Type mapping
    // ============================================================

    fn map_basic_type(&self, ty: BasicType) -> &'static str {
        match ty {
            BasicType::Void => "void",
            BasicType::Boolean => "bool",
            BasicType::Char => "char",
            BasicType::WChar => "wchar_t",
            BasicType::Octet => "uint8_t",
            BasicType::Short => "int16_t",
            BasicType::UShort => "uint16_t",
            BasicType::Long => "int32_t",
            BasicType::ULong => "uint32_t",
            BasicType::LongLong => "int64_t",
            BasicType::ULongLong => "uint64_t",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::LongDouble => "long double",
            BasicType::Any => "std::any",
            BasicType::Object => "Object",
        }
    }

    fn map_type(&mut self, ty: &TypeNode) -> String {
        match ty {
            TypeNode::Basic { ty, .. } => self.map_basic_type(*ty).to_string(),
            TypeNode::Sequence { element, .. } => {
                format!("std::vector<{}>", self.map_type(element))
            }
            TypeNode::String { wide, .. } => {
                if *wide {
                    "std::wstring".to_string()
                } else {
                    "std::string".to_string()
                }
            }
            TypeNode::ScopedName {
                parts,
                absolute,
                location,
            } => {
                self.check_reference(parts, *absolute, location);
                TypeNode::scoped_name_to_string(parts, *absolute)
            }
            TypeNode::Array {
                element,
                dimensions,
                ..
            } => {
                // Outer dimension last so X[i][j] indexes in source order.
                let mut mapped = self.map_type(element);
                for dim in dimensions.iter().rev() {
                    mapped = format!("std::array<{}, {}>", mapped, dim);
                }
                mapped
            }
        }
    }

    /// Map a type for use as an operation parameter. `in` basic types pass
    /// by value, `in` complex types by const reference, `out` and `inout`
    /// by reference.
    fn map_type_for_parameter(&mut self, ty: &TypeNode, direction: ParamDirection) -> String {
        let base = self.map_type(ty);
        match direction {
            ParamDirection::In => match ty {
                TypeNode::Basic { ty, .. }
                    if !matches!(ty, BasicType::Any | BasicType::Object | BasicType::Void) =>
                {
                    base
                }
                _ => format!("const {}&", base),
            },
            ParamDirection::Out | ParamDirection::InOut => format!("{}&", base),
        }
    }

    /// Warn when a scoped reference resolves against none of the scopes the
    /// generator is currently inside.
    fn check_reference(&mut self, parts: &[String], absolute: bool, location: &SourceLocation) {
        let Some(table) = self.symbols else {
            return;
        };

        let resolved = if absolute {
            table.lookup_scoped(parts, true).is_some()
        } else {
            // Try from the innermost enclosing scope outward.
            (0..=self.scope_stack.len()).rev().any(|depth| {
                let mut full: Vec<String> = self.scope_stack[..depth].to_vec();
                full.extend_from_slice(parts);
                table.lookup_scoped(&full, true).is_some()
            })
        };

        if !resolved {
            let name = TypeNode::scoped_name_to_string(parts, absolute);
            self.diagnostics.push(
                Diagnostic::warning(
                    format!("Unresolved type reference: {}", name),
                    Span::dummy(),
                    location.clone(),
                )
                .with_error_code(ErrorCode::UnresolvedReference),
            );
        }
    }

    // ============================================================
    // Emission, one function per definition variant
    // ============================================================

    fn emit_definition(&mut self, def: &Definition) {
        match def {
            Definition::Module(node) => self.emit_module(node),
            Definition::Interface(node) => {
                if node.is_forward {
                    let name = sanitize(&node.name);
                    self.write_header_line(&format!("class {};", name));
                    self.write_header_line("");
                } else {
                    self.emit_interface(node);
                }
            }
            Definition::Struct(node) => {
                if node.is_forward {
                    let name = sanitize(&node.name);
                    self.write_header_line(&format!("struct {};", name));
                    self.write_header_line("");
                } else {
                    self.emit_struct(node);
                }
            }
            Definition::Union(node) => self.emit_union(node),
            Definition::Enum(node) => self.emit_enum(node),
            Definition::Typedef(node) => self.emit_typedef(node),
            Definition::Const(node) => self.emit_const(node),
            Definition::Exception(node) => self.emit_exception(node),
        }
    }

    fn emit_includes(&mut self) {
        self.write_header_line("#include <cstdint>");
        self.write_header_line("#include <string>");
        self.write_header_line("#include <vector>");
        self.write_header_line("#include <array>");
        self.write_header_line("#include <memory>");
        self.write_header_line("#include <stdexcept>");
    }

    fn emit_module(&mut self, node: &ModuleNode) {
        let name = sanitize(&node.name);

        self.write_header_line("");
        self.write_header_line(&format!("namespace {} {{", name));
        self.write_header_line("");
        if self.config.generate_implementation {
            self.write_source_line("");
            self.write_source_line(&format!("namespace {} {{", name));
            self.write_source_line("");
        }
        self.indent();
        self.namespace_stack.push(name);
        self.scope_stack.push(node.name.clone());

        for def in &node.definitions {
            self.emit_definition(def);
        }

        self.scope_stack.pop();
        let name = self.namespace_stack.pop().unwrap_or_default();
        self.outdent();
        self.write_header_line("");
        self.write_header_line(&format!("}} // namespace {}", name));
        if self.config.generate_implementation {
            self.write_source_line("");
            self.write_source_line(&format!("}} // namespace {}", name));
        }
    }

    fn emit_struct(&mut self, node: &StructNode) {
        let name = sanitize(&node.name);

        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief IDL struct {}", node.name));
            self.write_header_line(" */");
        }

        self.write_header_line(&format!("struct {} {{", name));
        self.indent();

        for member in &node.members {
            let ty = self.map_type(&member.ty);
            self.write_header_line(&format!("{} {};", ty, sanitize(&member.name)));
        }

        // Memberwise equality in declared order.
        self.write_header_line("");
        self.write_header_line(&format!("bool operator==(const {}& other) const {{", name));
        self.indent();
        if node.members.is_empty() {
            self.write_header_line("(void)other;");
            self.write_header_line("return true;");
        } else {
            let comparison = node
                .members
                .iter()
                .map(|m| {
                    let member = sanitize(&m.name);
                    format!("{} == other.{}", member, member)
                })
                .collect::<Vec<_>>()
                .join(" && ");
            self.write_header_line(&format!("return {};", comparison));
        }
        self.outdent();
        self.write_header_line("}");

        self.write_header_line("");
        self.write_header_line(&format!("bool operator!=(const {}& other) const {{", name));
        self.indent();
        self.write_header_line("return !(*this == other);");
        self.outdent();
        self.write_header_line("}");

        self.outdent();
        self.write_header_line("};");
        self.write_header_line("");
    }

    fn emit_interface(&mut self, node: &InterfaceNode) {
        let name = sanitize(&node.name);

        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief IDL interface {}", node.name));
            if node.is_abstract {
                self.write_header_line(" * @note This is an abstract interface");
            }
            if node.is_local {
                self.write_header_line(" * @note This is a local interface");
            }
            self.write_header_line(" */");
        }

        // Base interfaces keep their source order and qualification.
        let mut decl = format!("class {}", name);
        if !node.bases.is_empty() {
            let bases = node
                .bases
                .iter()
                .map(|base| format!("public virtual {}", base))
                .collect::<Vec<_>>()
                .join(", ");
            decl.push_str(&format!(" : {}", bases));
        }

        self.write_header_line(&format!("{} {{", decl));
        self.write_header_line("public:");
        self.indent();

        self.write_header_line(&format!("virtual ~{}() = default;", name));
        self.write_header_line("");

        self.scope_stack.push(node.name.clone());

        for member in &node.contents {
            match member {
                InterfaceMember::Operation(op) => self.emit_operation(op),
                InterfaceMember::Attribute(attr) => self.emit_attribute(attr),
                InterfaceMember::Nested(def) => {
                    self.outdent();
                    self.write_header_line("");
                    self.emit_definition(def);
                    self.indent();
                }
            }
        }

        self.scope_stack.pop();

        self.outdent();
        self.write_header_line("};");
        self.write_header_line("");

        if self.config.use_smart_pointers {
            self.write_header_line(&format!("using {}Ptr = std::shared_ptr<{}>;", name, name));
            self.write_header_line("");
        }
    }

    fn emit_operation(&mut self, op: &OperationNode) {
        let return_type = self.map_type(&op.return_type);

        let params = op
            .parameters
            .iter()
            .map(|param| {
                let ty = self.map_type_for_parameter(&param.ty, param.direction);
                format!("{} {}", ty, sanitize(&param.name))
            })
            .collect::<Vec<_>>()
            .join(", ");

        if self.config.add_doxygen && !op.parameters.is_empty() {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief {} operation", op.name));
            for param in &op.parameters {
                let dir = match param.direction {
                    ParamDirection::In => "[in]",
                    ParamDirection::Out => "[out]",
                    ParamDirection::InOut => "[in,out]",
                };
                self.write_header_line(&format!(" * @param {} {}", param.name, dir));
            }
            for exception in &op.raises {
                self.write_header_line(&format!(" * @throws {}", exception));
            }
            self.write_header_line(" */");
        }

        self.write_header_line(&format!(
            "virtual {} {}({}) = 0;",
            return_type,
            sanitize(&op.name),
            params
        ));
        self.write_header_line("");
    }

    fn emit_attribute(&mut self, attr: &AttributeNode) {
        let ty = self.map_type(&attr.ty);
        let name = sanitize(&attr.name);

        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief Get {} attribute", attr.name));
            self.write_header_line(" */");
        }
        self.write_header_line(&format!("virtual {} {}() const = 0;", ty, name));

        if !attr.is_readonly {
            if self.config.add_doxygen {
                self.write_header_line("/**");
                self.write_header_line(&format!(" * @brief Set {} attribute", attr.name));
                self.write_header_line(" */");
            }
            self.write_header_line(&format!(
                "virtual void {}(const {}& value) = 0;",
                name, ty
            ));
        }
        self.write_header_line("");
    }

    fn emit_enum(&mut self, node: &EnumNode) {
        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief IDL enum {}", node.name));
            self.write_header_line(" */");
        }

        self.write_header_line(&format!("enum class {} {{", sanitize(&node.name)));
        self.indent();

        for (i, enumerator) in node.enumerators.iter().enumerate() {
            let mut line = sanitize(enumerator);
            if i + 1 < node.enumerators.len() {
                line.push(',');
            }
            self.write_header_line(&line);
        }

        self.outdent();
        self.write_header_line("};");
        self.write_header_line("");
    }

    fn emit_typedef(&mut self, node: &TypedefNode) {
        let base_type = self.map_type(&node.source);

        for decl in &node.declarators {
            let mut mapped = base_type.clone();
            // typedef octet UUID[16] becomes std::array<uint8_t, 16>; for
            // several dimensions the outermost array wraps last.
            for dim in decl.array_dimensions.iter().rev() {
                mapped = format!("std::array<{}, {}>", mapped, dim);
            }
            self.write_header_line(&format!("using {} = {};", sanitize(&decl.name), mapped));
        }
        self.write_header_line("");
    }

    fn emit_const(&mut self, node: &ConstNode) {
        let ty = self.map_type(&node.ty);
        let value = const_value_to_string(&node.value);
        self.write_header_line(&format!(
            "constexpr {} {} = {};",
            ty,
            sanitize(&node.name),
            value
        ));
        self.write_header_line("");
    }

    fn emit_exception(&mut self, node: &ExceptionNode) {
        let name = sanitize(&node.name);

        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief IDL exception {}", node.name));
            self.write_header_line(" */");
        }

        self.write_header_line(&format!("class {} : public std::exception {{", name));
        self.write_header_line("public:");
        self.indent();

        for member in &node.members {
            let ty = self.map_type(&member.ty);
            self.write_header_line(&format!("{} {};", ty, sanitize(&member.name)));
        }
        if !node.members.is_empty() {
            self.write_header_line("");
        }

        // Parameterized constructor when the exception carries members.
        if !node.members.is_empty() {
            let mut params = Vec::new();
            let mut inits = Vec::new();
            for member in &node.members {
                let ty = self.map_type(&member.ty);
                let member_name = sanitize(&member.name);
                params.push(format!("const {}& {}_", ty, member_name));
                inits.push(format!("{}({}_)", member_name, member_name));
            }
            self.write_header_line(&format!("{}({})", name, params.join(", ")));
            self.write_header_line(&format!("    : {} {{}}", inits.join(", ")));
            self.write_header_line("");
        }

        self.write_header_line(&format!("{}() = default;", name));
        self.write_header_line("");

        self.write_header_line("const char* what() const noexcept override {");
        self.indent();
        self.write_header_line(&format!("return \"{}\";", node.name));
        self.outdent();
        self.write_header_line("}");

        self.outdent();
        self.write_header_line("};");
        self.write_header_line("");
    }

    fn emit_union(&mut self, node: &UnionNode) {
        let name = sanitize(&node.name);
        let disc_type = self.map_type(&node.discriminator);

        if self.config.add_doxygen {
            self.write_header_line("/**");
            self.write_header_line(&format!(" * @brief IDL union {}", node.name));
            self.write_header_line(" */");
        }

        self.write_header_line(&format!("class {} {{", name));
        self.write_header_line("public:");
        self.indent();

        // Discriminator accessor pair.
        self.write_header_line(&format!("{} _d() const {{ return discriminator_; }}", disc_type));
        self.write_header_line(&format!("void _d({} d) {{ discriminator_ = d; }}", disc_type));
        self.write_header_line("");

        // One getter/setter pair per case member, in declared order.
        for case in &node.cases {
            let ty = self.map_type(&case.ty);
            let member = sanitize(&case.name);
            self.write_header_line(&format!(
                "{} {}() const {{ return {}_; }}",
                ty, member, member
            ));
            self.write_header_line(&format!(
                "void {}(const {}& value) {{ {}_ = value; }}",
                member, ty, member
            ));
            self.write_header_line("");
        }

        self.outdent();
        self.write_header_line("private:");
        self.indent();

        self.write_header_line(&format!("{} discriminator_;", disc_type));
        for case in &node.cases {
            let ty = self.map_type(&case.ty);
            self.write_header_line(&format!("{} {}_;", ty, sanitize(&case.name)));
        }

        self.outdent();
        self.write_header_line("};");
        self.write_header_line("");
    }

    // ============================================================
    // File output
    // ============================================================

    fn write_output_files(&mut self, base_name: &str, input_filename: &str) {
        let Some(dir) = self.config.output_dir.clone() else {
            return;
        };

        if let Err(e) = fs::create_dir_all(&dir) {
            self.error(
                format!("Failed to create output directory {}: {}", dir.display(), e),
                input_filename,
            );
            return;
        }

        let header_path = dir.join(format!("{}{}", base_name, self.config.header_extension));
        if let Err(e) = fs::write(&header_path, &self.header) {
            self.error(
                format!("Failed to write header file {}: {}", header_path.display(), e),
                input_filename,
            );
        }

        if self.config.generate_implementation && !self.source.trim().is_empty() {
            let source_path = dir.join(format!("{}{}", base_name, self.config.source_extension));
            if let Err(e) = fs::write(&source_path, &self.source) {
                self.error(
                    format!("Failed to write source file {}: {}", source_path.display(), e),
                    input_filename,
                );
            }
        }
    }
}

/// `IBORB_GENERATED_<UPPER_BASENAME>_HPP`; non-alphanumerics become `_`.
fn make_include_guard(base_name: &str) -> String {
    let mut guard = String::from(GUARD_PREFIX);
    for c in base_name.chars() {
        if c.is_ascii_alphanumeric() {
            guard.push(c.to_ascii_uppercase());
        } else {
            guard.push('_');
        }
    }
    guard.push_str("_HPP");
    guard
}

/// Append an underscore to IDL identifiers that collide with a C++
/// reserved word.
fn sanitize(name: &str) -> String {
    if is_cpp_reserved(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn is_cpp_reserved(name: &str) -> bool {
    matches!(
        name,
        "alignas"
            | "alignof"
            | "auto"
            | "bool"
            | "catch"
            | "class"
            | "const"
            | "const_cast"
            | "constexpr"
            | "decltype"
            | "delete"
            | "dynamic_cast"
            | "enum"
            | "explicit"
            | "extern"
            | "friend"
            | "inline"
            | "int"
            | "mutable"
            | "namespace"
            | "new"
            | "noexcept"
            | "nullptr"
            | "operator"
            | "private"
            | "protected"
            | "public"
            | "register"
            | "reinterpret_cast"
            | "return"
            | "signed"
            | "sizeof"
            | "static"
            | "static_cast"
            | "struct"
            | "template"
            | "this"
            | "throw"
            | "try"
            | "typedef"
            | "typename"
            | "union"
            | "using"
            | "virtual"
            | "volatile"
            | "wchar_t"
    )
}

/// Render a folded constant as a C++ expression.
fn const_value_to_string(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(v) => v.to_string(),
        ConstValue::UInt(v) => format!("{}ULL", v),
        ConstValue::Float(v) => {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                format!("{:.1}", v)
            } else {
                format!("{}", v)
            }
        }
        ConstValue::Str(s) => format!("\"{}\"", escape_cpp_string(s)),
        ConstValue::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
    }
}

fn escape_cpp_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}
