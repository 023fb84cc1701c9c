//! Symbol table: a tree of lexical scopes built during parsing.
//!
//! The parser keeps the table synchronized with the scope it is currently
//! inside (modules, interfaces, structs, unions and exceptions each open a
//! scope); after parsing, the generator borrows the table to resolve scoped
//! type references.
//!
//! Scopes live in a flat arena indexed by [`ScopeId`]; parent links are
//! indices, so the tree never needs shared ownership. Re-entering a scope
//! that already exists (the re-opened module case) resumes the existing
//! scope, which is what makes all openings of a module share one symbol
//! map.

use crate::ast::ConstValue;
use std::collections::HashMap;

/// Index of a scope in the table's arena. The global scope is always 0.
pub type ScopeId = usize;

/// What kind of definition a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Module,
    Interface,
    Struct,
    Union,
    Enum,
    Typedef,
    Exception,
    Constant,
    Operation,
    Attribute,
    Parameter,
    EnumValue,
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Union => "union",
            SymbolKind::Enum => "enum",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Exception => "exception",
            SymbolKind::Constant => "constant",
            SymbolKind::Operation => "operation",
            SymbolKind::Attribute => "attribute",
            SymbolKind::Parameter => "parameter",
            SymbolKind::EnumValue => "enum value",
        }
    }
}

/// A named entity in some scope.
///
/// Constants carry their folded value and enum values their ordinal, so
/// constant folding never needs to reach back into the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub fully_qualified_name: String,
    pub kind: SymbolKind,
    pub value: Option<ConstValue>,
}

/// A single lexical scope: its name, position in the tree, and symbol map.
#[derive(Debug)]
struct Scope {
    name: String,
    fully_qualified_name: String,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

/// The scope tree. Starts with an unnamed global scope as the current one.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: String::new(),
                fully_qualified_name: String::new(),
                parent: None,
                children: Vec::new(),
                symbols: HashMap::new(),
            }],
            current: 0,
        }
    }

    /// Enter a child scope of the current scope, creating it if it does not
    /// exist yet. Entering an existing child re-opens it.
    pub fn enter_scope(&mut self, name: &str) {
        if let Some(existing) = self.child_of(self.current, name) {
            self.current = existing;
            return;
        }
        let parent_fqn = &self.scopes[self.current].fully_qualified_name;
        let fqn = if parent_fqn.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", parent_fqn, name)
        };
        let id = self.scopes.len();
        self.scopes.push(Scope {
            name: name.to_string(),
            fully_qualified_name: fqn,
            parent: Some(self.current),
            children: Vec::new(),
            symbols: HashMap::new(),
        });
        self.scopes[self.current].children.push(id);
        self.current = id;
    }

    /// Pop to the parent scope. A no-op at global scope.
    pub fn leave_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Insert a symbol into the current scope. Returns `false` when a
    /// symbol of that name already exists there (the first insertion is
    /// kept).
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind, value: Option<ConstValue>) -> bool {
        let fqn = self.build_fully_qualified_name(name);
        let scope = &mut self.scopes[self.current];
        if scope.symbols.contains_key(name) {
            return false;
        }
        scope.symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                fully_qualified_name: fqn,
                kind,
                value,
            },
        );
        true
    }

    /// Look a simple name up in the current scope, then in each ancestor.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(sym) = self.scopes[id].symbols.get(name) {
                return Some(sym);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    /// Look a simple name up in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current].symbols.get(name)
    }

    /// Resolve a scoped name like `A::B::C`.
    ///
    /// Absolute names walk child scopes from the global scope. Relative
    /// names first find the nearest enclosing scope that has a child scope
    /// named after the first part (or, for single-part names, a local
    /// symbol), then descend from there. Inner scopes shadow outer ones.
    pub fn lookup_scoped(&self, parts: &[String], is_absolute: bool) -> Option<&Symbol> {
        if parts.is_empty() {
            return None;
        }

        if is_absolute {
            return self.descend_and_lookup(0, parts);
        }

        if parts.len() == 1 {
            return self.lookup(&parts[0]);
        }

        // Find the anchor scope for the first part.
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(child) = self.child_of(id, &parts[0]) {
                return self.descend_and_lookup(child, &parts[1..]);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    /// Resolve a textual qualified name, honouring a leading `::`.
    pub fn lookup_qualified(&self, qualified: &str) -> Option<&Symbol> {
        let is_absolute = qualified.starts_with("::");
        let parts = parse_qualified_name(qualified);
        self.lookup_scoped(&parts, is_absolute)
    }

    /// Fully qualified name of the current scope (empty at global).
    pub fn current_scope_name(&self) -> &str {
        &self.scopes[self.current].fully_qualified_name
    }

    /// True when the current scope already defines `name`.
    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.scopes[self.current].symbols.contains_key(name)
    }

    /// The fully qualified name `name` would have if defined right here.
    pub fn build_fully_qualified_name(&self, name: &str) -> String {
        let scope_fqn = &self.scopes[self.current].fully_qualified_name;
        if scope_fqn.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", scope_fqn, name)
        }
    }

    fn child_of(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.scopes[scope]
            .children
            .iter()
            .copied()
            .find(|&child| self.scopes[child].name == name)
    }

    /// Walk `parts[..n-1]` as child scopes of `start`, then look the last
    /// part up locally in the scope reached.
    fn descend_and_lookup(&self, start: ScopeId, parts: &[String]) -> Option<&Symbol> {
        let mut scope = start;
        for part in &parts[..parts.len() - 1] {
            scope = self.child_of(scope, part)?;
        }
        self.scopes[scope].symbols.get(parts.last()?.as_str())
    }
}

/// Split a `::`-separated name into parts, dropping a leading `::`.
pub fn parse_qualified_name(name: &str) -> Vec<String> {
    name.split("::")
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
