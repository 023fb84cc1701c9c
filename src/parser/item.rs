//! Definition parsing: modules, interfaces, structs, unions, enums,
//! typedefs, constants and exceptions.

use super::Parser;
use crate::ast::*;
use crate::diagnostics::ErrorCode;
use crate::lexer::TokenKind;
use crate::symbols::SymbolKind;

impl<'src> Parser<'src> {
    /// Parse one definition. Returns `None` after reporting an error; the
    /// caller synchronizes.
    pub(super) fn parse_definition(&mut self) -> Option<Definition> {
        let is_abstract = self.try_consume(TokenKind::KwAbstract);
        let is_local = self.try_consume(TokenKind::KwLocal);

        if self.check(TokenKind::KwModule) {
            if is_abstract || is_local {
                self.error_at_current(
                    "'abstract' and 'local' cannot be applied to modules",
                    ErrorCode::MisplacedModifier,
                );
            }
            return self.parse_module().map(Definition::Module);
        }

        if self.check(TokenKind::KwInterface) {
            return self
                .parse_interface(is_abstract, is_local)
                .map(Definition::Interface);
        }

        if is_abstract || is_local {
            self.error_at_current(
                "'abstract' and 'local' can only be applied to interfaces",
                ErrorCode::MisplacedModifier,
            );
        }

        match self.current.kind {
            TokenKind::KwStruct => self.parse_struct().map(Definition::Struct),
            TokenKind::KwUnion => self.parse_union().map(Definition::Union),
            TokenKind::KwEnum => self.parse_enum().map(Definition::Enum),
            TokenKind::KwTypedef => self.parse_typedef().map(Definition::Typedef),
            TokenKind::KwConst => self.parse_const().map(Definition::Const),
            TokenKind::KwException => self.parse_exception().map(Definition::Exception),
            _ => {
                self.error_at_current(
                    "Expected definition (module, interface, struct, ...)",
                    ErrorCode::ExpectedDefinition,
                );
                None
            }
        }
    }

    fn parse_module(&mut self) -> Option<ModuleNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwModule, "Expected 'module'");

        let name_token = self.expect_identifier("Expected module name")?;
        self.define(&name_token, SymbolKind::Module, None);
        self.symbols.enter_scope(&name_token.text);

        self.expect(TokenKind::LeftBrace, "Expected '{' after module name");

        let mut definitions = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            } else {
                self.synchronize();
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of module");
        self.expect_semicolon();
        self.symbols.leave_scope();

        Some(ModuleNode {
            name: name_token.text,
            definitions,
            location,
        })
    }

    fn parse_interface(&mut self, is_abstract: bool, is_local: bool) -> Option<InterfaceNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwInterface, "Expected 'interface'");

        let name_token = self.expect_identifier("Expected interface name")?;

        // Forward declaration.
        if self.try_consume(TokenKind::Semicolon) {
            self.define(&name_token, SymbolKind::Interface, None);
            return Some(InterfaceNode {
                name: name_token.text,
                bases: Vec::new(),
                contents: Vec::new(),
                is_abstract,
                is_local,
                is_forward: true,
                location,
            });
        }

        let bases = if self.check(TokenKind::Colon) {
            self.parse_inheritance_spec()
        } else {
            Vec::new()
        };

        // A full definition after a forward declaration re-opens the name.
        self.define(&name_token, SymbolKind::Interface, None);
        self.symbols.enter_scope(&name_token.text);

        self.expect(TokenKind::LeftBrace, "Expected '{' after interface name");

        let mut contents = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let readonly = self.try_consume(TokenKind::KwReadonly);
            let oneway = self.try_consume(TokenKind::KwOneway);

            if self.check(TokenKind::KwAttribute) {
                if oneway {
                    self.error_at_current(
                        "'oneway' cannot be applied to attributes",
                        ErrorCode::MisplacedModifier,
                    );
                }
                match self.parse_attribute(readonly) {
                    Some(attr) => contents.push(InterfaceMember::Attribute(attr)),
                    None => self.synchronize(),
                }
            } else if self.current.kind.is_definition_start() {
                if readonly || oneway {
                    self.error_at_current(
                        "'readonly' and 'oneway' can only be applied to attributes and operations",
                        ErrorCode::MisplacedModifier,
                    );
                }
                match self.parse_definition() {
                    Some(def) => contents.push(InterfaceMember::Nested(def)),
                    None => self.synchronize(),
                }
            } else {
                // Anything else must be an operation: a return type followed
                // by the operation name.
                if readonly {
                    self.error_at_current(
                        "'readonly' can only be applied to attributes",
                        ErrorCode::MisplacedModifier,
                    );
                }
                let Some(return_type) = self.parse_type_spec() else {
                    self.synchronize();
                    continue;
                };
                let Some(op_name) = self.expect_identifier("Expected operation name") else {
                    self.synchronize();
                    continue;
                };
                match self.parse_operation(return_type, op_name, oneway) {
                    Some(op) => contents.push(InterfaceMember::Operation(op)),
                    None => self.synchronize(),
                }
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of interface");
        self.expect_semicolon();
        self.symbols.leave_scope();

        Some(InterfaceNode {
            name: name_token.text,
            bases,
            contents,
            is_abstract,
            is_local,
            is_forward: false,
            location,
        })
    }

    fn parse_struct(&mut self) -> Option<StructNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwStruct, "Expected 'struct'");

        let name_token = self.expect_identifier("Expected struct name")?;

        // Forward declaration.
        if self.try_consume(TokenKind::Semicolon) {
            self.define(&name_token, SymbolKind::Struct, None);
            return Some(StructNode {
                name: name_token.text,
                members: Vec::new(),
                is_forward: true,
                location,
            });
        }

        self.define(&name_token, SymbolKind::Struct, None);
        self.symbols.enter_scope(&name_token.text);

        self.expect(TokenKind::LeftBrace, "Expected '{' after struct name");

        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let before = self.current.span.start;
            match self.parse_members() {
                Some(parsed) => members.extend(parsed),
                None => {
                    self.synchronize();
                    // A definition keyword inside a struct body is not a
                    // member; bail out so the enclosing level reparses it.
                    if self.current.span.start == before {
                        break;
                    }
                }
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of struct");
        self.expect_semicolon();
        self.symbols.leave_scope();

        Some(StructNode {
            name: name_token.text,
            members,
            is_forward: false,
            location,
        })
    }

    fn parse_union(&mut self) -> Option<UnionNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwUnion, "Expected 'union'");

        let name_token = self.expect_identifier("Expected union name")?;

        self.expect(TokenKind::KwSwitch, "Expected 'switch' after union name");
        self.expect(TokenKind::LeftParen, "Expected '(' after 'switch'");

        let Some(discriminator) = self.parse_type_spec() else {
            self.error_at_current("Expected discriminator type", ErrorCode::ExpectedType);
            return None;
        };

        self.expect(TokenKind::RightParen, "Expected ')' after discriminator type");

        self.define(&name_token, SymbolKind::Union, None);
        self.symbols.enter_scope(&name_token.text);

        self.expect(TokenKind::LeftBrace, "Expected '{' after union switch");

        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let before = self.current.span.start;
            match self.parse_union_case() {
                Some(case) => cases.push(case),
                None => {
                    self.synchronize();
                    if self.current.span.start == before {
                        break;
                    }
                }
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of union");
        self.expect_semicolon();
        self.symbols.leave_scope();

        Some(UnionNode {
            name: name_token.text,
            discriminator,
            cases,
            location,
        })
    }

    fn parse_union_case(&mut self) -> Option<UnionCase> {
        let location = self.current.location.clone();
        let mut labels = Vec::new();

        // One member may carry several labels: `case 2: case 3: long b;`
        while self.check(TokenKind::KwCase) || self.check(TokenKind::KwDefault) {
            if self.try_consume(TokenKind::KwDefault) {
                self.expect(TokenKind::Colon, "Expected ':' after 'default'");
                labels.push(CaseLabel::Default);
            } else {
                self.advance(); // consume 'case'
                let value = self.parse_const_expr();
                self.expect(TokenKind::Colon, "Expected ':' after case value");
                labels.push(CaseLabel::Value(value));
            }
        }

        if labels.is_empty() {
            self.error_at_current("Expected 'case' or 'default'", ErrorCode::UnexpectedToken);
            return None;
        }

        let Some(ty) = self.parse_type_spec() else {
            self.error_at_current("Expected type in union case", ErrorCode::ExpectedType);
            return None;
        };

        let name_token = self.expect_identifier("Expected member name in union case")?;
        self.expect_semicolon();

        Some(UnionCase {
            labels,
            ty,
            name: name_token.text,
            location,
        })
    }

    fn parse_enum(&mut self) -> Option<EnumNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwEnum, "Expected 'enum'");

        let name_token = self.expect_identifier("Expected enum name")?;

        self.expect(TokenKind::LeftBrace, "Expected '{' after enum name");

        let mut enumerator_tokens = Vec::new();
        loop {
            if !self.check(TokenKind::Identifier) {
                self.error_at_current("Expected enumerator name", ErrorCode::ExpectedIdentifier);
                break;
            }
            enumerator_tokens.push(self.advance());
            if !self.try_consume(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of enum");
        self.expect_semicolon();

        self.define(&name_token, SymbolKind::Enum, None);
        // Enumerators are introduced into the scope surrounding the enum,
        // carrying their ordinal for constant folding.
        for (ordinal, token) in enumerator_tokens.iter().enumerate() {
            self.define(
                token,
                SymbolKind::EnumValue,
                Some(ConstValue::Int(ordinal as i64)),
            );
        }

        Some(EnumNode {
            name: name_token.text,
            enumerators: enumerator_tokens.into_iter().map(|t| t.text).collect(),
            location,
        })
    }

    fn parse_typedef(&mut self) -> Option<TypedefNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwTypedef, "Expected 'typedef'");

        let Some(source) = self.parse_type_spec() else {
            self.error_at_current("Expected type specification", ErrorCode::ExpectedType);
            return None;
        };

        let declarators = self.parse_declarators();
        if declarators.is_empty() {
            self.error_at_current("Expected declarator", ErrorCode::ExpectedIdentifier);
            return None;
        }

        self.expect_semicolon();

        for decl in &declarators {
            self.define(&decl.token, SymbolKind::Typedef, None);
        }

        Some(TypedefNode {
            source,
            declarators: declarators
                .into_iter()
                .map(|d| TypedefDeclarator {
                    name: d.token.text,
                    array_dimensions: d.array_dimensions,
                })
                .collect(),
            location,
        })
    }

    fn parse_const(&mut self) -> Option<ConstNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwConst, "Expected 'const'");

        let Some(ty) = self.parse_type_spec() else {
            self.error_at_current("Expected const type", ErrorCode::ExpectedType);
            return None;
        };

        let name_token = self.expect_identifier("Expected const name")?;

        self.expect(TokenKind::Equals, "Expected '=' after const name");
        let value = self.parse_const_expr();
        self.expect_semicolon();

        self.define(&name_token, SymbolKind::Constant, Some(value.clone()));

        Some(ConstNode {
            name: name_token.text,
            ty,
            value,
            location,
        })
    }

    fn parse_exception(&mut self) -> Option<ExceptionNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwException, "Expected 'exception'");

        let name_token = self.expect_identifier("Expected exception name")?;

        self.define(&name_token, SymbolKind::Exception, None);
        self.symbols.enter_scope(&name_token.text);

        self.expect(TokenKind::LeftBrace, "Expected '{' after exception name");

        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let before = self.current.span.start;
            match self.parse_members() {
                Some(parsed) => members.extend(parsed),
                None => {
                    self.synchronize();
                    if self.current.span.start == before {
                        break;
                    }
                }
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of exception");
        self.expect_semicolon();
        self.symbols.leave_scope();

        Some(ExceptionNode {
            name: name_token.text,
            members,
            location,
        })
    }

    /// Parse one member line of a struct or exception body. A single line
    /// may declare several members (`long a, b;`); array declarators wrap
    /// the member type.
    fn parse_members(&mut self) -> Option<Vec<StructMember>> {
        let location = self.current.location.clone();

        let ty = self.parse_type_spec()?;

        let declarators = self.parse_declarators();
        if declarators.is_empty() {
            self.error_at_current("Expected member name", ErrorCode::ExpectedIdentifier);
            return None;
        }

        self.expect_semicolon();

        let members = declarators
            .into_iter()
            .map(|decl| {
                let member_ty = if decl.array_dimensions.is_empty() {
                    ty.clone()
                } else {
                    TypeNode::Array {
                        element: Box::new(ty.clone()),
                        dimensions: decl.array_dimensions,
                        location: decl.token.location.clone(),
                    }
                };
                StructMember {
                    ty: member_ty,
                    name: decl.token.text,
                    location: location.clone(),
                }
            })
            .collect();

        Some(members)
    }

    // ============================================================
    // Interface members
    // ============================================================

    fn parse_operation(
        &mut self,
        return_type: TypeNode,
        name_token: crate::lexer::Token,
        is_oneway: bool,
    ) -> Option<OperationNode> {
        let location = name_token.location.clone();

        self.expect(TokenKind::LeftParen, "Expected '(' after operation name");

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if let Some(param) = self.parse_parameter() {
                    parameters.push(param);
                }
                if !self.try_consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "Expected ')' after parameters");

        let raises = if self.check(TokenKind::KwRaises) {
            self.parse_raises()
        } else {
            Vec::new()
        };

        self.expect_semicolon();

        self.define(&name_token, SymbolKind::Operation, None);

        Some(OperationNode {
            name: name_token.text,
            return_type,
            parameters,
            raises,
            is_oneway,
            location,
        })
    }

    fn parse_attribute(&mut self, is_readonly: bool) -> Option<AttributeNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwAttribute, "Expected 'attribute'");

        let Some(ty) = self.parse_type_spec() else {
            self.error_at_current("Expected attribute type", ErrorCode::ExpectedType);
            return None;
        };

        let name_token = self.expect_identifier("Expected attribute name")?;
        self.expect_semicolon();

        self.define(&name_token, SymbolKind::Attribute, None);

        Some(AttributeNode {
            name: name_token.text,
            ty,
            is_readonly,
            location,
        })
    }

    fn parse_parameter(&mut self) -> Option<ParameterNode> {
        let location = self.current.location.clone();

        let direction = self.parse_param_direction();

        let Some(ty) = self.parse_type_spec() else {
            self.error_at_current("Expected parameter type", ErrorCode::ExpectedType);
            return None;
        };

        let name_token = self.expect_identifier("Expected parameter name")?;

        Some(ParameterNode {
            direction,
            ty,
            name: name_token.text,
            location,
        })
    }

    fn parse_param_direction(&mut self) -> ParamDirection {
        if self.try_consume(TokenKind::KwIn) {
            ParamDirection::In
        } else if self.try_consume(TokenKind::KwOut) {
            ParamDirection::Out
        } else if self.try_consume(TokenKind::KwInout) {
            ParamDirection::InOut
        } else {
            // Tolerated: an omitted direction defaults to `in`.
            ParamDirection::In
        }
    }
}
