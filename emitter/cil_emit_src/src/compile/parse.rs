//! Recursive-descent parser for the declaration dialect.

use cil_image::AttrValue;

use super::scan::{Spanned, Token};
use super::CompileError;

/// A parsed compilation unit.
#[derive(Debug, Default)]
pub struct SourceUnit {
    /// Assembly attributes in source order: (short name, args).
    pub attributes: Vec<(String, Vec<AttrValue>)>,
    pub namespaces: Vec<NsDecl>,
}

/// A namespace block.
#[derive(Debug)]
pub struct NsDecl {
    pub name: String,
    pub types: Vec<TypeDecl>,
}

/// A parsed type declaration.
#[derive(Debug)]
pub struct TypeDecl {
    pub name: String,
    pub is_abstract: bool,
    pub kind: TypeDeclKind,
}

/// Kind payload of a type declaration.
#[derive(Debug)]
pub enum TypeDeclKind {
    Class {
        base: Option<String>,
        members: Vec<MemberDecl>,
    },
    Struct {
        members: Vec<MemberDecl>,
    },
    Interface {
        members: Vec<MemberDecl>,
    },
    Enum {
        literals: Vec<String>,
    },
    Delegate,
}

/// A parsed member declaration.
#[derive(Debug, PartialEq, Eq)]
pub enum MemberDecl {
    Method(String),
    AutoProperty(String),
    Indexer(String),
    FieldEvent(String),
    Constant(String),
}

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn line(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].token.clone();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.line(), message)
    }

    fn expect_punct(&mut self, c: char) -> Result<(), CompileError> {
        match self.bump() {
            Token::Punct(p) if p == c => Ok(()),
            other => Err(self.error(format!("expected `{c}`, found {other:?}"))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match self.bump() {
            Token::Ident(name) => Ok(name),
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), CompileError> {
        let name = self.expect_ident()?;
        if name == word {
            Ok(())
        } else {
            Err(self.error(format!("expected `{word}`, found `{name}`")))
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if *self.peek() == Token::Punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name == word)
    }

    /// Dotted name: `A` or `A.B.C`.
    fn dotted_name(&mut self) -> Result<String, CompileError> {
        let mut name = self.expect_ident()?;
        while self.eat_punct('.') {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    /// Parse the whole unit.
    pub fn parse_unit(&mut self) -> Result<SourceUnit, CompileError> {
        let mut unit = SourceUnit::default();
        loop {
            let next = self.peek().clone();
            match next {
                Token::Eof => break,
                Token::Ident(word) if word == "using" => {
                    self.bump();
                    self.dotted_name()?;
                    self.expect_punct(';')?;
                }
                Token::Punct('[') => {
                    let attr = self.parse_assembly_attribute()?;
                    unit.attributes.push(attr);
                }
                Token::Ident(word) if word == "namespace" => {
                    self.bump();
                    let name = self.dotted_name()?;
                    self.expect_punct('{')?;
                    let mut types = Vec::new();
                    while !self.eat_punct('}') {
                        types.push(self.parse_type()?);
                    }
                    unit.namespaces.push(NsDecl { name, types });
                }
                other => return Err(self.error(format!("unexpected {other:?} at top level"))),
            }
        }
        Ok(unit)
    }

    fn parse_assembly_attribute(&mut self) -> Result<(String, Vec<AttrValue>), CompileError> {
        self.expect_punct('[')?;
        self.expect_keyword("assembly")?;
        self.expect_punct(':')?;
        let name = self.expect_ident()?;
        self.expect_punct('(')?;
        let mut args = Vec::new();
        if !self.eat_punct(')') {
            loop {
                args.push(self.parse_attr_value()?);
                if self.eat_punct(')') {
                    break;
                }
                self.expect_punct(',')?;
            }
        }
        self.expect_punct(']')?;
        Ok((name, args))
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue, CompileError> {
        match self.bump() {
            Token::Str(text) => Ok(AttrValue::Str(text)),
            Token::Int(value) => Ok(AttrValue::Int(value)),
            Token::Ident(word) if word == "true" => Ok(AttrValue::Bool(true)),
            Token::Ident(word) if word == "false" => Ok(AttrValue::Bool(false)),
            Token::Ident(name) => {
                self.expect_punct('=')?;
                let value = self.parse_attr_value()?;
                Ok(AttrValue::Named(name, Box::new(value)))
            }
            other => Err(self.error(format!("bad attribute argument {other:?}"))),
        }
    }

    fn parse_type(&mut self) -> Result<TypeDecl, CompileError> {
        self.expect_keyword("public")?;
        let mut is_abstract = false;
        if self.at_ident("abstract") {
            self.bump();
            is_abstract = true;
        }
        let keyword = self.expect_ident()?;
        match keyword.as_str() {
            "class" => {
                let name = self.expect_ident()?;
                let base = if self.eat_punct(':') {
                    Some(self.dotted_name()?)
                } else {
                    None
                };
                let members = self.parse_member_block(true)?;
                Ok(TypeDecl {
                    name,
                    is_abstract,
                    kind: TypeDeclKind::Class { base, members },
                })
            }
            "struct" => {
                let name = self.expect_ident()?;
                let members = self.parse_member_block(true)?;
                Ok(TypeDecl {
                    name,
                    is_abstract,
                    kind: TypeDeclKind::Struct { members },
                })
            }
            "interface" => {
                let name = self.expect_ident()?;
                let members = self.parse_member_block(false)?;
                Ok(TypeDecl {
                    name,
                    is_abstract: true,
                    kind: TypeDeclKind::Interface { members },
                })
            }
            "enum" => {
                let name = self.expect_ident()?;
                self.expect_punct('{')?;
                let mut literals = Vec::new();
                while !self.eat_punct('}') {
                    literals.push(self.expect_ident()?);
                    // Trailing comma allowed.
                    self.eat_punct(',');
                }
                Ok(TypeDecl {
                    name,
                    is_abstract: false,
                    kind: TypeDeclKind::Enum { literals },
                })
            }
            "delegate" => {
                self.expect_keyword("void")?;
                let name = self.expect_ident()?;
                self.expect_punct('(')?;
                self.expect_punct(')')?;
                self.expect_punct(';')?;
                Ok(TypeDecl {
                    name,
                    is_abstract: false,
                    kind: TypeDeclKind::Delegate,
                })
            }
            other => Err(self.error(format!("unknown type keyword `{other}`"))),
        }
    }

    fn parse_member_block(&mut self, modifiers: bool) -> Result<Vec<MemberDecl>, CompileError> {
        self.expect_punct('{')?;
        let mut members = Vec::new();
        while !self.eat_punct('}') {
            members.push(self.parse_member(modifiers)?);
        }
        Ok(members)
    }

    fn parse_member(&mut self, modifiers: bool) -> Result<MemberDecl, CompileError> {
        if modifiers {
            self.expect_keyword("public")?;
            if self.at_ident("abstract") {
                self.bump();
            }
        }
        if self.at_ident("event") {
            self.bump();
            self.expect_keyword("EventHandler")?;
            let name = self.expect_ident()?;
            self.expect_punct(';')?;
            return Ok(MemberDecl::FieldEvent(name));
        }
        let ty = self.expect_ident()?;
        let name = self.expect_ident()?;
        let next = self.peek().clone();
        match (ty.as_str(), &next) {
            ("void", Token::Punct('(')) => {
                self.bump();
                self.expect_punct(')')?;
                if self.eat_punct(';') {
                    // Declaration only.
                } else {
                    self.expect_punct('{')?;
                    self.expect_punct('}')?;
                }
                Ok(MemberDecl::Method(name))
            }
            ("string", Token::Punct('{')) => {
                self.parse_accessor_pair()?;
                Ok(MemberDecl::AutoProperty(name))
            }
            ("string", Token::Punct('[')) => {
                self.bump();
                self.expect_keyword("int")?;
                self.expect_keyword("index")?;
                self.expect_punct(']')?;
                self.parse_accessor_pair()?;
                Ok(MemberDecl::Indexer(name))
            }
            ("object", Token::Punct(';')) => {
                self.bump();
                Ok(MemberDecl::Constant(name))
            }
            (ty, other) => Err(self.error(format!(
                "unsupported member shape `{ty} {name}` followed by {other:?}"
            ))),
        }
    }

    /// `{ get; set; }` in either order.
    fn parse_accessor_pair(&mut self) -> Result<(), CompileError> {
        self.expect_punct('{')?;
        let mut seen_get = false;
        let mut seen_set = false;
        while !self.eat_punct('}') {
            let word = self.expect_ident()?;
            match word.as_str() {
                "get" => seen_get = true,
                "set" => seen_set = true,
                other => return Err(self.error(format!("expected accessor, found `{other}`"))),
            }
            self.expect_punct(';')?;
        }
        if seen_get && seen_set {
            Ok(())
        } else {
            Err(self.error("property must declare both get and set"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::scan::scan;

    fn parse(source: &str) -> Result<SourceUnit, CompileError> {
        Parser::new(scan(source)?).parse_unit()
    }

    #[test]
    fn test_parse_full_type() {
        let unit = parse(
            "namespace N\n{\n    public class C : System.Uri\n    {\n        public void M() { }\n        public string P { get; set; }\n        public string I2[int index] { get; set; }\n        public event EventHandler E;\n        public object K;\n    }\n}\n",
        )
        .unwrap();
        assert_eq!(unit.namespaces.len(), 1);
        let TypeDeclKind::Class { base, members } = &unit.namespaces[0].types[0].kind else {
            panic!("expected class");
        };
        assert_eq!(base.as_deref(), Some("System.Uri"));
        assert_eq!(
            *members,
            vec![
                MemberDecl::Method("M".to_string()),
                MemberDecl::AutoProperty("P".to_string()),
                MemberDecl::Indexer("I2".to_string()),
                MemberDecl::FieldEvent("E".to_string()),
                MemberDecl::Constant("K".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_enum_and_delegate() {
        let unit = parse(
            "namespace N\n{\n    public enum E\n    {\n        Fri,\n        Sat,\n    }\n    public delegate void D();\n}\n",
        )
        .unwrap();
        let TypeDeclKind::Enum { literals } = &unit.namespaces[0].types[0].kind else {
            panic!("expected enum");
        };
        assert_eq!(*literals, vec!["Fri".to_string(), "Sat".to_string()]);
        assert!(matches!(
            unit.namespaces[0].types[1].kind,
            TypeDeclKind::Delegate
        ));
    }

    #[test]
    fn test_parse_assembly_attributes() {
        let unit = parse(
            "[assembly: AssemblyVersion(\"1.0.0.0\")]\n[assembly: RuntimeCompatibility(WrapNonExceptionThrows = true)]\n[assembly: CompilationRelaxations(8)]\n",
        )
        .unwrap();
        assert_eq!(unit.attributes.len(), 3);
        assert_eq!(
            unit.attributes[1].1,
            vec![AttrValue::Named(
                "WrapNonExceptionThrows".to_string(),
                Box::new(AttrValue::Bool(true))
            )]
        );
    }

    #[test]
    fn test_error_carries_line() {
        let err = parse("namespace N\n{\n    public widget C { }\n}\n");
        let Err(err) = err else {
            panic!("parse must fail");
        };
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_interface_members_without_modifiers() {
        let unit = parse(
            "namespace N\n{\n    public interface I\n    {\n        void M();\n        string P { get; set; }\n        event EventHandler E;\n    }\n}\n",
        )
        .unwrap();
        let TypeDeclKind::Interface { members } = &unit.namespaces[0].types[0].kind else {
            panic!("expected interface");
        };
        assert_eq!(members.len(), 3);
        assert!(unit.namespaces[0].types[0].is_abstract);
    }
}
