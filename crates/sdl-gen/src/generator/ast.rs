//! Target-language declaration AST.
//!
//! One [`Declaration`] per named GraphQL type, in canonical-SDL definition
//! order. The nodes carry every decision the generation options can influence
//! (member types are already mapped, enum representation is already chosen),
//! so rendering through [`std::fmt::Display`] is pure and deterministic.

use std::fmt;

use itertools::Itertools;

use crate::generator::options::OutputAs;

/// The whole generated definitions file, before serialization.
#[derive(Debug, Default)]
pub struct DefinitionsFile {
  pub declarations: Vec<Declaration>,
  /// Set when any member or argument is nullable, so the emitter appends the
  /// `Nullable<T>` helper alias exactly once.
  pub uses_nullable: bool,
}

#[derive(Debug)]
pub struct Declaration {
  pub name: String,
  pub kind: DeclarationKind,
}

#[derive(Debug)]
pub enum DeclarationKind {
  /// GraphQL object type.
  Object {
    output_as: OutputAs,
    implements: Vec<String>,
    members: Vec<Member>,
  },
  /// GraphQL interface type.
  Interface { output_as: OutputAs, members: Vec<Member> },
  /// GraphQL input object type. Members are plain data, never methods.
  Input { output_as: OutputAs, members: Vec<Member> },
  /// GraphQL enum type, either a TS enum or a string-literal union.
  Enum { as_type: bool, values: Vec<String> },
  /// GraphQL union type, an alias over the member type names.
  Union { members: Vec<String> },
  /// Custom scalar, an alias to the mapped target type.
  Scalar { target: String },
}

/// A field of an object-like declaration.
#[derive(Debug)]
pub struct Member {
  pub name: String,
  pub ty: TypeExpr,
  pub nullable: bool,
  /// Non-empty turns the member into a method signature; emptied at explore
  /// time when resolver arguments are skipped.
  pub arguments: Vec<Argument>,
  /// A `__typename` style member carrying its own literal value.
  pub literal_value: Option<String>,
}

#[derive(Debug)]
pub struct Argument {
  pub name: String,
  pub ty: TypeExpr,
  pub optional: bool,
}

/// A mapped target type expression. List nesting mirrors the GraphQL list
/// modifiers, including per-level item nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
  Named(String),
  List { of: Box<TypeExpr>, nullable_items: bool },
}

impl TypeExpr {
  pub fn named(name: impl Into<String>) -> Self {
    TypeExpr::Named(name.into())
  }

  #[allow(unused)]
  pub fn list_depth(&self) -> usize {
    match self {
      TypeExpr::Named(_) => 0,
      TypeExpr::List { of, .. } => 1 + of.list_depth(),
    }
  }
}

impl fmt::Display for TypeExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeExpr::Named(name) => f.write_str(name),
      TypeExpr::List { of, nullable_items } => {
        if *nullable_items {
          write!(f, "Nullable<{of}>[]")
        } else {
          write!(f, "{of}[]")
        }
      }
    }
  }
}

impl Member {
  fn is_method(&self) -> bool {
    !self.arguments.is_empty()
  }

  fn write(&self, f: &mut fmt::Formatter<'_>, in_class: bool) -> fmt::Result {
    if let Some(literal) = &self.literal_value {
      return writeln!(f, "  {}?: '{literal}';", self.name);
    }

    if self.is_method() {
      let params = self
        .arguments
        .iter()
        .map(|arg| {
          let marker = if arg.optional { "?" } else { "" };
          let ty = if arg.optional {
            format!("Nullable<{}>", arg.ty)
          } else {
            arg.ty.to_string()
          };
          format!("{}{marker}: {ty}", arg.name)
        })
        .join(", ");
      let ret = if self.nullable {
        format!("Nullable<{}>", self.ty)
      } else {
        self.ty.to_string()
      };
      let prefix = if in_class { "abstract " } else { "" };
      return writeln!(f, "  {prefix}{}({params}): {ret};", self.name);
    }

    if self.nullable {
      writeln!(f, "  {}?: Nullable<{}>;", self.name, self.ty)
    } else {
      writeln!(f, "  {}: {};", self.name, self.ty)
    }
  }
}

fn write_members(f: &mut fmt::Formatter<'_>, members: &[Member], in_class: bool) -> fmt::Result {
  for member in members {
    member.write(f, in_class)?;
  }
  Ok(())
}

impl fmt::Display for Declaration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      DeclarationKind::Object {
        output_as,
        implements,
        members,
      } => {
        let has_methods = members.iter().any(Member::is_method);
        match output_as {
          OutputAs::Class => {
            let qualifier = if has_methods { "abstract class" } else { "class" };
            write!(f, "export {qualifier} {}", self.name)?;
            if !implements.is_empty() {
              write!(f, " implements {}", implements.join(", "))?;
            }
            writeln!(f, " {{")?;
            write_members(f, members, true)?;
          }
          OutputAs::Interface => {
            write!(f, "export interface {}", self.name)?;
            if !implements.is_empty() {
              write!(f, " extends {}", implements.join(", "))?;
            }
            writeln!(f, " {{")?;
            write_members(f, members, false)?;
          }
        }
        write!(f, "}}")
      }
      DeclarationKind::Interface { output_as, members } => {
        match output_as {
          OutputAs::Class => {
            let has_methods = members.iter().any(Member::is_method);
            let qualifier = if has_methods { "abstract class" } else { "class" };
            writeln!(f, "export {qualifier} {} {{", self.name)?;
            write_members(f, members, true)?;
          }
          OutputAs::Interface => {
            writeln!(f, "export interface {} {{", self.name)?;
            write_members(f, members, false)?;
          }
        }
        write!(f, "}}")
      }
      DeclarationKind::Input { output_as, members } => {
        match output_as {
          OutputAs::Class => writeln!(f, "export class {} {{", self.name)?,
          OutputAs::Interface => writeln!(f, "export interface {} {{", self.name)?,
        }
        write_members(f, members, false)?;
        write!(f, "}}")
      }
      DeclarationKind::Enum { as_type, values } => {
        if *as_type {
          let union = values.iter().map(|value| format!("'{value}'")).join(" | ");
          write!(f, "export type {} = {union};", self.name)
        } else {
          writeln!(f, "export enum {} {{", self.name)?;
          for value in values {
            writeln!(f, "  {value} = \"{value}\",")?;
          }
          write!(f, "}}")
        }
      }
      DeclarationKind::Union { members } => {
        write!(f, "export type {} = {};", self.name, members.join(" | "))
      }
      DeclarationKind::Scalar { target } => {
        write!(f, "export type {} = {target};", self.name)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn member(name: &str, ty: TypeExpr, nullable: bool) -> Member {
    Member {
      name: name.to_string(),
      ty,
      nullable,
      arguments: Vec::new(),
      literal_value: None,
    }
  }

  #[test]
  fn class_declaration_renders_properties() {
    let decl = Declaration {
      name: "Book".to_string(),
      kind: DeclarationKind::Object {
        output_as: OutputAs::Class,
        implements: Vec::new(),
        members: vec![
          member("id", TypeExpr::named("string"), false),
          member("title", TypeExpr::named("string"), true),
        ],
      },
    };

    let rendered = decl.to_string();
    assert_eq!(
      rendered,
      "export class Book {\n  id: string;\n  title?: Nullable<string>;\n}"
    );
  }

  #[test]
  fn interface_declaration_extends_implemented_interfaces() {
    let decl = Declaration {
      name: "Book".to_string(),
      kind: DeclarationKind::Object {
        output_as: OutputAs::Interface,
        implements: vec!["Node".to_string(), "Titled".to_string()],
        members: vec![member("id", TypeExpr::named("string"), false)],
      },
    };

    assert!(decl.to_string().starts_with("export interface Book extends Node, Titled {"));
  }

  #[test]
  fn method_members_make_the_class_abstract() {
    let decl = Declaration {
      name: "Query".to_string(),
      kind: DeclarationKind::Object {
        output_as: OutputAs::Class,
        implements: Vec::new(),
        members: vec![Member {
          name: "books".to_string(),
          ty: TypeExpr::List {
            of: Box::new(TypeExpr::named("Book")),
            nullable_items: false,
          },
          nullable: true,
          arguments: vec![Argument {
            name: "limit".to_string(),
            ty: TypeExpr::named("number"),
            optional: true,
          }],
          literal_value: None,
        }],
      },
    };

    let rendered = decl.to_string();
    assert!(rendered.starts_with("export abstract class Query {"));
    assert!(rendered.contains("abstract books(limit?: Nullable<number>): Nullable<Book[]>;"));
  }

  #[test]
  fn enum_renders_both_representations() {
    let values = vec!["ACTIVE".to_string(), "INACTIVE".to_string()];
    let as_enum = Declaration {
      name: "Status".to_string(),
      kind: DeclarationKind::Enum {
        as_type: false,
        values: values.clone(),
      },
    };
    let as_type = Declaration {
      name: "Status".to_string(),
      kind: DeclarationKind::Enum { as_type: true, values },
    };

    assert_eq!(
      as_enum.to_string(),
      "export enum Status {\n  ACTIVE = \"ACTIVE\",\n  INACTIVE = \"INACTIVE\",\n}"
    );
    assert_eq!(as_type.to_string(), "export type Status = 'ACTIVE' | 'INACTIVE';");
  }

  #[test]
  fn nested_list_nullability_is_preserved() {
    let expr = TypeExpr::List {
      of: Box::new(TypeExpr::List {
        of: Box::new(TypeExpr::named("string")),
        nullable_items: true,
      }),
      nullable_items: false,
    };

    assert_eq!(expr.to_string(), "Nullable<string>[][]");
    assert_eq!(expr.list_depth(), 2);
  }

  #[test]
  fn typename_member_renders_literal() {
    let decl = Declaration {
      name: "Book".to_string(),
      kind: DeclarationKind::Object {
        output_as: OutputAs::Interface,
        implements: Vec::new(),
        members: vec![Member {
          name: "__typename".to_string(),
          ty: TypeExpr::named("string"),
          nullable: false,
          arguments: Vec::new(),
          literal_value: Some("Book".to_string()),
        }],
      },
    };

    assert!(decl.to_string().contains("__typename?: 'Book';"));
  }
}
