//! Synthesizes the declaration AST from the canonical SDL.
//!
//! One declaration per named type, in canonical definition order, so
//! regeneration over an unchanged schema is byte-stable.

mod type_map;

use std::collections::HashSet;

use async_graphql_parser::parse_schema;
use async_graphql_parser::types::{
  FieldDefinition, InputValueDefinition, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;

use self::type_map::TypeMapper;
use crate::generator::ast::{Argument, Declaration, DeclarationKind, DefinitionsFile, Member, TypeExpr};
use crate::generator::errors::GenerateError;
use crate::generator::options::{GenerationOptions, OutputAs};

/// Type names the federation machinery adds to a composed schema. They
/// describe the distributed wiring, not the application's data shape.
const FEDERATION_TYPES: [&str; 4] = ["_Any", "_Entity", "_Service", "_FieldSet"];
const FEDERATION_PREFIXES: [&str; 4] = ["join__", "link__", "core__", "federation__"];
const FEDERATION_FIELDS: [&str; 2] = ["_entities", "_service"];

pub fn explore(
  canonical_sdl: &str,
  options: &GenerationOptions,
  output_as: OutputAs,
  federation: bool,
) -> Result<DefinitionsFile, GenerateError> {
  let document = parse_schema(canonical_sdl)
    .map_err(|err| GenerateError::schema_build(format!("canonical schema failed to parse: {err}")))?;

  let custom_scalars: HashSet<String> = document
    .definitions
    .iter()
    .filter_map(|definition| match definition {
      TypeSystemDefinition::Type(ty) if matches!(ty.node.kind, TypeKind::Scalar) => {
        Some(ty.node.name.node.to_string())
      }
      _ => None,
    })
    .collect();

  let mut explorer = Explorer {
    mapper: TypeMapper::new(options, custom_scalars),
    options,
    output_as,
    federation,
    uses_nullable: false,
  };

  let mut declarations = Vec::new();
  for definition in &document.definitions {
    let TypeSystemDefinition::Type(ty) = definition else {
      continue;
    };
    if let Some(declaration) = explorer.declare(&ty.node) {
      declarations.push(declaration);
    }
  }

  Ok(DefinitionsFile {
    declarations,
    uses_nullable: explorer.uses_nullable,
  })
}

struct Explorer<'a> {
  mapper: TypeMapper<'a>,
  options: &'a GenerationOptions,
  output_as: OutputAs,
  federation: bool,
  uses_nullable: bool,
}

impl Explorer<'_> {
  fn declare(&mut self, definition: &TypeDefinition) -> Option<Declaration> {
    let name = definition.name.node.to_string();
    if self.federation && is_federation_type(&name) {
      return None;
    }

    let kind = match &definition.kind {
      TypeKind::Object(object) => DeclarationKind::Object {
        output_as: self.output_as,
        implements: object.implements.iter().map(|name| name.node.to_string()).collect(),
        members: self.object_members(&name, &object.fields, true),
      },
      TypeKind::Interface(interface) => DeclarationKind::Interface {
        output_as: self.output_as,
        members: self.object_members(&name, &interface.fields, false),
      },
      TypeKind::InputObject(input) => DeclarationKind::Input {
        output_as: self.output_as,
        members: self.input_members(&input.fields),
      },
      TypeKind::Enum(enumeration) => DeclarationKind::Enum {
        as_type: self.options.enums_as_types,
        values: enumeration
          .values
          .iter()
          .map(|value| value.node.value.node.to_string())
          .collect(),
      },
      TypeKind::Union(union) => DeclarationKind::Union {
        members: union.members.iter().map(|member| member.node.to_string()).collect(),
      },
      TypeKind::Scalar => DeclarationKind::Scalar {
        target: self.mapper.scalar_target(&name),
      },
    };

    Some(Declaration { name, kind })
  }

  fn object_members(
    &mut self,
    type_name: &str,
    fields: &[Positioned<FieldDefinition>],
    is_object: bool,
  ) -> Vec<Member> {
    let mut members = Vec::with_capacity(fields.len() + 1);

    if is_object && self.options.emit_typename_field {
      members.push(Member {
        name: "__typename".to_string(),
        ty: TypeExpr::named("string"),
        nullable: false,
        arguments: Vec::new(),
        literal_value: Some(type_name.to_string()),
      });
    }

    for field in fields {
      let field_name = field.node.name.node.as_str();
      if self.federation && FEDERATION_FIELDS.contains(&field_name) {
        continue;
      }

      let (ty, nullable) = self.type_expr(&field.node);
      let arguments = if self.options.skip_resolver_args {
        Vec::new()
      } else {
        field.node.arguments.iter().map(|arg| self.argument(&arg.node)).collect()
      };

      members.push(Member {
        name: field_name.to_string(),
        ty,
        nullable,
        arguments,
        literal_value: None,
      });
    }

    members
  }

  fn input_members(&mut self, fields: &[Positioned<InputValueDefinition>]) -> Vec<Member> {
    fields
      .iter()
      .map(|field| {
        let (ty, nullable) = self.mapped(&field.node.ty.node);
        Member {
          name: field.node.name.node.to_string(),
          ty,
          nullable,
          arguments: Vec::new(),
          literal_value: None,
        }
      })
      .collect()
  }

  fn argument(&mut self, argument: &InputValueDefinition) -> Argument {
    let (ty, nullable) = self.mapped(&argument.ty.node);
    let optional = nullable || argument.default_value.is_some();
    if optional {
      self.uses_nullable = true;
    }
    Argument {
      name: argument.name.node.to_string(),
      ty,
      optional,
    }
  }

  fn type_expr(&mut self, field: &FieldDefinition) -> (TypeExpr, bool) {
    self.mapped(&field.ty.node)
  }

  fn mapped(&mut self, ty: &async_graphql_parser::types::Type) -> (TypeExpr, bool) {
    let (expr, nullable) = self.mapper.type_expr(ty);
    if nullable || has_nullable_items(&expr) {
      self.uses_nullable = true;
    }
    (expr, nullable)
  }
}

fn has_nullable_items(expr: &TypeExpr) -> bool {
  match expr {
    TypeExpr::Named(_) => false,
    TypeExpr::List { of, nullable_items } => *nullable_items || has_nullable_items(of),
  }
}

fn is_federation_type(name: &str) -> bool {
  FEDERATION_TYPES.contains(&name) || FEDERATION_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
