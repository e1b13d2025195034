//! GraphQL type reference to target type mapping.

use std::collections::HashSet;

use async_graphql_parser::types::{BaseType, Type};

use crate::generator::ast::TypeExpr;
use crate::generator::options::GenerationOptions;

const STRING_TARGET: &str = "string";
const NUMBER_TARGET: &str = "number";
const BOOLEAN_TARGET: &str = "boolean";

fn built_in_target(name: &str) -> Option<&'static str> {
  match name {
    "String" | "ID" => Some(STRING_TARGET),
    "Int" | "Float" => Some(NUMBER_TARGET),
    "Boolean" => Some(BOOLEAN_TARGET),
    _ => None,
  }
}

/// Resolves GraphQL type references against the generation options and the
/// set of custom scalars declared by the canonical schema.
pub(crate) struct TypeMapper<'a> {
  options: &'a GenerationOptions,
  custom_scalars: HashSet<String>,
}

impl<'a> TypeMapper<'a> {
  pub(crate) fn new(options: &'a GenerationOptions, custom_scalars: HashSet<String>) -> Self {
    Self {
      options,
      custom_scalars,
    }
  }

  /// Target type for one named GraphQL type. Built-in scalars use the fixed
  /// equivalents unless overridden; custom scalars use the mapping table or
  /// the default scalar type; everything else is referenced by its own name.
  pub(crate) fn target_for(&self, name: &str) -> String {
    if let Some(built_in) = built_in_target(name) {
      return self
        .options
        .default_type_mapping
        .get(name)
        .cloned()
        .unwrap_or_else(|| built_in.to_string());
    }

    if self.custom_scalars.contains(name) {
      return self.scalar_target(name);
    }

    name.to_string()
  }

  /// Target type for a custom scalar declaration.
  pub(crate) fn scalar_target(&self, name: &str) -> String {
    self
      .options
      .custom_scalar_type_mapping
      .get(name)
      .cloned()
      .unwrap_or_else(|| self.options.default_scalar_type.clone())
  }

  /// Maps a full type reference. The boolean is the outermost nullability;
  /// nullability is opt-out, so a reference without `!` comes back nullable.
  pub(crate) fn type_expr(&self, ty: &Type) -> (TypeExpr, bool) {
    match &ty.base {
      BaseType::Named(name) => (TypeExpr::named(self.target_for(name.as_str())), ty.nullable),
      BaseType::List(inner) => {
        let (of, nullable_items) = self.type_expr(inner);
        (
          TypeExpr::List {
            of: Box::new(of),
            nullable_items,
          },
          ty.nullable,
        )
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use async_graphql_parser::parse_schema;
  use async_graphql_parser::types::{TypeKind, TypeSystemDefinition};

  use super::*;

  fn field_type(sdl: &str) -> Type {
    let document = parse_schema(sdl).unwrap();
    for definition in document.definitions {
      if let TypeSystemDefinition::Type(ty) = definition {
        if let TypeKind::Object(object) = ty.node.kind {
          return object.fields[0].node.ty.node.clone();
        }
      }
    }
    panic!("no object field in {sdl}");
  }

  #[test]
  fn built_ins_map_to_fixed_targets() {
    let options = GenerationOptions::default();
    let mapper = TypeMapper::new(&options, HashSet::new());
    assert_eq!(mapper.target_for("String"), "string");
    assert_eq!(mapper.target_for("ID"), "string");
    assert_eq!(mapper.target_for("Int"), "number");
    assert_eq!(mapper.target_for("Float"), "number");
    assert_eq!(mapper.target_for("Boolean"), "boolean");
  }

  #[test]
  fn default_type_mapping_overrides_built_ins() {
    let mut options = GenerationOptions::default();
    options.default_type_mapping.insert("ID".to_string(), "number".to_string());
    let mapper = TypeMapper::new(&options, HashSet::new());
    assert_eq!(mapper.target_for("ID"), "number");
    assert_eq!(mapper.target_for("String"), "string");
  }

  #[test]
  fn unmapped_custom_scalars_fall_back_to_the_default_scalar_type() {
    let options = GenerationOptions::default();
    let mapper = TypeMapper::new(&options, HashSet::from(["DateTime".to_string()]));
    assert_eq!(mapper.target_for("DateTime"), "any");

    let mut options = GenerationOptions::default();
    options.default_scalar_type = "unknown".to_string();
    let mapper = TypeMapper::new(&options, HashSet::from(["DateTime".to_string()]));
    assert_eq!(mapper.target_for("DateTime"), "unknown");
  }

  #[test]
  fn mapped_custom_scalars_use_the_mapping_table() {
    let mut options = GenerationOptions::default();
    options
      .custom_scalar_type_mapping
      .insert("DateTime".to_string(), "Date".to_string());
    let mapper = TypeMapper::new(&options, HashSet::from(["DateTime".to_string()]));
    assert_eq!(mapper.target_for("DateTime"), "Date");
  }

  #[test]
  fn non_null_removes_the_default_nullability() {
    let options = GenerationOptions::default();
    let mapper = TypeMapper::new(&options, HashSet::new());

    let (_, nullable) = mapper.type_expr(&field_type("type T { f: String }"));
    assert!(nullable);
    let (_, nullable) = mapper.type_expr(&field_type("type T { f: String! }"));
    assert!(!nullable);
  }

  #[test]
  fn list_nesting_keeps_item_nullability_per_level() {
    let options = GenerationOptions::default();
    let mapper = TypeMapper::new(&options, HashSet::new());

    let (expr, nullable) = mapper.type_expr(&field_type("type T { f: [[String!]]! }"));
    assert!(!nullable);
    assert_eq!(expr.list_depth(), 2);
    let TypeExpr::List { of, nullable_items } = expr else {
      panic!("expected list");
    };
    assert!(nullable_items, "inner lists are nullable");
    let TypeExpr::List { nullable_items, .. } = *of else {
      panic!("expected nested list");
    };
    assert!(!nullable_items, "items are non-null strings");
  }
}
