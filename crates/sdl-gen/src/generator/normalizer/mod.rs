//! Builds the canonical schema from the merged SDL.
//!
//! Two mutually exclusive strategies: Regular builds a validated executable
//! document from the SDL itself, Federated hands the SDL to the composition
//! capability as a single subgraph. Both end in [`printer::print_document`],
//! so the canonical output is byte-deterministic either way.

pub(crate) mod federation;
mod printer;
mod validate;

use async_graphql_parser::types::{
  BaseType, FieldDefinition, ObjectType, SchemaDefinition, ServiceDocument, Type, TypeDefinition, TypeKind,
  TypeSystemDefinition,
};
use async_graphql_parser::{parse_schema, Pos, Positioned};
use async_graphql_value::Name;

pub use self::federation::{FederationCapability, FederationProvider, UnavailableProvider, default_provider};
use crate::generator::errors::GenerateError;

/// Synthetic field injected on a generated query root so documents without
/// one still satisfy the executable-schema shape. Stripped before the schema
/// is considered canonical; it must never reach generated output.
pub(crate) const MARKER_FIELD: &str = "temp__";

const QUERY_TYPE: &str = "Query";

/// Produces the canonical SDL for one pass.
pub fn normalize(
  merged_sdl: &str,
  federation: bool,
  provider: &dyn FederationProvider,
  subgraph_name: &str,
) -> Result<String, GenerateError> {
  if federation {
    normalize_federated(merged_sdl, provider, subgraph_name)
  } else {
    normalize_regular(merged_sdl)
  }
}

/// Regular strategy: parse, flatten extensions, inject the marker root if
/// needed, validate, strip the marker, print.
fn normalize_regular(merged_sdl: &str) -> Result<String, GenerateError> {
  let mut document = parse_merged(merged_sdl)?;
  flatten_extensions(&mut document)?;
  inject_marker_query(&mut document);
  validate::validate_document(&document)?;
  strip_marker_fields(&mut document);
  Ok(printer::print_document(&document))
}

/// Federated strategy: compose the merged SDL as one subgraph, then re-parse
/// the federation-augmented SDL and run it through the same canonical
/// printer the Regular strategy ends in.
fn normalize_federated(
  merged_sdl: &str,
  provider: &dyn FederationProvider,
  subgraph_name: &str,
) -> Result<String, GenerateError> {
  let capability = provider.load()?;
  let federated_sdl = capability.compose_subgraph(subgraph_name, merged_sdl)?;

  let mut document = parse_schema(&federated_sdl)
    .map_err(|err| GenerateError::schema_build(format!("composed schema failed to parse: {err}")))?;
  flatten_extensions(&mut document)?;
  strip_marker_fields(&mut document);
  Ok(printer::print_document(&document))
}

fn parse_merged(merged_sdl: &str) -> Result<ServiceDocument, GenerateError> {
  parse_schema(merged_sdl).map_err(|err| GenerateError::schema_build(err.to_string()))
}

/// Merges `extend` definitions into their base definitions so the canonical
/// schema is a flat document.
fn flatten_extensions(document: &mut ServiceDocument) -> Result<(), GenerateError> {
  let mut type_extensions: Vec<Positioned<TypeDefinition>> = Vec::new();
  let mut schema_extensions: Vec<Positioned<SchemaDefinition>> = Vec::new();
  let mut kept = Vec::with_capacity(document.definitions.len());

  for definition in document.definitions.drain(..) {
    match definition {
      TypeSystemDefinition::Type(ty) if ty.node.extend => type_extensions.push(ty),
      TypeSystemDefinition::Schema(schema) if schema.node.extend => schema_extensions.push(schema),
      other => kept.push(other),
    }
  }
  document.definitions = kept;

  for extension in type_extensions {
    let name = extension.node.name.node.to_string();
    let base = document.definitions.iter_mut().find_map(|definition| match definition {
      TypeSystemDefinition::Type(ty) if ty.node.name.node == extension.node.name.node => Some(ty),
      _ => None,
    });
    let Some(base) = base else {
      return Err(GenerateError::schema_build(format!("cannot extend undefined type {name:?}")));
    };
    merge_type_extension(&mut base.node, extension.node, &name)?;
  }

  for extension in schema_extensions {
    let base = document.definitions.iter_mut().find_map(|definition| match definition {
      TypeSystemDefinition::Schema(schema) => Some(schema),
      _ => None,
    });
    match base {
      Some(base) => {
        base.node.directives.extend(extension.node.directives);
        merge_root(&mut base.node.query, extension.node.query);
        merge_root(&mut base.node.mutation, extension.node.mutation);
        merge_root(&mut base.node.subscription, extension.node.subscription);
      }
      None => {
        let mut schema = extension;
        schema.node.extend = false;
        document.definitions.insert(0, TypeSystemDefinition::Schema(schema));
      }
    }
  }

  Ok(())
}

fn merge_root(base: &mut Option<Positioned<Name>>, extension: Option<Positioned<Name>>) {
  if base.is_none() {
    *base = extension;
  }
}

fn merge_type_extension(
  base: &mut TypeDefinition,
  extension: TypeDefinition,
  name: &str,
) -> Result<(), GenerateError> {
  base.directives.extend(extension.directives);

  match (&mut base.kind, extension.kind) {
    (TypeKind::Object(base_object), TypeKind::Object(extension_object)) => {
      base_object.implements.extend(extension_object.implements);
      base_object.fields.extend(extension_object.fields);
    }
    (TypeKind::Interface(base_interface), TypeKind::Interface(extension_interface)) => {
      base_interface.implements.extend(extension_interface.implements);
      base_interface.fields.extend(extension_interface.fields);
    }
    (TypeKind::Union(base_union), TypeKind::Union(extension_union)) => {
      base_union.members.extend(extension_union.members);
    }
    (TypeKind::Enum(base_enum), TypeKind::Enum(extension_enum)) => {
      base_enum.values.extend(extension_enum.values);
    }
    (TypeKind::InputObject(base_input), TypeKind::InputObject(extension_input)) => {
      base_input.fields.extend(extension_input.fields);
    }
    (TypeKind::Scalar, TypeKind::Scalar) => {}
    _ => {
      return Err(GenerateError::schema_build(format!(
        "extension of type {name:?} does not match the kind of its definition"
      )));
    }
  }

  Ok(())
}

fn has_query_root(document: &ServiceDocument) -> bool {
  document.definitions.iter().any(|definition| match definition {
    TypeSystemDefinition::Schema(schema) => schema.node.query.is_some(),
    TypeSystemDefinition::Type(ty) => ty.node.name.node.as_str() == QUERY_TYPE,
    TypeSystemDefinition::Directive(_) => false,
  })
}

/// Documents are not required to define a query root to be generatable, but
/// an executable schema is. Synthesize one carrying only the marker field.
fn inject_marker_query(document: &mut ServiceDocument) {
  if has_query_root(document) {
    return;
  }

  let pos = Pos { line: 0, column: 0 };
  let marker = FieldDefinition {
    description: None,
    name: Positioned::new(Name::new(MARKER_FIELD), pos),
    arguments: Vec::new(),
    ty: Positioned::new(
      Type {
        base: BaseType::Named(Name::new("Boolean")),
        nullable: true,
      },
      pos,
    ),
    directives: Vec::new(),
  };
  let query = TypeDefinition {
    extend: false,
    description: None,
    name: Positioned::new(Name::new(QUERY_TYPE), pos),
    directives: Vec::new(),
    kind: TypeKind::Object(ObjectType {
      implements: Vec::new(),
      fields: vec![Positioned::new(marker, pos)],
    }),
  };
  document
    .definitions
    .push(TypeSystemDefinition::Type(Positioned::new(query, pos)));
}

/// Removes every marker field; object types left empty by the removal only
/// ever existed to carry the marker and are dropped with it.
fn strip_marker_fields(document: &mut ServiceDocument) {
  document.definitions.retain_mut(|definition| {
    let TypeSystemDefinition::Type(ty) = definition else {
      return true;
    };
    let TypeKind::Object(object) = &mut ty.node.kind else {
      return true;
    };
    if !object.fields.iter().any(|field| field.node.name.node.as_str() == MARKER_FIELD) {
      return true;
    }
    object.fields.retain(|field| field.node.name.node.as_str() != MARKER_FIELD);
    !object.fields.is_empty()
  });
}
