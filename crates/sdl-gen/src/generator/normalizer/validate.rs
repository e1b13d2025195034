//! Semantic validation of the merged schema document.
//!
//! The Regular strategy is deliberately lenient about resolvers (there are
//! none at generation time), but strict about the schema shape itself: every
//! type reference must resolve, definitions must be unique, and directive
//! usages must name a known directive.

use std::collections::{HashMap, HashSet};

use async_graphql_parser::types::{
  BaseType, ConstDirective, FieldDefinition, InputValueDefinition, ServiceDocument, Type, TypeDefinition, TypeKind,
  TypeSystemDefinition,
};
use async_graphql_parser::Positioned;

use crate::generator::errors::GenerateError;

pub(crate) const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

const BUILT_IN_DIRECTIVES: [&str; 5] = ["include", "skip", "deprecated", "specifiedBy", "oneOf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamedKind {
  Scalar,
  Object,
  Interface,
  Union,
  Enum,
  Input,
}

impl NamedKind {
  fn of(definition: &TypeDefinition) -> Self {
    match &definition.kind {
      TypeKind::Scalar => NamedKind::Scalar,
      TypeKind::Object(_) => NamedKind::Object,
      TypeKind::Interface(_) => NamedKind::Interface,
      TypeKind::Union(_) => NamedKind::Union,
      TypeKind::Enum(_) => NamedKind::Enum,
      TypeKind::InputObject(_) => NamedKind::Input,
    }
  }

  fn is_input_compatible(self) -> bool {
    matches!(self, NamedKind::Scalar | NamedKind::Enum | NamedKind::Input)
  }
}

struct Validator {
  types: HashMap<String, NamedKind>,
  directives: HashSet<String>,
  errors: Vec<String>,
}

/// Checks the document and fails with a [`GenerateError::SchemaBuild`] that
/// carries every violation found, not just the first one.
pub(crate) fn validate_document(document: &ServiceDocument) -> Result<(), GenerateError> {
  let mut validator = Validator::collect(document);
  validator.check_duplicates(document);
  validator.check_definitions(document);

  if validator.errors.is_empty() {
    Ok(())
  } else {
    Err(GenerateError::schema_build(validator.errors.join("\n")))
  }
}

impl Validator {
  fn collect(document: &ServiceDocument) -> Self {
    let mut types: HashMap<String, NamedKind> = HashMap::new();
    let mut directives: HashSet<String> = BUILT_IN_DIRECTIVES.iter().map(ToString::to_string).collect();

    for scalar in BUILT_IN_SCALARS {
      types.insert(scalar.to_string(), NamedKind::Scalar);
    }

    for definition in &document.definitions {
      match definition {
        TypeSystemDefinition::Type(ty) => {
          types.insert(ty.node.name.node.to_string(), NamedKind::of(&ty.node));
        }
        TypeSystemDefinition::Directive(directive) => {
          directives.insert(directive.node.name.node.to_string());
        }
        TypeSystemDefinition::Schema(_) => {}
      }
    }

    Self {
      types,
      directives,
      errors: Vec::new(),
    }
  }

  fn error(&mut self, message: String) {
    self.errors.push(message);
  }

  fn check_duplicates(&mut self, document: &ServiceDocument) {
    let mut seen = HashSet::new();
    for definition in &document.definitions {
      if let TypeSystemDefinition::Type(ty) = definition {
        if ty.node.extend {
          continue;
        }
        let name = ty.node.name.node.to_string();
        if !seen.insert(name.clone()) {
          self.error(format!("type {name:?} is defined more than once"));
        }
      }
    }
  }

  fn check_definitions(&mut self, document: &ServiceDocument) {
    for definition in &document.definitions {
      match definition {
        TypeSystemDefinition::Schema(schema) => {
          let roots = [
            ("query", &schema.node.query),
            ("mutation", &schema.node.mutation),
            ("subscription", &schema.node.subscription),
          ];
          for (operation, root) in roots {
            if let Some(root) = root {
              match self.types.get(root.node.as_str()) {
                Some(NamedKind::Object) => {}
                Some(_) => self.error(format!(
                  "{operation} root type {:?} must be an object type",
                  root.node.as_str()
                )),
                None => self.error(format!("{operation} root type {:?} is not defined", root.node.as_str())),
              }
            }
          }
          self.check_directives(&schema.node.directives);
        }
        TypeSystemDefinition::Type(ty) => self.check_type(&ty.node),
        TypeSystemDefinition::Directive(directive) => {
          for argument in &directive.node.arguments {
            self.check_input_value(&directive.node.name.node, &argument.node);
          }
        }
      }
    }
  }

  fn check_type(&mut self, definition: &TypeDefinition) {
    let name = definition.name.node.as_str().to_string();
    self.check_directives(&definition.directives);

    match &definition.kind {
      TypeKind::Scalar => {}
      TypeKind::Object(object) => {
        self.check_implements(&name, &object.implements);
        self.check_fields(&name, &object.fields);
      }
      TypeKind::Interface(interface) => {
        self.check_implements(&name, &interface.implements);
        self.check_fields(&name, &interface.fields);
      }
      TypeKind::Union(union) => {
        for member in &union.members {
          match self.types.get(member.node.as_str()) {
            Some(NamedKind::Object) => {}
            Some(_) => self.error(format!(
              "union {name:?} member {:?} must be an object type",
              member.node.as_str()
            )),
            None => self.error(format!("union {name:?} references undefined type {:?}", member.node.as_str())),
          }
        }
      }
      TypeKind::Enum(enumeration) => {
        for value in &enumeration.values {
          self.check_directives(&value.node.directives);
        }
      }
      TypeKind::InputObject(input) => {
        for field in &input.fields {
          self.check_input_value(&name, &field.node);
          let base = base_name(&field.node.ty.node);
          if let Some(kind) = self.types.get(base) {
            if !kind.is_input_compatible() {
              self.error(format!(
                "input {name:?} field {:?} must use an input-compatible type, found {base:?}",
                field.node.name.node.as_str()
              ));
            }
          }
        }
      }
    }
  }

  fn check_implements(&mut self, name: &str, implements: &[Positioned<async_graphql_value::Name>]) {
    for interface in implements {
      match self.types.get(interface.node.as_str()) {
        Some(NamedKind::Interface) => {}
        Some(_) => self.error(format!(
          "type {name:?} can only implement interface types, found {:?}",
          interface.node.as_str()
        )),
        None => self.error(format!(
          "type {name:?} implements undefined interface {:?}",
          interface.node.as_str()
        )),
      }
    }
  }

  fn check_fields(&mut self, name: &str, fields: &[Positioned<FieldDefinition>]) {
    for field in fields {
      let field_name = field.node.name.node.as_str();
      let base = base_name(&field.node.ty.node);
      match self.types.get(base) {
        Some(NamedKind::Input) => self.error(format!(
          "field {name}.{field_name} cannot use input type {base:?} as an output type"
        )),
        Some(_) => {}
        None => self.error(format!("field {name}.{field_name} references undefined type {base:?}")),
      }

      for argument in &field.node.arguments {
        self.check_input_value(&format!("{name}.{field_name}"), &argument.node);
      }
      self.check_directives(&field.node.directives);
    }
  }

  fn check_input_value(&mut self, owner: &str, value: &InputValueDefinition) {
    let base = base_name(&value.ty.node);
    match self.types.get(base) {
      Some(kind) if kind.is_input_compatible() => {}
      Some(_) => self.error(format!(
        "argument {:?} of {owner} must use an input-compatible type, found {base:?}",
        value.name.node.as_str()
      )),
      None => self.error(format!(
        "argument {:?} of {owner} references undefined type {base:?}",
        value.name.node.as_str()
      )),
    }
    self.check_directives(&value.directives);
  }

  fn check_directives(&mut self, directives: &[Positioned<ConstDirective>]) {
    for directive in directives {
      let name = directive.node.name.node.as_str();
      if !self.directives.contains(name) {
        self.error(format!("unknown directive \"@{name}\""));
      }
    }
  }
}

pub(crate) fn base_name(ty: &Type) -> &str {
  match &ty.base {
    BaseType::Named(name) => name.as_str(),
    BaseType::List(inner) => base_name(inner),
  }
}

#[cfg(test)]
mod tests {
  use async_graphql_parser::parse_schema;

  use super::*;

  fn validate(sdl: &str) -> Result<(), GenerateError> {
    validate_document(&parse_schema(sdl).unwrap())
  }

  #[test]
  fn accepts_a_well_formed_document() {
    validate(
      r#"
      type Book implements Node {
        id: ID!
        status: Status
        related(limit: Int = 10): [Book!]
      }
      interface Node { id: ID! }
      enum Status { ACTIVE INACTIVE }
      union SearchResult = Book
      input BookFilter { term: String }
      scalar DateTime
      "#,
    )
    .unwrap();
  }

  #[test]
  fn rejects_undefined_field_types() {
    let err = validate("type Book { author: Author }").unwrap_err();
    assert!(err.to_string().contains("undefined type \"Author\""), "{err}");
  }

  #[test]
  fn rejects_duplicate_definitions() {
    let err = validate("type Book { id: ID! }\ntype Book { id: ID! }").unwrap_err();
    assert!(err.to_string().contains("defined more than once"), "{err}");
  }

  #[test]
  fn rejects_unknown_directives() {
    let err = validate("type Book { id: ID! @mystery }").unwrap_err();
    assert!(err.to_string().contains("unknown directive \"@mystery\""), "{err}");
  }

  #[test]
  fn accepts_known_and_declared_directives() {
    validate(
      r#"
      directive @tag(name: String!) on FIELD_DEFINITION
      type Book { id: ID! @tag(name: "x") @deprecated }
      "#,
    )
    .unwrap();
  }

  #[test]
  fn rejects_non_object_union_members() {
    let err = validate("enum Status { ON }\nunion U = Status").unwrap_err();
    assert!(err.to_string().contains("must be an object type"), "{err}");
  }

  #[test]
  fn rejects_input_types_in_output_position() {
    let err = validate("input Filter { term: String }\ntype Query { search: Filter }").unwrap_err();
    assert!(err.to_string().contains("as an output type"), "{err}");
  }

  #[test]
  fn rejects_object_types_in_argument_position() {
    let err = validate("type Book { id: ID! }\ntype Query { book(book: Book): Book }").unwrap_err();
    assert!(err.to_string().contains("input-compatible"), "{err}");
  }

  #[test]
  fn rejects_undefined_schema_roots() {
    let err = validate("schema { query: Missing }\ntype Query { ok: Boolean }").unwrap_err();
    assert!(err.to_string().contains("is not defined"), "{err}");
  }

  #[test]
  fn collects_every_violation() {
    let err = validate("type Book { a: Missing b: AlsoMissing }").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Missing") && message.contains("AlsoMissing"));
  }
}
