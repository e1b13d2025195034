//! Deterministic canonical-SDL printer.
//!
//! Prints a parsed [`ServiceDocument`] back to SDL text in document order.
//! Both normalizer strategies reconverge here, which is what makes repeated
//! runs over unchanged input byte-identical.

use std::fmt::Write;

use async_graphql_parser::types::{
  ConstDirective, DirectiveDefinition, EnumType, FieldDefinition, InputObjectType, InputValueDefinition,
  SchemaDefinition, ServiceDocument, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;
use itertools::Itertools;

pub fn print_document(document: &ServiceDocument) -> String {
  let mut blocks = Vec::new();

  for definition in &document.definitions {
    let block = match definition {
      TypeSystemDefinition::Schema(schema) => print_schema_definition(&schema.node),
      TypeSystemDefinition::Directive(directive) => print_directive_definition(&directive.node),
      TypeSystemDefinition::Type(ty) => print_type_definition(&ty.node),
    };
    blocks.push(block);
  }

  let mut out = blocks.join("\n\n");
  out.push('\n');
  out
}

fn print_schema_definition(schema: &SchemaDefinition) -> String {
  let mut out = String::new();
  if schema.extend {
    out.push_str("extend ");
  }
  out.push_str("schema");
  write_directives(&mut out, &schema.directives);

  let roots = [
    ("query", &schema.query),
    ("mutation", &schema.mutation),
    ("subscription", &schema.subscription),
  ];
  if roots.iter().all(|(_, name)| name.is_none()) {
    return out;
  }

  out.push_str(" {\n");
  for (operation, name) in roots {
    if let Some(name) = name {
      let _ = writeln!(out, "  {operation}: {}", name.node);
    }
  }
  out.push('}');
  out
}

fn print_type_definition(ty: &TypeDefinition) -> String {
  let mut out = String::new();
  write_description(&mut out, ty.description.as_ref().map(|d| d.node.as_str()), "");
  if ty.extend {
    out.push_str("extend ");
  }

  match &ty.kind {
    TypeKind::Scalar => {
      let _ = write!(out, "scalar {}", ty.name.node);
      write_directives(&mut out, &ty.directives);
    }
    TypeKind::Object(object) => {
      let _ = write!(out, "type {}", ty.name.node);
      write_object_like(&mut out, ty, &object.implements, &object.fields);
    }
    TypeKind::Interface(interface) => {
      let _ = write!(out, "interface {}", ty.name.node);
      write_object_like(&mut out, ty, &interface.implements, &interface.fields);
    }
    TypeKind::Union(union) => {
      let _ = write!(out, "union {}", ty.name.node);
      write_directives(&mut out, &ty.directives);
      let members = union.members.iter().map(|member| member.node.as_str()).join(" | ");
      let _ = write!(out, " = {members}");
    }
    TypeKind::Enum(enumeration) => {
      let _ = write!(out, "enum {}", ty.name.node);
      write_directives(&mut out, &ty.directives);
      write_enum_values(&mut out, enumeration);
    }
    TypeKind::InputObject(input) => {
      let _ = write!(out, "input {}", ty.name.node);
      write_directives(&mut out, &ty.directives);
      write_input_fields(&mut out, input);
    }
  }

  out
}

fn write_object_like(
  out: &mut String,
  ty: &TypeDefinition,
  implements: &[Positioned<async_graphql_value::Name>],
  fields: &[Positioned<FieldDefinition>],
) {
  if !implements.is_empty() {
    let interfaces = implements.iter().map(|name| name.node.as_str()).join(" & ");
    let _ = write!(out, " implements {interfaces}");
  }
  write_directives(out, &ty.directives);

  if fields.is_empty() {
    return;
  }
  out.push_str(" {\n");
  for field in fields {
    write_field(out, &field.node);
  }
  out.push('}');
}

fn write_field(out: &mut String, field: &FieldDefinition) {
  write_description(out, field.description.as_ref().map(|d| d.node.as_str()), "  ");
  let _ = write!(out, "  {}", field.name.node);
  write_arguments(out, &field.arguments);
  let _ = write!(out, ": {}", field.ty.node);
  write_directives(out, &field.directives);
  out.push('\n');
}

fn write_arguments(out: &mut String, arguments: &[Positioned<InputValueDefinition>]) {
  if arguments.is_empty() {
    return;
  }

  let documented = arguments.iter().any(|arg| arg.node.description.is_some());
  if documented {
    out.push_str("(\n");
    for argument in arguments {
      write_description(out, argument.node.description.as_ref().map(|d| d.node.as_str()), "    ");
      out.push_str("    ");
      write_input_value(out, &argument.node);
      out.push('\n');
    }
    out.push_str("  )");
  } else {
    out.push('(');
    for (index, argument) in arguments.iter().enumerate() {
      if index > 0 {
        out.push_str(", ");
      }
      write_input_value(out, &argument.node);
    }
    out.push(')');
  }
}

fn write_input_value(out: &mut String, value: &InputValueDefinition) {
  let _ = write!(out, "{}: {}", value.name.node, value.ty.node);
  if let Some(default) = &value.default_value {
    let _ = write!(out, " = {}", default.node);
  }
  write_directives(out, &value.directives);
}

fn write_enum_values(out: &mut String, enumeration: &EnumType) {
  if enumeration.values.is_empty() {
    return;
  }
  out.push_str(" {\n");
  for value in &enumeration.values {
    write_description(out, value.node.description.as_ref().map(|d| d.node.as_str()), "  ");
    let _ = write!(out, "  {}", value.node.value.node);
    write_directives(out, &value.node.directives);
    out.push('\n');
  }
  out.push('}');
}

fn write_input_fields(out: &mut String, input: &InputObjectType) {
  if input.fields.is_empty() {
    return;
  }
  out.push_str(" {\n");
  for field in &input.fields {
    write_description(out, field.node.description.as_ref().map(|d| d.node.as_str()), "  ");
    out.push_str("  ");
    write_input_value(out, &field.node);
    out.push('\n');
  }
  out.push('}');
}

fn print_directive_definition(directive: &DirectiveDefinition) -> String {
  let mut out = String::new();
  write_description(&mut out, directive.description.as_ref().map(|d| d.node.as_str()), "");
  let _ = write!(out, "directive @{}", directive.name.node);
  write_arguments(&mut out, &directive.arguments);
  if directive.is_repeatable {
    out.push_str(" repeatable");
  }
  let locations = directive
    .locations
    .iter()
    .map(|location| directive_location(&format!("{:?}", location.node)))
    .join(" | ");
  let _ = write!(out, " on {locations}");
  out
}

/// Converts the CamelCase location names into the SCREAMING_SNAKE_CASE the
/// SDL grammar uses, e.g. `FieldDefinition` -> `FIELD_DEFINITION`.
fn directive_location(name: &str) -> String {
  let mut out = String::with_capacity(name.len() + 4);
  for (index, ch) in name.chars().enumerate() {
    if ch.is_ascii_uppercase() && index > 0 {
      out.push('_');
    }
    out.push(ch.to_ascii_uppercase());
  }
  out
}

fn write_directives(out: &mut String, directives: &[Positioned<ConstDirective>]) {
  for directive in directives {
    let _ = write!(out, " @{}", directive.node.name.node);
    if directive.node.arguments.is_empty() {
      continue;
    }
    out.push('(');
    for (index, (name, value)) in directive.node.arguments.iter().enumerate() {
      if index > 0 {
        out.push_str(", ");
      }
      let _ = write!(out, "{}: {}", name.node, value.node);
    }
    out.push(')');
  }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
  let Some(description) = description else {
    return;
  };
  let escaped = description.replace("\"\"\"", "\\\"\"\"");

  if escaped.contains('\n') {
    let _ = writeln!(out, "{indent}\"\"\"");
    for line in escaped.lines() {
      let _ = writeln!(out, "{indent}{line}");
    }
    let _ = writeln!(out, "{indent}\"\"\"");
  } else {
    let _ = writeln!(out, "{indent}\"\"\"{escaped}\"\"\"");
  }
}
