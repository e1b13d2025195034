use async_graphql_parser::parse_schema;
use async_graphql_parser::types::{TypeKind, TypeSystemDefinition};
use comfy_table::{Cell, ContentArrangement, Row, Table};

use crate::generator::loader;
use crate::ui::{colors::IntoComfyColor, Colors, term_width};

pub async fn list_types(type_paths: &[String], colors: &Colors) -> anyhow::Result<()> {
  let merged_sdl = loader::load_merged_sdl(type_paths, None).await?;
  let document = parse_schema(&merged_sdl)?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  header.add_cell(Cell::new("TYPE").fg(IntoComfyColor::into(colors.label())));
  header.add_cell(Cell::new("KIND").fg(IntoComfyColor::into(colors.label())));
  header.add_cell(Cell::new("MEMBERS").fg(IntoComfyColor::into(colors.label())));
  table.set_header(header);

  for definition in &document.definitions {
    let TypeSystemDefinition::Type(ty) = definition else {
      continue;
    };
    let (kind, members) = describe(&ty.node.kind);
    let mut row = Row::new();
    row.add_cell(Cell::new(ty.node.name.node.as_str()).fg(IntoComfyColor::into(colors.value())));
    row.add_cell(Cell::new(kind).fg(IntoComfyColor::into(colors.accent())));
    row.add_cell(Cell::new(members.to_string()).fg(IntoComfyColor::into(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

fn describe(kind: &TypeKind) -> (&'static str, usize) {
  match kind {
    TypeKind::Scalar => ("scalar", 0),
    TypeKind::Object(object) => ("object", object.fields.len()),
    TypeKind::Interface(interface) => ("interface", interface.fields.len()),
    TypeKind::Union(union) => ("union", union.members.len()),
    TypeKind::Enum(enumeration) => ("enum", enumeration.values.len()),
    TypeKind::InputObject(input) => ("input", input.fields.len()),
  }
}
