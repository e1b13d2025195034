#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use clap::Parser;

use crate::ui::{Cli, Colors, Commands, ListCommands, colors};

mod generator;
mod ui;


#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { list_command } => match list_command {
      ListCommands::Types { type_paths } => ui::commands::list_types(&type_paths, &colors).await?,
    },
    Commands::Generate(command) => {
      let config = ui::commands::resolve_config(command)?;
      ui::commands::generate_definitions(config, &colors).await?;
    }
  }

  Ok(())
}
