pub mod schema;
pub mod parse;
pub mod diff;
pub mod render;
pub mod cli;

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
