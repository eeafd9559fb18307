use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = openpeon::cli::Cli::parse();
    openpeon::run(cli)
}
