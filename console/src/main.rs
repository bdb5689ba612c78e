mod fix;
mod regions;
mod report;
pub mod utils;
mod validate;

use clap::{
    Parser,
    Subcommand,
};
use fix::FixPseudogeneArgs;
use regions::AddRegionsArgs;
use utils::UtilsArgs;
use validate::ValidateArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Validate a GFF3 file and write a Markdown report.
    Validate {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ValidateArgs,
    },

    /// Retype pseudogene members and merge pseudogenes into overlapping
    /// genes.
    #[command(name = "fix-pseudogene")]
    FixPseudogene {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FixPseudogeneArgs,
    },

    /// Insert missing ##sequence-region directives.
    #[command(name = "add-regions")]
    AddRegions {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  AddRegionsArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Validate { utils, args } => {
            utils.setup()?;
            args.run(&utils)?
        },
        MainMenu::FixPseudogene { utils, args } => {
            utils.setup()?;
            args.run(&utils)?
        },
        MainMenu::AddRegions { utils, args } => {
            utils.setup()?;
            args.run(&utils)?
        },
    }
    Ok(())
}
