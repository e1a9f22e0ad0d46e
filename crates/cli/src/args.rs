use clap::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    #[arg(short = 'c', long, help = "Path to the configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'y',
        long,
        help = "Accept the external upload warning without prompting",
        default_value = "false"
    )]
    pub assume_yes: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Convert files and bundle the results into a zip archive")]
    Convert {
        #[arg(help = "Files to convert", required = true)]
        inputs: Vec<PathBuf>,

        #[arg(
            short = 't',
            long,
            help = "Override the auto-selected target extension, e.g. ogg"
        )]
        to: Option<String>,

        #[arg(short = 'o', long, help = "Directory for the output archive")]
        output_dir: Option<PathBuf>,
    },

    #[command(about = "List converters, their status and supported formats")]
    Formats,
}
