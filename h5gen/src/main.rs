use clap::{Parser, Subcommand};
use h5gen::cmds;
use h5gen::OutputMode;
use h5gen::cmds::analyze::ReportFormat;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "h5gen")]
#[command(about = "HDF5 compound type generator for C++ records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate HDF5 type code from record descriptors */
    Generate {
        /* Descriptor file (YAML or JSON) produced by the introspector */
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,

        /* Output header, defaults to <input header>_hdf5.h next to the descriptor file */
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        /* Namespace wrapping the generated code */
        #[arg(long = "namespace", value_name = "NAME")]
        namespace: Option<String>,

        /* Generator config file */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Output layout */
        #[arg(short = 'm', long = "mode", value_enum)]
        mode: Option<OutputMode>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Classify records and print schemas, shadow layouts and diagnostics */
    Analyze {
        /* Descriptor file (YAML or JSON) produced by the introspector */
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,

        /* Generator config file */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Report format */
        #[arg(long = "format", value_enum, default_value = "json")]
        format: ReportFormat,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            file,
            output,
            namespace,
            config,
            mode,
            verbose,
        } => {
            init_tracing(verbose);
            let written = cmds::generate::run(file, output, namespace, config, mode)?;
            for path in written {
                println!("[✓] Generated {}", path.display());
            }
        }

        Commands::Analyze { file, config, format } => {
            init_tracing(false);
            cmds::analyze::run(file, config, format)?;
        }
    }

    Ok(())
}
