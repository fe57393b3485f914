use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdg-processor")]
#[command(about = "Dissolved gas concentration and percent saturation from headspace equilibration data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join the stacked field, lab and super-parent tables into one table
    Format {
        #[arg(
            short,
            long,
            help = "Download directory (or its .zip path) holding the stacked tables"
        )]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/sdg-formatted-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Append dissolved gas concentrations to a formatted table
    Concentration {
        #[arg(short, long, help = "Formatted table (CSV, TSV or Parquet)")]
        input_file: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/sdg-concentration-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Append saturation concentrations and percent saturation
    Saturation {
        #[arg(short, long, help = "Table with dissolved concentrations")]
        input_file: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/sdg-saturation-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Run format, concentration and saturation in one pass
    Process {
        #[arg(
            short,
            long,
            help = "Download directory (or its .zip path) holding the stacked tables"
        )]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path, .csv/.tsv/.parquet [default: output/sdg-saturation-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, help = "Parquet compression [default: from settings, snappy]")]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display statistics of a result file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(long, help = "Print statistics as JSON")]
        json: bool,
    },
}
