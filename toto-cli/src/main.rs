mod config;
mod display;
mod interactive;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use toto_analysis::backtest::{CandidateSet, PositionRange, backtest, positional_backtest};
use toto_analysis::frequency::{column_frequency, expected_count, grouped_frequency, overall_frequency};
use toto_analysis::generator::{generate_draw, make_rng};
use toto_analysis::interval::confidence_intervals_all;
use toto_analysis::position::all_position_stats;
use toto_analysis::summary::{compare, summarize};
use toto_db::models::{Column, DrawTable};
use toto_db::store::save_table;

use crate::config::{AnalysisConfig, DEFAULT_CONFIG_FILE, load_config, save_config};
use crate::session::{Dataset, load_dataset};

/// Which columns a frequency count runs over.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ColumnSet {
    /// Num1-Num7
    #[default]
    All,
    /// Num1-Num6
    Winning,
    /// Num7 only
    Additional,
}

impl ColumnSet {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            ColumnSet::All => &Column::ALL,
            ColumnSet::Winning => &Column::WINNING,
            ColumnSet::Additional => &[Column::Num7],
        }
    }
}

#[derive(Parser)]
#[command(name = "toto", about = "Singapore TOTO draw analysis")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Abort when the input file contains invalid rows
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a CSV file and report rejected rows
    Clean {
        /// CSV file (default: results file from the configuration)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write the clean rows to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of rejected rows to list
        #[arg(long, default_value = "20")]
        show: usize,
    },

    /// Generate Monte Carlo draws
    Generate {
        /// Number of draws
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV (default: simulated file from the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the first draws of a file
    Sample {
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "10")]
        rows: usize,
    },

    /// Overall frequency of every number
    Frequency {
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "all")]
        columns: ColumnSet,

        /// How many most/least frequent numbers to list
        #[arg(long, default_value = "5")]
        top: usize,

        /// Draw an ASCII bar chart
        #[arg(long)]
        chart: bool,
    },

    /// Per-position statistics and counts
    Positions {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Chart the counts of these columns (e.g. Num1,Num7)
        #[arg(long, value_delimiter = ',')]
        chart: Vec<Column>,
    },

    /// Counts of Num1-Num6 side by side
    Grouped {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Confidence intervals of each number's share per position
    Intervals {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Columns to analyse (default: all seven)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<Column>,

        /// Confidence level (default from the configuration)
        #[arg(short, long)]
        level: Option<f64>,

        #[arg(long)]
        chart: bool,
    },

    /// Score a fixed set of six numbers against every draw
    Backtest {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Six numbers (default from the configuration)
        numbers: Vec<u8>,

        /// Print the matches of every draw
        #[arg(long)]
        details: bool,
    },

    /// Score per-position ranges against every draw
    RangeBacktest {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Six LOW-HIGH ranges, e.g. 1-5,7-16,16-25,25-34,35-44,40-49
        #[arg(short, long, value_delimiter = ',')]
        ranges: Vec<PositionRange>,
    },

    /// Quick summary of one file
    Summary {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Compare published results with simulated draws
    Compare {
        #[arg(long)]
        real: Option<PathBuf>,

        #[arg(long)]
        simulated: Option<PathBuf>,
    },

    /// Interactive menu
    Menu,

    /// Print the effective configuration
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if cli.strict {
        config.strict = true;
    }

    let results = |file: Option<PathBuf>| file.unwrap_or_else(|| config.results_file.clone());

    match cli.command {
        Command::Clean { file, output, show } => cmd_clean(&results(file), output.as_deref(), show),
        Command::Generate { count, seed, output } => {
            let count = count.unwrap_or(config.simulated_draws);
            let output = output.unwrap_or_else(|| config.simulated_file.clone());
            let table = cmd_generate(count, seed.or(config.seed))?;
            save_table(&output, &table).with_context(|| format!("Cannot write {}", output.display()))?;
            println!("Generated {} draws into {}", table.len(), output.display());
            Ok(())
        }
        Command::Sample { file, rows } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            display::display_draws(dataset.table.head(rows));
            Ok(())
        }
        Command::Frequency { file, columns, top, chart } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            cmd_frequency(&dataset.table, columns, top, chart);
            Ok(())
        }
        Command::Positions { file, chart } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            cmd_positions(&dataset.table, &chart);
            Ok(())
        }
        Command::Grouped { file } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            display::display_grouped(&grouped_frequency(&dataset.table, &Column::WINNING));
            Ok(())
        }
        Command::Intervals { file, columns, level, chart } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            let columns = if columns.is_empty() { Column::ALL.to_vec() } else { columns };
            cmd_intervals(&dataset.table, &columns, level.unwrap_or(config.confidence_level), chart)
        }
        Command::Backtest { file, numbers, details } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            let candidate = if numbers.is_empty() {
                config.candidate_set()?
            } else {
                CandidateSet::new(&numbers)?
            };
            cmd_backtest(&dataset.table, &candidate, details);
            Ok(())
        }
        Command::RangeBacktest { file, ranges } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            let ranges = if ranges.is_empty() { config.position_ranges.clone() } else { ranges };
            cmd_range_backtest(&dataset.table, &ranges)
        }
        Command::Summary { file } => {
            let dataset = load_dataset(&results(file), config.strict)?;
            cmd_summary(&dataset);
            Ok(())
        }
        Command::Compare { real, simulated } => {
            let real = load_dataset(&results(real), config.strict)?;
            let simulated_path = simulated.unwrap_or_else(|| config.simulated_file.clone());
            let simulated = load_dataset(&simulated_path, config.strict)?;
            cmd_compare(&real, &simulated);
            Ok(())
        }
        Command::Menu => interactive::run_interactive(config),
        Command::Config { save } => cmd_config(&config, &cli.config, save),
    }
}

pub(crate) fn cmd_clean(path: &Path, output: Option<&Path>, show: usize) -> Result<()> {
    // Always lenient here: the point is to see what would be rejected.
    let dataset = load_dataset(path, false)?;
    if let Some(report) = &dataset.report {
        display::display_validation_report(&dataset.label(), report, show);
    }
    if let Some(output) = output {
        save_table(output, &dataset.table).with_context(|| format!("Cannot write {}", output.display()))?;
        println!("Clean rows written to {}", output.display());
    }
    Ok(())
}

pub(crate) fn cmd_generate(count: usize, seed: Option<u64>) -> Result<DrawTable> {
    let mut rng = make_rng(seed);
    let mut table = DrawTable::with_capacity(count);

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );
    pb.set_message("generating draws");

    for i in 0..count {
        table.push(generate_draw(&mut rng)?);
        if i % 1000 == 999 {
            pb.inc(1000);
        }
    }
    pb.set_position(count as u64);
    pb.finish_with_message("done");

    Ok(table)
}

pub(crate) fn cmd_frequency(table: &DrawTable, columns: ColumnSet, top: usize, chart: bool) {
    let cols = columns.columns();
    let freq = overall_frequency(table, cols);
    let title = match columns {
        ColumnSet::All => "Overall frequency (Num1 to Num7)",
        ColumnSet::Winning => "Frequency of winning numbers (Num1 to Num6)",
        ColumnSet::Additional => "Frequency of the additional number (Num7)",
    };
    display::display_frequency(title, &freq, expected_count(table.len(), cols.len()), top, chart);
}

pub(crate) fn cmd_positions(table: &DrawTable, chart: &[Column]) {
    display::display_position_stats(&all_position_stats(table, &Column::ALL));
    for &column in chart {
        display::display_column_chart(column, &column_frequency(table, column));
    }
}

pub(crate) fn cmd_intervals(table: &DrawTable, columns: &[Column], level: f64, chart: bool) -> Result<()> {
    for (column, entries) in confidence_intervals_all(table, columns, level)? {
        display::display_intervals(column, &entries, level, chart);
    }
    Ok(())
}

pub(crate) fn cmd_backtest(table: &DrawTable, candidate: &CandidateSet, details: bool) {
    let result = backtest(table, candidate);
    display::display_backtest(table, &result, details);
}

pub(crate) fn cmd_range_backtest(table: &DrawTable, ranges: &[PositionRange]) -> Result<()> {
    let result = positional_backtest(table, ranges)?;
    display::display_positional_backtest(&result);
    Ok(())
}

pub(crate) fn cmd_summary(dataset: &Dataset) {
    display::display_summary(&dataset.label(), &summarize(&dataset.table));
}

pub(crate) fn cmd_compare(real: &Dataset, simulated: &Dataset) {
    let cmp = compare(&real.table, &simulated.table);
    display::display_comparison(&real.label(), &simulated.label(), &cmp);
}

fn cmd_config(config: &AnalysisConfig, path: &Path, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        save_config(config, path)?;
        println!("Configuration saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backtest_numbers() {
        let cli = Cli::try_parse_from(["toto", "backtest", "1", "7", "13", "19", "25", "31"]).unwrap();
        match cli.command {
            Command::Backtest { numbers, .. } => assert_eq!(numbers, vec![1, 7, 13, 19, 25, 31]),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_ranges_and_columns() {
        let cli = Cli::try_parse_from(["toto", "range-backtest", "--ranges", "1-5,7-16,16-25,25-34,35-44,40-49"]).unwrap();
        match cli.command {
            Command::RangeBacktest { ranges, .. } => {
                assert_eq!(ranges.len(), 6);
                assert_eq!(ranges[1], PositionRange { low: 7, high: 16 });
            }
            _ => panic!("wrong command"),
        }

        let cli = Cli::try_parse_from(["toto", "intervals", "--columns", "Num1,num7", "--level", "0.9"]).unwrap();
        match cli.command {
            Command::Intervals { columns, level, .. } => {
                assert_eq!(columns, vec![Column::Num1, Column::Num7]);
                assert_eq!(level, Some(0.9));
            }
            _ => panic!("wrong command"),
        }

        assert!(Cli::try_parse_from(["toto", "range-backtest", "--ranges", "9-2"]).is_err());
        assert!(Cli::try_parse_from(["toto", "generate", "-n", "-5"]).is_err());
    }

    #[test]
    fn test_cmd_generate_valid() {
        let table = cmd_generate(2500, Some(8)).unwrap();
        assert_eq!(table.len(), 2500);
        assert!(cmd_generate(0, None).unwrap().is_empty());
    }

    #[test]
    fn test_column_set() {
        assert_eq!(ColumnSet::All.columns().len(), 7);
        assert_eq!(ColumnSet::Winning.columns().len(), 6);
        assert_eq!(ColumnSet::Additional.columns(), &[Column::Num7]);
    }
}
