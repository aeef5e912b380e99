use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use toto_analysis::backtest::{CandidateSet, PositionRange};
use toto_analysis::frequency::grouped_frequency;
use toto_db::models::{Column, POOL_SIZE, WINNING_COUNT};

use crate::config::AnalysisConfig;
use crate::session::Session;
use crate::{ColumnSet, display};

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Load,
    Generate,
    Clean,
    Frequency,
    Positions,
    Grouped,
    Intervals,
    Backtest,
    Ranges,
    Summary,
    Sample,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "load" | "open" => Some(InteractiveCommand::Load),
        "2" | "generate" | "gen" | "monte carlo" => Some(InteractiveCommand::Generate),
        "3" | "clean" | "validate" => Some(InteractiveCommand::Clean),
        "4" | "frequency" | "freq" => Some(InteractiveCommand::Frequency),
        "5" | "positions" | "pos" | "individual" => Some(InteractiveCommand::Positions),
        "6" | "grouped" | "group" => Some(InteractiveCommand::Grouped),
        "7" | "intervals" | "ci" | "confidence" => Some(InteractiveCommand::Intervals),
        "8" | "backtest" | "bt" => Some(InteractiveCommand::Backtest),
        "9" | "ranges" | "range" => Some(InteractiveCommand::Ranges),
        "10" | "summary" | "sum" => Some(InteractiveCommand::Summary),
        "11" | "sample" | "head" => Some(InteractiveCommand::Sample),
        "0" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu(session: &Session) {
    println!();
    println!("{}", "=".repeat(60));
    match session.dataset() {
        Ok(dataset) => println!("{:^60}", format!("{} ({} draws)", dataset.label(), dataset.table.len())),
        Err(_) => println!("{:^60}", "No data loaded"),
    }
    println!("{}", "-".repeat(60));
    println!("  1. load        Load a CSV file");
    println!("  2. generate    Generate Monte Carlo draws");
    println!("  3. clean       Validation report");
    println!("  4. frequency   Overall frequency");
    println!("  5. positions   Individual position charts");
    println!("  6. grouped     Grouped frequency");
    println!("  7. intervals   Confidence intervals");
    println!("  8. backtest    Backtest a set of numbers");
    println!("  9. ranges      Backtest positional ranges");
    println!(" 10. summary     Quick summary analysis");
    println!(" 11. sample      First draws");
    println!("  0. quit        End");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).context("Read error")?;
    if read == 0 {
        anyhow::bail!("end of input");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn parse_candidate(input: &str) -> Result<CandidateSet> {
    let numbers: Vec<u8> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>())
        .collect::<Result<_, _>>()
        .context("Numbers must be integers")?;
    Ok(CandidateSet::new(&numbers)?)
}

fn prompt_candidate(default: &[u8]) -> Result<CandidateSet> {
    loop {
        let default_str = default.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let input = prompt_with_default(
            &format!("{} numbers (1-{}, space separated)", WINNING_COUNT, POOL_SIZE),
            &default_str,
        )?;
        match parse_candidate(&input) {
            Ok(candidate) => return Ok(candidate),
            Err(e) => println!("{e:#}. Try again."),
        }
    }
}

fn parse_ranges(input: &str) -> Result<Vec<PositionRange>> {
    let ranges = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<PositionRange>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ranges)
}

fn parse_columns(input: &str) -> Result<Vec<Column>> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(Column::ALL.to_vec());
    }
    let columns = input
        .split(',')
        .map(|s| s.trim().parse::<Column>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn cmd_load_interactive(session: &mut Session) -> Result<()> {
    let default = session.config.results_file.display().to_string();
    let path = PathBuf::from(prompt_with_default("CSV file", &default)?);
    let dataset = session.load(&path)?;
    println!("Data loaded from {}: {} clean draws", dataset.label(), dataset.table.len());
    if let Some(report) = &dataset.report {
        if !report.is_clean() {
            println!(
                "{} invalid row(s) skipped. Use 'clean' for details.",
                report.invalid_count()
            );
        }
    }
    Ok(())
}

fn cmd_generate_interactive(session: &mut Session) -> Result<()> {
    let count_str = prompt_with_default("Number of draws", &session.config.simulated_draws.to_string())?;
    let count: usize = count_str.parse().context("Invalid number")?;

    let seed_str = prompt_with_default("Seed (empty = random)", "")?;
    let seed: Option<u64> = if seed_str.is_empty() {
        session.config.seed
    } else {
        Some(seed_str.parse().context("Invalid seed")?)
    };

    let output = session.config.simulated_file.clone();
    let table = super::cmd_generate(count, seed)?;
    let dataset = session.set_generated(table, &output)?;
    println!("Generated {} draws into {}", dataset.table.len(), dataset.label());
    Ok(())
}

fn cmd_clean_interactive(session: &Session) -> Result<()> {
    let dataset = session.dataset()?;
    match &dataset.report {
        Some(report) => display::display_validation_report(&dataset.label(), report, 20),
        None => println!("Generated draws are valid by construction."),
    }
    Ok(())
}

fn cmd_positions_interactive(session: &Session) -> Result<()> {
    let dataset = session.dataset()?;
    let input = prompt_with_default("Columns to chart (e.g. Num1,Num7, or all)", "all")?;
    let columns = parse_columns(&input)?;
    super::cmd_positions(&dataset.table, &columns);
    Ok(())
}

fn cmd_intervals_interactive(session: &Session) -> Result<()> {
    let dataset = session.dataset()?;
    let input = prompt_with_default("Columns (e.g. Num1,Num2, or all)", "all")?;
    let columns = parse_columns(&input)?;
    let level_str = prompt_with_default("Confidence level", &session.config.confidence_level.to_string())?;
    let level: f64 = level_str.parse().context("Invalid confidence level")?;
    super::cmd_intervals(&dataset.table, &columns, level, true)
}

fn cmd_backtest_interactive(session: &Session) -> Result<()> {
    let dataset = session.dataset()?;
    let candidate = prompt_candidate(&session.config.candidate)?;
    let details = prompt_with_default("Show every draw? (y/n)", "n")?;
    super::cmd_backtest(&dataset.table, &candidate, details.eq_ignore_ascii_case("y"));
    Ok(())
}

fn cmd_ranges_interactive(session: &Session) -> Result<()> {
    let dataset = session.dataset()?;
    let default = session
        .config
        .position_ranges
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let input = prompt_with_default("Six LOW-HIGH ranges", &default)?;
    let ranges = parse_ranges(&input)?;
    super::cmd_range_backtest(&dataset.table, &ranges)
}

fn dispatch(command: InteractiveCommand, session: &mut Session) -> Result<()> {
    match command {
        InteractiveCommand::Load => cmd_load_interactive(session),
        InteractiveCommand::Generate => cmd_generate_interactive(session),
        InteractiveCommand::Clean => cmd_clean_interactive(session),
        InteractiveCommand::Frequency => {
            super::cmd_frequency(&session.dataset()?.table, ColumnSet::All, 5, true);
            Ok(())
        }
        InteractiveCommand::Positions => cmd_positions_interactive(session),
        InteractiveCommand::Grouped => {
            display::display_grouped(&grouped_frequency(&session.dataset()?.table, &Column::WINNING));
            Ok(())
        }
        InteractiveCommand::Intervals => cmd_intervals_interactive(session),
        InteractiveCommand::Backtest => cmd_backtest_interactive(session),
        InteractiveCommand::Ranges => cmd_ranges_interactive(session),
        InteractiveCommand::Summary => {
            super::cmd_summary(session.dataset()?);
            Ok(())
        }
        InteractiveCommand::Sample => {
            display::display_draws(session.dataset()?.table.head(10));
            Ok(())
        }
        InteractiveCommand::Quit => Ok(()),
    }
}

pub fn run_interactive(config: AnalysisConfig) -> Result<()> {
    println!("TOTO analysis: interactive mode");
    let mut session = Session::new(config);

    let default_file = session.config.results_file.clone();
    if default_file.exists() {
        match session.load(&default_file) {
            Ok(dataset) => println!("Data loaded from {}: {} clean draws", dataset.label(), dataset.table.len()),
            Err(e) => println!("Error: {e:#}"),
        }
    }

    loop {
        display_menu(&session);
        let input = match prompt("Choice: ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Goodbye!");
                break;
            }
            Some(command) => {
                if let Err(e) = dispatch(command, &mut session) {
                    println!("Error: {e:#}");
                }
            }
            None => {
                println!("Invalid choice '{}'. Type a number (0-11) or a command name.", input);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_by_number() {
        assert_eq!(parse_command("1"), Some(InteractiveCommand::Load));
        assert_eq!(parse_command("2"), Some(InteractiveCommand::Generate));
        assert_eq!(parse_command("7"), Some(InteractiveCommand::Intervals));
        assert_eq!(parse_command("10"), Some(InteractiveCommand::Summary));
        assert_eq!(parse_command("11"), Some(InteractiveCommand::Sample));
        assert_eq!(parse_command("0"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_name() {
        assert_eq!(parse_command("load"), Some(InteractiveCommand::Load));
        assert_eq!(parse_command("Backtest"), Some(InteractiveCommand::Backtest));
        assert_eq!(parse_command(" ranges "), Some(InteractiveCommand::Ranges));
        assert_eq!(parse_command("CI"), Some(InteractiveCommand::Intervals));
        assert_eq!(parse_command("exit"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_unknown() {
        assert_eq!(parse_command("foo"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("12"), None);
    }

    #[test]
    fn test_parse_candidate() {
        assert_eq!(
            parse_candidate("31 25 19 13 7 1").unwrap().numbers(),
            &[1, 7, 13, 19, 25, 31]
        );
        assert!(parse_candidate("1,2,3,4,5,6").is_ok());
        assert!(parse_candidate("1 2 3").is_err());
        assert!(parse_candidate("1 2 3 4 5 x").is_err());
        assert!(parse_candidate("1 2 3 4 5 99").is_err());
    }

    #[test]
    fn test_parse_ranges_and_columns() {
        assert_eq!(parse_ranges("1-5, 7-16,16-25 25-34,35-44,40-49").unwrap().len(), 6);
        assert!(parse_ranges("5-1").is_err());
        assert_eq!(parse_columns("all").unwrap().len(), 7);
        assert_eq!(parse_columns("Num2,Num7").unwrap(), vec![Column::Num2, Column::Num7]);
        assert!(parse_columns("Num9").is_err());
    }

    #[test]
    fn test_dispatch_without_data_fails_cleanly() {
        let mut session = Session::new(AnalysisConfig::default());
        assert!(dispatch(InteractiveCommand::Summary, &mut session).is_err());
        assert!(dispatch(InteractiveCommand::Clean, &mut session).is_err());
    }
}
