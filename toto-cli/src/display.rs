use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use textplots::{Chart, Plot, Shape};

use toto_analysis::backtest::{BacktestResult, MatchHistogram, PositionalBacktestResult, matched_numbers};
use toto_analysis::frequency::FrequencyTable;
use toto_analysis::interval::ConfidenceEntry;
use toto_analysis::position::PositionStats;
use toto_analysis::summary::{Comparison, DatasetSummary, EXPECTED_EVEN_COUNT, EXPECTED_WINNING_SUM};
use toto_db::models::{Column, DrawRecord, DrawTable};
use toto_db::validate::{ValidationReport, ViolationKind};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_counts(entries: &[(u8, u32)]) -> String {
    entries
        .iter()
        .map(|(n, c)| format!("{} ({})", n, c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{:^60}", title);
    println!("{}\n", "-".repeat(60));
}

pub fn display_validation_report(label: &str, report: &ValidationReport, show_rows: usize) {
    section("Cleaning data");
    println!("Source: {label}");

    let mut table = new_table();
    table.set_header(vec!["Check", "Rejected rows"]);
    for kind in ViolationKind::ALL {
        let count = report.count(kind);
        let cell = Cell::new(count);
        table.add_row(vec![
            Cell::new(kind.label()),
            if count > 0 { cell.fg(Color::Red) } else { cell },
        ]);
    }
    println!("{table}");

    if show_rows > 0 && !report.rejected.is_empty() {
        let mut rows = new_table();
        rows.set_header(vec!["Line", "Values", "Reasons"]);
        for rejection in report.rejected.iter().take(show_rows) {
            let reasons = rejection
                .violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            rows.add_row(vec![
                rejection.line.to_string(),
                rejection.fields.join(", "),
                reasons,
            ]);
        }
        println!("{rows}");
        if report.rejected.len() > show_rows {
            println!("  ... {} more", report.rejected.len() - show_rows);
        }
    }

    if let Some((first, last)) = report.date_range {
        println!("Date range: {} to {}", first.format("%d %b %Y"), last.format("%d %b %Y"));
    }
    println!(
        "Total clean rows: {} / {} ({} invalid)",
        report.accepted,
        report.total_rows,
        report.invalid_count()
    );
    if report.is_clean() {
        println!("Dataset is clean! Ready for analysis.");
    }
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["#", "Winning numbers", "Additional"]);
    for (i, draw) in draws.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_numbers(draw.winning()),
            format!("{:2}", draw.additional()),
        ]);
    }
    println!("{table}");
}

fn bar_chart(freq: &FrequencyTable) {
    let points: Vec<(f32, f32)> = freq.iter().map(|(n, c)| (n as f32, c as f32)).collect();
    Chart::new(120, 40, 0.5, 49.5)
        .lineplot(&Shape::Bars(&points))
        .display();
}

pub fn display_frequency(title: &str, freq: &FrequencyTable, expected: f64, top: usize, chart: bool) {
    section(title);

    let mut table = new_table();
    table.set_header(vec!["Number", "Count", "vs expected"]);
    for (number, count) in freq.iter() {
        let diff = count as f64 - expected;
        let color = if diff > 0.0 { Color::Green } else if diff < 0.0 { Color::Red } else { Color::White };
        table.add_row(vec![
            Cell::new(format!("{:2}", number)),
            Cell::new(count),
            Cell::new(format!("{:+.1}", diff)).fg(color),
        ]);
    }
    println!("{table}");

    println!("Total numbers counted: {}", freq.total());
    println!("Expected per number: {:.1}", expected);
    println!("Most frequent: {}", format_counts(&freq.most_frequent(top)));
    println!("Least frequent: {}", format_counts(&freq.least_frequent(top)));

    if chart {
        bar_chart(freq);
    }
}

pub fn display_position_stats(stats: &[PositionStats]) {
    section("Position statistics");

    let mut table = new_table();
    table.set_header(vec!["Column", "Mean", "Std dev", "Min", "Max", "Most common"]);
    for s in stats {
        table.add_row(vec![
            s.column.to_string(),
            format!("{:.2}", s.mean),
            format!("{:.2}", s.std_dev),
            s.min.to_string(),
            s.max.to_string(),
            format_counts(&s.most_common),
        ]);
    }
    println!("{table}");
    println!("(sample standard deviation)");
}

pub fn display_column_chart(column: Column, freq: &FrequencyTable) {
    println!("\n── {} counts ──", column);
    bar_chart(freq);
}

pub fn display_grouped(grouped: &[(Column, FrequencyTable)]) {
    section("Grouped frequency");

    let mut table = new_table();
    let mut header = vec!["Number".to_string()];
    header.extend(grouped.iter().map(|(c, _)| c.to_string()));
    table.set_header(header);

    for number in 1..=toto_db::models::POOL_SIZE {
        let mut row = vec![format!("{:2}", number)];
        row.extend(grouped.iter().map(|(_, f)| f.count(number).to_string()));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_intervals(column: Column, entries: &[ConfidenceEntry], level: f64, chart: bool) {
    let pct = level * 100.0;
    section(&format!("{:.0}% confidence intervals for {} (sorted by %)", pct, column));

    let mut table = new_table();
    table.set_header(vec![
        "Number".to_string(),
        "Count".to_string(),
        "Proportion".to_string(),
        "%".to_string(),
        format!("{:.0}% CI lower", pct),
        format!("{:.0}% CI upper", pct),
        "CI width".to_string(),
    ]);
    for e in entries {
        table.add_row(vec![
            format!("{:2}", e.number),
            e.count.to_string(),
            format!("{:.4}", e.proportion),
            format!("{:.1}%", e.proportion * 100.0),
            format!("{:.1}%", e.lower * 100.0),
            format!("{:.1}%", e.upper * 100.0),
            format!("{:.1}%", e.width() * 100.0),
        ]);
    }
    println!("{table}");
    println!("(Wald normal approximation)");

    if chart && !entries.is_empty() {
        let mut by_number: Vec<&ConfidenceEntry> = entries.iter().collect();
        by_number.sort_by_key(|e| e.number);
        let upper: Vec<(f32, f32)> = by_number.iter().map(|e| (e.number as f32, (e.upper * 100.0) as f32)).collect();
        let point: Vec<(f32, f32)> = by_number.iter().map(|e| (e.number as f32, (e.proportion * 100.0) as f32)).collect();
        let lower: Vec<(f32, f32)> = by_number.iter().map(|e| (e.number as f32, (e.lower * 100.0) as f32)).collect();

        println!("\n── {} : % with interval bounds ──", column);
        Chart::new(120, 40, 0.5, 49.5)
            .lineplot(&Shape::Points(&upper))
            .lineplot(&Shape::Points(&point))
            .lineplot(&Shape::Points(&lower))
            .display();
    }
}

fn histogram_table(title: &str, label: &str, histogram: &MatchHistogram) -> Table {
    let mut table = new_table();
    table.set_header(vec![title.to_string(), "Draws".to_string()]);
    for (score, count) in histogram.iter() {
        table.add_row(vec![format!("{} {}", score, label), count.to_string()]);
    }
    table
}

pub fn display_backtest(table: &DrawTable, result: &BacktestResult, details: bool) {
    section("Backtest");
    println!("Testing for: {}", format_numbers(result.candidate.numbers()));

    if details {
        for (i, (draw, count)) in table.iter().zip(&result.match_counts).enumerate() {
            println!(
                "Draw {}: matched {} number(s): {:?}",
                i,
                count,
                matched_numbers(draw, &result.candidate)
            );
        }
    }

    println!("{}", histogram_table("Matches", "correct", &result.histogram));
    println!("Average correct predictions per draw: {:.2}", result.mean_matches);
    println!("Winning draws (3 or more hits): {} / {}", result.winners, result.total_draws);
    println!("Win rate: {:.2}%", result.win_rate * 100.0);
    println!("(the additional number counts as an ordinary match)");
}

pub fn display_positional_backtest(result: &PositionalBacktestResult) {
    section("Backtest with positional ranges");
    for (i, r) in result.ranges.iter().enumerate() {
        println!("  Position {} (Num{}): {} to {}", i + 1, i + 1, r.low, r.high);
    }

    println!("{}", histogram_table("In range", "correct", &result.correct_histogram));
    println!("Average correct positions per draw: {:.2}", result.mean_correct);
    println!("{}", histogram_table("Out of range", "opposite", &result.opposite_histogram));
    println!("Average opposite positions per draw: {:.2}", result.mean_opposite);
}

fn summary_rows(table: &mut Table, s: &DatasetSummary) {
    table.add_row(vec!["Total draws".to_string(), s.draws.to_string()]);
    table.add_row(vec!["Most frequent".to_string(), format_counts(&s.most_frequent)]);
    table.add_row(vec!["Least frequent".to_string(), format_counts(&s.least_frequent)]);
    table.add_row(vec!["Expected per number".to_string(), format!("{:.1}", s.expected_frequency)]);
    table.add_row(vec!["Frequency std dev".to_string(), format!("{:.2}", s.frequency_spread)]);
    table.add_row(vec!["Std dev / expected".to_string(), format!("{:.3}", s.relative_spread)]);
    for (column, top) in &s.position_modes {
        let values = top.iter().map(|(n, _)| n.to_string()).collect::<Vec<_>>().join(", ");
        table.add_row(vec![format!("{} most common", column), values]);
    }
    table.add_row(vec![
        "Draws with consecutive numbers".to_string(),
        format!("{} ({:.1}%)", s.consecutive_draws, s.consecutive_rate * 100.0),
    ]);
    table.add_row(vec![
        "Average even numbers".to_string(),
        format!("{:.1} / 6 (expected {:.1})", s.avg_even, EXPECTED_EVEN_COUNT),
    ]);
    table.add_row(vec![
        "Average sum".to_string(),
        format!("{:.1} (expected {:.0})", s.avg_sum, EXPECTED_WINNING_SUM),
    ]);
}

pub fn display_summary(label: &str, summary: &DatasetSummary) {
    section("Quick summary analysis");
    println!("Dataset: {label}");
    let mut table = new_table();
    table.set_header(vec!["Measure", "Value"]);
    summary_rows(&mut table, summary);
    println!("{table}");
}

pub fn display_comparison(real_label: &str, sim_label: &str, cmp: &Comparison) {
    section("Real vs simulated");
    display_summary(real_label, &cmp.real);
    display_summary(sim_label, &cmp.simulated);

    println!("\nStandard deviation of frequencies:");
    println!("  Real data: {:.2}", cmp.real.frequency_spread);
    println!("  Simulated: {:.2}", cmp.simulated.frequency_spread);
    match cmp.spread_ratio {
        Some(ratio) => println!("  Ratio (real/sim): {:.2}", ratio),
        None => println!("  Ratio (real/sim): n/a"),
    }

    println!("Relative to the expected count (size independent):");
    println!("  Real data: {:.3}", cmp.real.relative_spread);
    println!("  Simulated: {:.3}", cmp.simulated.relative_spread);
    match cmp.relative_spread_ratio {
        Some(ratio) => println!("  Ratio (real/sim): {:.2}", ratio),
        None => println!("  Ratio (real/sim): n/a"),
    }
}
