use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cards::{Card, Suit};
use crate::classifier::Verdict;
use crate::hand::Street;
use crate::report::Report;
use crate::spr::SprSnapshot;
use crate::strategy::DecisionNode;

pub fn board_display(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let rank = card.rank.to_char();
            let symbol = card.suit.symbol();
            match card.suit {
                Suit::Spades => format!("{}{}", rank, symbol).white().to_string(),
                Suit::Hearts => format!("{}{}", rank, symbol).red().to_string(),
                Suit::Diamonds => format!("{}{}", rank, symbol).blue().to_string(),
                Suit::Clubs => format!("{}{}", rank, symbol).green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn equity_bar(equity: f64, width: usize) -> String {
    let filled = ((equity * width as f64) as usize).min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", equity * 100.0);

    if equity >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if equity >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

pub fn spr_table(snapshots: &[SprSnapshot]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Street"),
        Cell::new("Pot").set_alignment(CellAlignment::Right),
        Cell::new("Stack").set_alignment(CellAlignment::Right),
        Cell::new("SPR").set_alignment(CellAlignment::Right),
        Cell::new("Zone"),
    ]);
    for snap in snapshots {
        table.add_row(vec![
            Cell::new(snap.street.as_str().bold().to_string()),
            Cell::new(format!("${:.0}", snap.pot)),
            Cell::new(format!("${:.0}", snap.stack_remaining)),
            Cell::new(format!("{:.2}", snap.spr)),
            Cell::new(zone_cell(snap)),
        ]);
    }
    table.to_string()
}

fn zone_cell(snap: &SprSnapshot) -> String {
    let label = snap.zone.as_str();
    if snap.commitment.shove_zone {
        format!("{} (shove)", label).red().bold().to_string()
    } else {
        label.yellow().to_string()
    }
}

pub fn ranges_table(report: &Report) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Street"),
        Cell::new("Who"),
        Cell::new("Combos").set_alignment(CellAlignment::Right),
        Cell::new("Monster").set_alignment(CellAlignment::Right),
        Cell::new("Strong").set_alignment(CellAlignment::Right),
        Cell::new("Marginal").set_alignment(CellAlignment::Right),
        Cell::new("Draws").set_alignment(CellAlignment::Right),
        Cell::new("Air").set_alignment(CellAlignment::Right),
    ]);
    for (street, ranges) in &report.ranges_per_street {
        for (who, stats) in [("hero", &ranges.hero), ("villain", &ranges.villain)] {
            table.add_row(vec![
                Cell::new(street.as_str()),
                Cell::new(who),
                Cell::new(format!("{:.0}", stats.combos)),
                Cell::new(format!("{:.1}%", stats.monster)),
                Cell::new(format!("{:.1}%", stats.strong)),
                Cell::new(format!("{:.1}%", stats.marginal)),
                Cell::new(format!("{:.1}%", stats.draw_strong + stats.draw_weak)),
                Cell::new(format!("{:.1}%", stats.air)),
            ]);
        }
    }
    table.to_string()
}

fn verdict_cell(verdict: Verdict) -> String {
    match verdict {
        Verdict::Optimal => "optimal".green().bold().to_string(),
        Verdict::Acceptable => "acceptable".yellow().to_string(),
        Verdict::Mistake => "mistake".red().bold().to_string(),
    }
}

fn node_summary(node: &DecisionNode) -> String {
    let mut out = format!(
        "{} {:.0}%",
        node.primary.action,
        node.primary.frequency * 100.0
    );
    if let Some(sizing) = &node.primary.sizing {
        out.push_str(&format!(" ({})", sizing));
    }
    if let Some(alt) = &node.alternative {
        out.push_str(&format!(" / {} {:.0}%", alt.action, alt.frequency * 100.0));
    }
    out
}

pub fn decisions_table(report: &Report) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Street"),
        Cell::new("Spot"),
        Cell::new("You"),
        Cell::new("GTO"),
        Cell::new("Verdict"),
        Cell::new("Leak"),
    ]);
    for c in &report.decision_classifications {
        let node = DecisionNode {
            primary: c.gto_primary.clone(),
            alternative: c.gto_alternative.clone(),
        };
        let leak = c
            .leak_category
            .map(|l| l.as_str().red().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(c.street.as_str()),
            Cell::new(c.branch.as_str()),
            Cell::new(c.hero_action.as_str().bold().to_string()),
            Cell::new(node_summary(&node)),
            Cell::new(verdict_cell(c.verdict)),
            Cell::new(leak),
        ]);
    }
    table.to_string()
}

pub fn print_report(report: &Report, board: &[Card]) {
    print_section("Board", &board_display(board));
    println!("  {}", report.board_summary.narrative.summary);
    for (street, tag) in &report.board_summary.narrative.street_tags {
        if *street != Street::Preflop {
            println!("  {}: {}", street.as_str().bold(), tag);
        }
    }

    print_section("Ranges", "");
    println!("{}", ranges_table(report));

    print_section(
        "Equity",
        &equity_bar(report.equity_analysis.estimate.equity, 30),
    );
    if !report.equity_analysis.estimate.exact {
        println!("  {}", "heuristic estimate".dimmed());
    }
    if let Some(call) = &report.equity_analysis.call {
        let verdict = if call.profitable {
            "profitable call".green().bold().to_string()
        } else {
            "unprofitable call".red().bold().to_string()
        };
        println!(
            "  needs {:.1}% to call: {}",
            call.equity_needed * 100.0,
            verdict
        );
    }

    print_section("Stack-to-Pot", "");
    println!("{}", spr_table(&report.spr_analysis));

    print_section("Decisions", "");
    println!("{}", decisions_table(report));

    let summary = &report.leak_summary;
    print_section(
        "Summary",
        &format!(
            "{} optimal, {} acceptable, {} mistakes",
            summary.optimal.to_string().green().bold(),
            summary.acceptable.to_string().yellow(),
            summary.mistakes.to_string().red().bold()
        ),
    );
    if let Some(worst) = summary.worst_leak {
        println!("  worst leak: {}", worst.as_str().red().bold());
    }
    if report.degradation.any() {
        println!("  {}", "analysis degraded (local fallbacks used)".dimmed());
    }
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    if !content.is_empty() {
        println!("  {}", content);
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
