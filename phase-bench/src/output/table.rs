//! Table output using comfy-table.
//!
//! One table per engine with columns:
//! Size | Passes | Device (ms) | CPU (ms) | Speedup | Melem/s | CV% | Checksum | Valid

use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use phase_engines::EngineKind;

use crate::harness::{format_size, DataPoint};

fn right(text: impl ToString) -> Cell {
    Cell::new(text.to_string()).set_alignment(CellAlignment::Right)
}

/// Build the results table for one engine.
pub fn build_table(data: &[&DataPoint]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            [
                "Size",
                "Passes",
                "Device (ms)",
                "CPU (ms)",
                "Speedup",
                "Melem/s",
                "CV%",
                "Checksum",
                "Valid",
            ]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

    for dp in data {
        let speedup = format!("{:.1}x", dp.speedup);
        let speedup_color = if dp.speedup >= 2.0 {
            Color::Green
        } else if dp.speedup >= 1.0 {
            Color::Yellow
        } else {
            Color::Red
        };

        let checksum = dp
            .checksum
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        let valid = if dp.validated {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("NO").fg(Color::Red).add_attribute(Attribute::Bold)
        };

        table.add_row(vec![
            right(format_size(dp.size)),
            right(dp.passes),
            right(format!("{:.3}", dp.device_stats.mean)),
            right(format!("{:.3}", dp.cpu_stats.mean)),
            right(speedup).fg(speedup_color),
            right(format!("{:.1}", dp.melem_per_sec)),
            right(format!("{:.1}", dp.device_stats.cv_percent)),
            right(checksum),
            valid,
        ]);
    }

    table
}

/// Render results grouped by engine, in `EngineKind::ALL` order.
pub fn render_all_tables(data: &[DataPoint]) {
    if data.is_empty() {
        println!("No results to display.");
        return;
    }

    for kind in EngineKind::ALL {
        let points: Vec<&DataPoint> = data.iter().filter(|dp| dp.engine == kind).collect();
        if points.is_empty() {
            continue;
        }
        println!("\n=== {} ===", kind);
        println!("{}", build_table(&points));
    }
}
