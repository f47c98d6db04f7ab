//! Terminal burndown chart.
//!
//! Rasterizes a project's sample series and the ideal line onto a character
//! grid, then paints it with ANSI styling: grey dots for the ideal line,
//! green for the actual series when on schedule, red when behind. The
//! rasterization itself is pure so it can be tested without a terminal.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use crossterm::style::Stylize;

use crate::project::{ProjectMetadata, Sample};
use crate::schedule;

const WIDTH: usize = 64;
const HEIGHT: usize = 18;
const Y_LABEL_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Blank,
    Ideal,
    Actual,
    Latest,
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Cell::Blank => ' ',
            Cell::Ideal => '.',
            Cell::Actual => '*',
            Cell::Latest => 'o',
        }
    }
}

/// Draw the burndown chart for a project to `out`, evaluated now.
pub fn render(
    metadata: &ProjectMetadata,
    samples: &[Sample],
    out: &mut impl Write,
) -> io::Result<()> {
    render_at(metadata, samples, Utc::now(), out)
}

pub fn render_at(
    metadata: &ProjectMetadata,
    samples: &[Sample],
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> io::Result<()> {
    let grid = rasterize(metadata, samples);
    let behind = samples
        .last()
        .is_some_and(|last| !schedule::on_schedule(
            metadata.start_date,
            metadata.goal_date,
            metadata.word_goal,
            last.words_remaining,
            now,
        ));

    let (y_max, y_min) = value_bounds(metadata, samples);
    writeln!(out)?;
    writeln!(
        out,
        "{:>pad$}{}",
        "",
        format!("{} - word goal burndown", metadata.project_id).bold(),
        pad = Y_LABEL_WIDTH + 2
    )?;

    for (row_idx, row) in grid.iter().enumerate() {
        let label = if row_idx % 4 == 0 || row_idx == HEIGHT - 1 {
            let value = row_value(row_idx, y_max, y_min);
            format!("{value:>width$}", width = Y_LABEL_WIDTH)
        } else {
            " ".repeat(Y_LABEL_WIDTH)
        };
        write!(out, "{label} |")?;
        for cell in row {
            match cell {
                Cell::Blank => write!(out, " ")?,
                Cell::Ideal => write!(out, "{}", '.'.dark_grey())?,
                Cell::Actual | Cell::Latest => {
                    let glyph = cell.glyph();
                    if behind {
                        write!(out, "{}", glyph.red())?;
                    } else {
                        write!(out, "{}", glyph.green())?;
                    }
                }
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "{} +{}", " ".repeat(Y_LABEL_WIDTH), "-".repeat(WIDTH))?;
    writeln!(
        out,
        "{} {:<left$}{:>right$}",
        " ".repeat(Y_LABEL_WIDTH),
        metadata.start_date.format("%d%b").to_string(),
        metadata.goal_date.format("%d%b").to_string(),
        left = WIDTH / 2,
        right = WIDTH - WIDTH / 2,
    )?;
    writeln!(
        out,
        "{}   {}   {}",
        " ".repeat(Y_LABEL_WIDTH),
        if behind {
            "* words remaining".red().to_string()
        } else {
            "* words remaining".green().to_string()
        },
        ". ideal burndown".dark_grey().to_string(),
    )?;
    Ok(())
}

/// Pure rasterization of both series onto a `HEIGHT x WIDTH` cell grid.
fn rasterize(metadata: &ProjectMetadata, samples: &[Sample]) -> Vec<[Cell; WIDTH]> {
    let mut grid = vec![[Cell::Blank; WIDTH]; HEIGHT];

    let x_start = metadata.start_instant();
    let goal_instant = metadata
        .goal_date
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    let x_end = samples
        .last()
        .map(|s| s.timestamp.max(goal_instant))
        .unwrap_or(goal_instant);
    let span_secs = (x_end - x_start).num_seconds().max(1);

    let (y_max, y_min) = value_bounds(metadata, samples);
    let y_span = (y_max - y_min).max(1) as f64;

    let row_of = |value: f64| -> usize {
        let frac = (y_max as f64 - value) / y_span;
        ((frac * (HEIGHT - 1) as f64).round() as isize).clamp(0, HEIGHT as isize - 1) as usize
    };

    for col in 0..WIDTH {
        let t = x_start
            + chrono::Duration::seconds(span_secs * col as i64 / (WIDTH - 1).max(1) as i64);

        if t <= goal_instant {
            let ideal = schedule::ideal_remaining(
                metadata.start_date,
                metadata.goal_date,
                metadata.word_goal,
                t,
            );
            grid[row_of(ideal)][col] = Cell::Ideal;
        }

        if let Some(actual) = interpolate(samples, t) {
            // Actual series wins over the ideal line when they collide.
            grid[row_of(actual)][col] = Cell::Actual;
        }
    }

    if let Some(last) = samples.last() {
        let col = (((last.timestamp - x_start).num_seconds() * (WIDTH - 1) as i64) / span_secs)
            .clamp(0, WIDTH as i64 - 1) as usize;
        grid[row_of(last.words_remaining as f64)][col] = Cell::Latest;
    }

    grid
}

fn value_bounds(metadata: &ProjectMetadata, samples: &[Sample]) -> (i64, i64) {
    let mut y_max = metadata.word_goal;
    let mut y_min = 0;
    for sample in samples {
        y_max = y_max.max(sample.words_remaining);
        y_min = y_min.min(sample.words_remaining);
    }
    (y_max, y_min)
}

fn row_value(row_idx: usize, y_max: i64, y_min: i64) -> i64 {
    let span = (y_max - y_min) as f64;
    y_max - (span * row_idx as f64 / (HEIGHT - 1) as f64).round() as i64
}

/// Words remaining at instant `t`, linearly interpolated between the two
/// surrounding samples; `None` outside the sampled range.
fn interpolate(samples: &[Sample], t: DateTime<Utc>) -> Option<f64> {
    let first = samples.first()?;
    let last = samples.last()?;
    if t < first.timestamp || t > last.timestamp {
        return None;
    }

    let mut prev = first;
    for next in &samples[1..] {
        if t <= next.timestamp {
            let gap = (next.timestamp - prev.timestamp).num_seconds();
            if gap == 0 {
                return Some(next.words_remaining as f64);
            }
            let frac = (t - prev.timestamp).num_seconds() as f64 / gap as f64;
            return Some(
                prev.words_remaining as f64
                    + frac * (next.words_remaining - prev.words_remaining) as f64,
            );
        }
        prev = next;
    }
    Some(last.words_remaining as f64)
}
