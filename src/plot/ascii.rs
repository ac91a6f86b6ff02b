//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid with deterministic output (golden-testable).
//! Points are spaced evenly in display order: `o` marks a value, `-` joins
//! neighbours.

use crate::report::Series;

pub fn render_series_plot(series: &Series, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let values: Vec<f64> = series.points.iter().map(|(_, v)| *v).collect();
    let (y_min, y_max) = y_range(&values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let x_max = (values.len().saturating_sub(1)).max(1) as f64;
    let cells: Vec<(usize, usize)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (map_x(i as f64, x_max, width), map_y(v, y_min, y_max, height)))
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    for pair in cells.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        draw_line(&mut grid, x0, y0, x1, y1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let first = series.points.first().map(|(l, _)| l.as_str()).unwrap_or("");
    let last = series.points.last().map(|(l, _)| l.as_str()).unwrap_or("");

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | x=[{first}, {last}] | y=[{y_min:.2}, {y_max:.2}]{}\n",
        series.title, series.unit
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Flat series get a unit band so they plot mid-grid.
fn y_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid.get_mut(y0 as usize).and_then(|row| row.get_mut(x0 as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
