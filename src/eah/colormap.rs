//! Terminal colormap of a 2D matrix
//!
//! Debugging aid: renders histograms and distributions as 24-bit ANSI
//! grey-level cells, two characters wide so that cells look square.
//! With scales, a legend, the error bounds of each row and the evaluation
//! bounds of each column (printed vertically) are added.

use std::fmt::Write as _;

use crate::scale::Scale;

const NB_COLORS: f64 = 255.0;
const FG_SHIFT: usize = 127;
const NAN_CELL: &str = "╳╳";
const RESET: &str = "\x1b[0m";

/// Numeric cell that can be rendered.
pub trait CellValue: Copy {
    /// Value as a float (NaN and infinities render as crossed cells).
    fn as_f64(self) -> f64;
}

impl CellValue for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

impl CellValue for f32 {
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl CellValue for usize {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl CellValue for u64 {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl CellValue for bool {
    fn as_f64(self) -> f64 {
        f64::from(u8::from(self))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn grey(x: f64) -> usize {
    (x.floor().max(0.0) as usize).min(NB_COLORS as usize - 1)
}

/// Render `data` as a colormap.
///
/// - `ranges`: error (rows) and evaluation (columns) scales, adding legends
/// - `values`: overlay the value on every other column
///
/// Returns an empty string for an empty matrix.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn colormap<T: CellValue>(
    data: &[Vec<T>],
    ranges: Option<(&Scale, &Scale)>,
    values: bool,
) -> String {
    let height = data.len();
    let width = data.first().map_or(0, Vec::len);
    if height == 0 || width == 0 {
        return String::new();
    }

    let (vmin, vmax) = data
        .iter()
        .flatten()
        .map(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let spread = vmax - vmin;

    let mut out = String::new();
    if ranges.is_some() {
        let _ = write!(out, "[{vmin}");
        for i in 0..2 * height {
            let c = grey(i as f64 / (2 * height) as f64 * NB_COLORS - 1.0);
            let _ = write!(out, "\x1b[48;2;{c};{c};{c}m ");
        }
        let _ = writeln!(out, "{RESET}{vmax}]");
        let _ = writeln!(out, "{} Errors:", " ".repeat(2 * width));
    }

    for (i, row) in data.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            let val = cell.as_f64();
            if !val.is_finite() {
                out.push_str(NAN_CELL);
                continue;
            }
            let c = if spread > 0.0 {
                grey((val - vmin) / spread * (NB_COLORS - 1.0))
            } else {
                0
            };
            let fg = (c + FG_SHIFT) % NB_COLORS as usize;
            let _ = write!(out, "\x1b[48;2;{c};{c};{c};38;2;{fg};{fg};{fg}m");
            if values && j % 2 == 0 {
                let text = val.to_string();
                match text.len() {
                    1 => {
                        let _ = write!(out, " {text}");
                    }
                    2 => out.push_str(&text),
                    _ => out.push_str("++"),
                }
            } else {
                out.push_str("  ");
            }
            out.push_str(RESET);
        }
        if let Some((range_error, _)) = ranges {
            if let Ok((lo, hi)) = range_error.bounds(i) {
                let _ = write!(out, " [{lo} .. {hi}]");
            }
        }
        out.push('\n');
    }

    if let Some((_, range_evals)) = ranges {
        out.push_str("Evaluations:\n");
        let mut labels: Vec<String> = (0..width)
            .filter_map(|j| range_evals.bounds(j).ok().map(|(lo, _)| lo.to_string()))
            .collect();
        if let Ok((_, hi)) = range_evals.bounds(width - 1) {
            labels.push(hi.to_string());
        }
        let depth = labels.iter().map(String::len).max().unwrap_or(0);
        for k in 0..depth {
            for label in &labels {
                match label.chars().nth(k) {
                    Some(ch) => {
                        let _ = write!(out, "{ch} ");
                    }
                    None => out.push_str("  "),
                }
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix() {
        let data: Vec<Vec<f64>> = vec![];
        assert!(colormap(&data, None, false).is_empty());
    }

    #[test]
    fn test_one_line_per_row() {
        let data = vec![vec![0usize, 1, 2], vec![3, 4, 5]];
        let out = colormap(&data, None, false);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("\x1b[48;2;0;0;0"));
        assert!(out.contains("\x1b[48;2;254;254;254"));
    }

    #[test]
    fn test_nan_cells_are_crossed() {
        let data = vec![vec![f64::NAN, 1.0]];
        assert!(colormap(&data, None, false).starts_with(NAN_CELL));
    }

    #[test]
    fn test_value_overlay() {
        let data = vec![vec![7usize, 8, 12]];
        let out = colormap(&data, None, true);
        assert!(out.contains("m 7"));
        assert!(out.contains("m12"));
    }

    #[test]
    fn test_legends_with_scales() {
        let errors = Scale::linear(0.0, 10.0, 2).unwrap();
        let evals = Scale::linear(0.0, 100.0, 2).unwrap();
        let data = vec![vec![0.0, 0.5], vec![0.5, 1.0]];
        let out = colormap(&data, Some((&errors, &evals)), false);
        assert!(out.contains(" Errors:"));
        assert!(out.contains("[0 .. 5]"));
        assert!(out.contains("[5 .. 10]"));
        assert!(out.contains("Evaluations:"));
    }
}
