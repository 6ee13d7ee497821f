// this_file: crates/texform-formula/src/linebreak.rs

//! Greedy line breaking of a horizontal box at its permitted break positions.

use crate::boxes::{BoxKind, TexBox};
use log::debug;
use std::ops::Range;

/// Break `b` into lines no wider than `width` where possible, stacked with `interline`
/// between them.
///
/// Boxes that already fit, or that have no break positions, are returned unchanged. A
/// segment without any break position stays on one line even if it is too wide.
pub fn split(b: TexBox, width: f32, interline: f32) -> TexBox {
    let (children, breaks) = match b.kind {
        BoxKind::Horizontal { children, breaks } if b.width > width && !breaks.is_empty() => {
            (children, breaks)
        }
        kind => return TexBox { kind, ..b },
    };

    let ranges = line_ranges(&children, &breaks, width);
    debug!(
        target: "texform::linebreak",
        "split {:.3}em into {} lines of at most {:.3}em",
        b.width,
        ranges.len(),
        width
    );

    let mut iter = children.into_iter();
    let mut stacked = Vec::with_capacity(ranges.len() * 2);
    let mut first_height = 0.0;
    for (idx, range) in ranges.into_iter().enumerate() {
        let mut line: Vec<TexBox> = iter.by_ref().take(range.len()).collect();
        if idx == 0 {
            let row = TexBox::horizontal(line);
            first_height = row.height;
            stacked.push(row);
            continue;
        }
        // glue left over from the break point
        let leading = line
            .iter()
            .take_while(|c| c.kind == BoxKind::Strut && c.total_height() == 0.0)
            .count();
        line.drain(..leading);
        stacked.push(TexBox::strut(0.0, interline, 0.0));
        stacked.push(TexBox::horizontal(line));
    }

    let mut result = TexBox::vertical(stacked, first_height);
    result.foreground = b.foreground;
    result.background = b.background;
    result
}

fn line_ranges(children: &[TexBox], breaks: &[usize], width: f32) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut acc = 0.0;
    let mut candidate = None;
    for (idx, child) in children.iter().enumerate() {
        if idx > start && breaks.contains(&idx) {
            candidate = Some(idx);
        }
        acc += child.width;
        if acc > width {
            if let Some(cut) = candidate.take() {
                ranges.push(start..cut);
                start = cut;
                acc = children[start..=idx].iter().map(|c| c.width).sum();
            }
        }
    }
    ranges.push(start..children.len());
    ranges
}
