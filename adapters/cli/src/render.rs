use std::fmt::Write as _;

use warehouse_core::{CellCoord, FloorSnapshot, ROBOT_CODE};

/// Draws the floor as text with row `0` on top.
///
/// Robots show as `R`, empty cells as `.` and stacks as their height.
pub(crate) fn render_floor(snapshot: &FloorSnapshot) -> String {
    let (width, height) = snapshot.dimensions();
    let mut out = String::with_capacity((width as usize + 1) * height as usize);
    for row in 0..height {
        for column in 0..width {
            out.push(glyph(snapshot.code(CellCoord::new(column, row)).unwrap_or(0)));
        }
        out.push('\n');
    }
    out
}

/// One-line tally of robots and stack heights.
pub(crate) fn summarize(snapshot: &FloorSnapshot) -> String {
    let mut heights = [0usize; 10];
    let mut robots = 0usize;
    for &code in snapshot.codes() {
        if code == ROBOT_CODE {
            robots += 1;
        } else if let Some(slot) = heights.get_mut(usize::from(code)) {
            *slot += 1;
        }
    }

    let mut line = format!("robots={robots}");
    for (height, cells) in heights.iter().enumerate().skip(1) {
        if *cells > 0 {
            let _ = write!(line, " h{height}={cells}");
        }
    }
    line
}

fn glyph(code: u8) -> char {
    match code {
        ROBOT_CODE => 'R',
        0 => '.',
        other => char::from_digit(u32::from(other), 10).unwrap_or('?'),
    }
}
