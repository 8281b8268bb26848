use crate::types::{BoardLayout, PlacedPiece};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// ASCII diagram of one board, each piece boxed and labelled with its spec id.
pub fn render_board(board: &BoardLayout) -> String {
    let scale = f64::min(
        MAX_WIDTH / board.width as f64,
        MAX_HEIGHT / board.height as f64,
    );
    let grid_w = (board.width as f64 * scale).round() as usize;
    let grid_h = (board.height as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];
    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    for &split in &board.column_splits {
        let sx = (split as f64 * scale).round() as usize;
        draw_rect(&mut grid, sx, 0, 0, grid_h);
    }

    for p in board.pieces() {
        draw_piece(&mut grid, p, scale);
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn draw_piece(grid: &mut [Vec<char>], p: &PlacedPiece, scale: f64) {
    let sx = (p.x as f64 * scale).round() as usize;
    let sy = (p.y as f64 * scale).round() as usize;
    let sw = (p.width as f64 * scale).round() as usize;
    let sh = (p.height as f64 * scale).round() as usize;
    if sw == 0 || sh == 0 {
        return;
    }
    draw_rect(grid, sx, sy, sw, sh);

    // Label only when it fits strictly inside the box
    let label: Vec<char> = p.spec_id.chars().collect();
    if sh < 2 || label.len() + 1 >= sw {
        return;
    }
    let cy = sy + sh / 2;
    let start = sx + (sw - label.len()) / 2;
    for (i, &ch) in label.iter().enumerate() {
        if let Some(cell) = grid.get_mut(cy).and_then(|row| row.get_mut(start + i)) {
            *cell = ch;
        }
    }
}

/// Writes one border character, turning crossings into `+`.
fn mark(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) else {
        return;
    };
    *cell = match (*cell, ch) {
        (' ', c) => c,
        (c, n) if c == n => c,
        _ => '+',
    };
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    for i in x..=x + w {
        mark(grid, i, y, '-');
        mark(grid, i, y + h, '-');
    }
    for j in y..=y + h {
        mark(grid, x, j, '|');
        mark(grid, x + w, j, '|');
    }
    for (cx, cy) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
        if let Some(cell) = grid.get_mut(cy).and_then(|row| row.get_mut(cx)) {
            *cell = '+';
        }
    }
}
