/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next screen into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each map cell is drawn two terminal columns wide so the grid looks square.

use std::io::{self, BufWriter, Write};
use std::mem::{self, Discriminant};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::Tile;
use crate::sim::session::Screen;
use crate::sim::world::Frame;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, so row gaps on VTE terminals
    /// match the clear colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies one column; overflow is clipped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect::<String>().trim_end().to_string()
    }
}

// ── Glyph styling ──

const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 3;

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

/// Two terminal columns and colours for one frame glyph.
fn glyph_style(ch: char) -> (char, char, Color, Color) {
    match ch {
        'P' => ('P', ']', GREEN, Color::Reset),
        'X' => ('X', 'X', RED, Color::Reset),
        'C' => ('(', ')', GOLD, Color::Reset),
        '#' => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        'H' => ('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        'E' => ('[', ']', Color::Rgb { r: 255, g: 120, b: 255 }, Color::Rgb { r: 60, g: 0, b: 60 }),
        ' ' => (' ', ' ', Color::Reset, Color::Reset),
        // Decoration: drawn as loaded.
        other => (other, ' ', Color::DarkGrey, Color::Reset),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Discriminant<Screen>>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, screen: &Screen) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen change → clear for a clean transition
        let kind = mem::discriminant(screen);
        if self.last_screen != Some(kind) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(kind);
        }

        self.compose(screen);
        self.flush_diff()?;

        // Swap: current front becomes next back
        mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // ResetColor would fall back to the terminal default, not BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, screen: &Screen) {
        self.front.clear();
        match screen {
            Screen::Title { width, height, stages, warnings } => {
                self.compose_title(*width, *height, *stages, warnings)
            }
            Screen::Play(frame) => self.compose_game(frame),
            Screen::GameOver { score } => self.compose_game_over(*score),
            Screen::Ending { score } => self.compose_ending(*score),
        }
    }

    fn compose_game(&mut self, f: &Frame) {
        let buf_w = self.front.width;

        // ── HUD ──
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        let hud = format!(" Stage: {} | Score: {}", f.stage + 1, f.score);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        let hearts: String = "♥".repeat(f.life as usize);
        self.front.put_str(1, HUD_ROW + 1, &format!("Life: {}", f.life), Color::White, Color::Reset);
        self.front.put_str(10, HUD_ROW + 1, &hearts, RED, Color::Reset);

        // ── Help bar ──
        let help = " ←→/AD: Move  ↑↓/WS: Ladder  SPACE: Jump  Q: Quit";
        self.front.put_str(0, HUD_ROW + 2, help, Color::DarkGrey, Color::Reset);

        // ── Map ──
        for (gy, line) in f.rows.iter().enumerate() {
            let row = MAP_ROW + gy;
            if row >= self.front.height { break; }
            for (gx, ch) in line.chars().enumerate() {
                let col = gx * CELL_W;
                if col + 1 >= buf_w { break; }
                let (c0, c1, fg, bg) = glyph_style(ch);
                self.front.set(col, row, Cell::new(c0, fg, bg));
                self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            }
        }
    }

    fn compose_title(&mut self, width: usize, height: usize, stages: usize, warnings: &[String]) {
        let title = [
            "#  # #  # #### #  # ###  ###",
            "## # #  # #    #  # #  #  # ",
            "# ## #  # # ## #  # ###   # ",
            "#  # #  # #  # #  # # #   # ",
            "#  # #### #### #### #  # ###",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(6, 2 + i, line, GOLD, Color::Reset);
        }

        let info = format!("MAP SIZE: {} x {}, STAGES: {}", width, height, stages);
        self.front.put_str(6, 9, &info, Color::White, Color::Reset);

        let mut row = 11;
        for w in warnings {
            self.front.put_str(6, row, w, RED, Color::Reset);
            row += 1;
        }

        self.front.put_str(10, row + 1, "PRESS ENTER TO START", GREEN, Color::Reset);
        self.front.put_str(14, row + 2, "(q to Quit)", Color::DarkGrey, Color::Reset);
    }

    fn compose_game_over(&mut self, score: u32) {
        let rule = "----------------------------------------";
        self.front.put_str(2, 2, rule, RED, Color::Reset);
        self.front.put_str(2, 3, "               Game Over", RED, Color::Reset);
        self.front.put_str(2, 4, rule, RED, Color::Reset);
        self.front.put_str(2, 6, &format!("Final Score: {}", score), Color::White, Color::Reset);
        self.front.put_str(2, 8, "Restart: ENTER  |  Quit: Q", GREEN, Color::Reset);
    }

    fn compose_ending(&mut self, score: u32) {
        let banner = [
            " ##   #    #       ###  #    ###   ##  ### ",
            "#  #  #    #      #     #    #    #  # #  #",
            "####  #    #      #     #    ###  #### ### ",
            "#  #  #    #      #     #    #    #  # # # ",
            "#  #  #### ####    ###  #### ###  #  # #  #",
        ];
        for (i, line) in banner.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }
        self.front.put_str(15, 9, &format!("Final Score: {}", score), Color::White, Color::Reset);
        self.front.put_str(11, 10, "PRESS ANY KEY TO QUIT", GREEN, Color::Reset);
    }
}
