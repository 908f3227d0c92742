use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use glam::IVec2;
use rand::Rng;
use std::io::{stdout, BufWriter, Write};
use std::time::{Duration, Instant};

use chunkgen::{ChunkGenerator, GeneratorConfig, OccupancyField};

const FRAME_TIME: Duration = Duration::from_millis(100);

fn get_terminal_size() -> (usize, usize) {
    match terminal::size() {
        Ok((cols, rows)) => (cols as usize, rows as usize),
        Err(_) => (80, 24), // fallback
    }
}

/// Cycles through the layers of one generated chunk.
struct LayerPreview {
    field: OccupancyField,
    layer: usize,
}

impl LayerPreview {
    fn new(field: OccupancyField) -> Self {
        Self { field, layer: 0 }
    }

    fn handle_input(&mut self) -> Result<bool> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
        Ok(true)
    }

    fn render(&self, out: &mut impl Write) -> Result<()> {
        let (cols, rows) = get_terminal_size();
        let visible_rows = rows.saturating_sub(1);
        let visible_cols = cols.min(self.field.depth());

        queue!(
            out,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            Print(format!(
                "layer {:>3}/{}  (q to quit)",
                self.layer + 1,
                self.field.height()
            ))
        )?;
        for (r, row) in self.field.rows(self.layer).take(visible_rows).enumerate() {
            let line: String = row[..visible_cols]
                .iter()
                .map(|cell| if cell.is_solid() { '█' } else { ' ' })
                .collect();
            queue!(out, cursor::MoveTo(0, r as u16 + 1), Print(line))?;
        }
        out.flush()?;
        Ok(())
    }

    fn advance(&mut self) {
        self.layer = (self.layer + 1) % self.field.height();
    }

    fn run(&mut self, out: &mut impl Write) -> Result<()> {
        loop {
            let frame_start = Instant::now();
            if !self.handle_input()? {
                return Ok(());
            }
            self.render(out)?;
            self.advance();
            if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            GeneratorConfig::load(&path).with_context(|| format!("failed to load config {path}"))?
        }
        None => GeneratorConfig::default(),
    };
    // Draw from OS entropy only here, so the library never seeds implicitly.
    let seed = *config.seed.get_or_insert_with(|| rand::rng().random());
    log::info!("generating with seed {seed}");

    let generator = ChunkGenerator::seeded(config, seed)?;
    let field = generator.generate(IVec2::ZERO)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = LayerPreview::new(field).run(&mut out);

    execute!(out, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}
