//! Host collaborator interfaces.
//!
//! The engine draws nothing and displays no text. After each change it hands
//! a [`Frame`] to an optional [`Renderer`], and it reports steady states to an
//! optional [`Notifier`]. Closures implement both traits.

use life_grid::grid::Grid;
use life_grid::tile::{Tile, TileState};

use crate::steady::SteadyStateReached;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A read-only view of the simulation after a change.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub grid: &'a Grid,
    pub generation: u64,
    pub running: bool,
}

impl<'a> Frame<'a> {
    pub fn tiles(&self) -> &'a [Tile] {
        self.grid.tiles()
    }

    pub fn neighbor_counts(&self) -> &'a [u8] {
        self.grid.neighbor_counts()
    }

    /// Plain-text picture of the grid: `#` alive, `+` dead, `.` empty.
    pub fn to_ascii(&self) -> String {
        let dimension = self.grid.dimension();
        let mut out = String::with_capacity(dimension * (dimension + 1));
        for row in self.tiles().chunks(dimension) {
            for tile in row {
                out.push(match tile.state() {
                    TileState::Alive => '#',
                    TileState::Dead => '+',
                    TileState::Empty => '.',
                });
            }
            out.push('\n');
        }
        out
    }

    /// One-line status summary.
    pub fn status_line(&self) -> String {
        format!(
            "generation {} | population {} | {}",
            self.generation,
            self.grid.population(),
            if self.running { "running" } else { "stopped" }
        )
    }
}

// ---------------------------------------------------------------------------
// Renderer / Notifier
// ---------------------------------------------------------------------------

/// Consumes the grid after every step, edit, resize, reset and restore.
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);
}

impl<F> Renderer for F
where
    F: FnMut(&Frame<'_>),
{
    fn render(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// Receives one event per steady generation.
pub trait Notifier {
    fn steady_state_reached(&mut self, event: SteadyStateReached);
}

impl<F> Notifier for F
where
    F: FnMut(SteadyStateReached),
{
    fn steady_state_reached(&mut self, event: SteadyStateReached) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_marks_each_state() {
        let mut grid = Grid::new(3).unwrap();
        grid.set_alive(&[0, 4]).unwrap();
        grid.toggle(0).unwrap();
        let frame = Frame {
            grid: &grid,
            generation: 0,
            running: false,
        };
        assert_eq!(frame.to_ascii(), "+..\n.#.\n...\n");
    }

    #[test]
    fn status_line_reports_population() {
        let mut grid = Grid::new(3).unwrap();
        grid.set_alive(&[1, 2]).unwrap();
        let frame = Frame {
            grid: &grid,
            generation: 7,
            running: true,
        };
        assert_eq!(frame.status_line(), "generation 7 | population 2 | running");
    }

    #[test]
    fn closures_are_renderers_and_notifiers() {
        let grid = Grid::new(2).unwrap();
        let mut frames = 0;
        {
            let mut renderer = |frame: &Frame<'_>| {
                assert_eq!(frame.tiles().len(), 4);
                frames += 1;
            };
            renderer.render(&Frame {
                grid: &grid,
                generation: 0,
                running: false,
            });
        }
        assert_eq!(frames, 1);

        let mut events = Vec::new();
        {
            let mut notifier = |event: SteadyStateReached| events.push(event);
            notifier.steady_state_reached(SteadyStateReached {
                generation: 3,
                was_running: true,
            });
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].generation, 3);
    }
}
