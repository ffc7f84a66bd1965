#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for stackbots adapters.
//!
//! Rendering is presentation only: a [`Frame`] is built from the wire-level
//! [`SimulationState`] and never feeds back into the simulation.

use anyhow::Result as AnyResult;
use stackbots_core::{RunStatus, SimulationState, STACK_CAPACITY};
use std::{error::Error, fmt, io::Write};

/// Symbol drawn for a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Nothing on the cell.
    Empty,
    /// Perimeter wall.
    Wall,
    /// Robot with empty hands.
    Robot,
    /// Robot carrying an item.
    LadenRobot,
    /// A single item lying on its own.
    LoneItem,
    /// Two or more items sharing a cell.
    Stack(usize),
}

impl Glyph {
    /// Glyph for a cell holding `item_count` active items and no robot.
    #[must_use]
    pub const fn for_items(item_count: usize) -> Self {
        match item_count {
            0 => Self::Empty,
            1 => Self::LoneItem,
            count => Self::Stack(count),
        }
    }

    /// Character used by text backends.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::Robot => 'r',
            Self::LadenRobot => 'R',
            Self::LoneItem => 'o',
            Self::Stack(count) => {
                let clamped = count.min(STACK_CAPACITY);
                char::from_digit(u32::try_from(clamped).unwrap_or(9), 10).unwrap_or('+')
            }
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Fully resolved picture of the floor at the end of a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    step: u64,
    status: RunStatus,
    glyphs: Vec<Glyph>,
}

impl Frame {
    /// Number of columns in the frame.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the frame.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Step the frame was captured at.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Run status the frame was captured with.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Glyph at the provided position, if it lies inside the frame.
    #[must_use]
    pub fn glyph(&self, column: u32, row: u32) -> Option<Glyph> {
        self.index(column, row).map(|index| self.glyphs[index])
    }

    /// Text rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX);
        self.glyphs
            .chunks(width.max(1))
            .map(|row| row.iter().map(|glyph| glyph.symbol()).collect())
    }

    fn index(&self, column: u32, row: u32) -> Option<usize> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let index = u64::from(row) * u64::from(self.width) + u64::from(column);
        usize::try_from(index).ok()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Builds the text frame for `state` on a `width` by `height` floor.
///
/// Perimeter cells draw as walls. Robots are drawn over whatever lies on
/// their cell. Entries outside the floor are skipped.
pub fn render_frame(
    state: &SimulationState,
    width: u32,
    height: u32,
) -> Result<Frame, RenderingError> {
    if width == 0 || height == 0 {
        return Err(RenderingError::EmptyFloor { width, height });
    }

    let mut frame = Frame {
        width,
        height,
        step: state.step,
        status: state.status,
        glyphs: Vec::new(),
    };
    let area = u64::from(width) * u64::from(height);
    frame.glyphs = vec![Glyph::Empty; usize::try_from(area).unwrap_or(0)];

    for row in 0..height {
        for column in 0..width {
            let border = column == 0 || row == 0 || column + 1 == width || row + 1 == height;
            if border {
                if let Some(index) = frame.index(column, row) {
                    frame.glyphs[index] = Glyph::Wall;
                }
            }
        }
    }

    let mut counts = vec![0_usize; frame.glyphs.len()];
    for item in state.items.iter().filter(|item| item.active) {
        if let Some(index) = frame.index(item.x, item.y) {
            counts[index] += 1;
        }
    }
    for (glyph, count) in frame.glyphs.iter_mut().zip(counts) {
        if count > 0 {
            *glyph = Glyph::for_items(count);
        }
    }

    for robot in &state.robots {
        if let Some(index) = frame.index(robot.x, robot.y) {
            frame.glyphs[index] = if robot.carrying {
                Glyph::LadenRobot
            } else {
                Glyph::Robot
            };
        }
    }

    Ok(frame)
}

/// Rendering backend capable of presenting frames to the user.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend that prints frames as plain text.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend printing into `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Borrows the underlying writer for output that is not a frame.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Hands back the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        writeln!(
            self.writer,
            "step {} ({})",
            frame.step(),
            status_label(frame.status())
        )?;
        write!(self.writer, "{frame}")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Human readable label for a run status.
#[must_use]
pub const fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "running",
        RunStatus::Succeeded => "succeeded",
        RunStatus::TimedOut => "timed out",
    }
}

/// Errors that can occur when building frames.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A frame needs at least one row and one column.
    EmptyFloor {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFloor { width, height } => {
                write!(f, "cannot render a {width}x{height} floor")
            }
        }
    }
}

impl Error for RenderingError {}
