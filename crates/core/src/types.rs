use std::fmt;

/// Bounds of one UI element in device pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from the two corners of a `[x1,y1][x2,y2]` bounds attribute.
    /// `None` if the corners are inverted or the size overflows.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        let width = x2.checked_sub(x1).filter(|w| *w >= 0)?;
        let height = y2.checked_sub(y1).filter(|h| *h >= 0)?;
        Some(Self::new(x1, y1, width, height))
    }

    /// Point at the given fractions of width and height, truncated toward zero.
    pub fn point_at(&self, fx: f64, fy: f64) -> (i32, i32) {
        let x = self.x as f64 + self.width as f64 * fx;
        let y = self.y as f64 + self.height as f64 * fy;
        (x as i32, y as i32)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// One fully resolved device operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Literal text to type, backticks already restored
    TypeText(String),
    /// Shell command, `@` references already replaced by coordinates
    RawInput(String),
    /// Pause in milliseconds
    Sleep(u64),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::TypeText(text) => write!(f, "type {:?}", text),
            Action::RawInput(cmd) => write!(f, "raw  {}", cmd),
            Action::Sleep(ms) => write!(f, "wait {}ms", ms),
        }
    }
}
