use crate::error::{PageError, Result};
use crate::pdf::SourceDocument;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Right, // 90° clockwise
    Down,  // 180°
    Left,  // 90° counter-clockwise
}

impl Rotation {
    /// Accepts any multiple of 90, e.g. 90, -90, 180, 270 or 450.
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(PageError::InvalidRotation(degrees));
        }
        Ok(Rotation::normalized(degrees))
    }

    fn normalized(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Right,
            180 => Rotation::Down,
            _ => Rotation::Left,
        }
    }

    /// Clockwise degrees in `0..360`.
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Right => 90,
            Rotation::Down => 180,
            Rotation::Left => 270,
        }
    }

    /// Rotate by `self`, then by `other`.
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::normalized(self.degrees() + other.degrees())
    }

    /// The `/Rotate` value of a page currently at `current` degrees after
    /// applying this rotation.
    pub fn apply_to(self, current: i64) -> i64 {
        (current + self.degrees()).rem_euclid(360)
    }
}

/// An opaque reference to one page of a [`SourceDocument`].
///
/// Rotating a reference records the turn; the source page is never modified.
#[derive(Clone, Copy)]
pub struct PageRef<'a> {
    pub(crate) source: &'a SourceDocument,
    pub(crate) index: u32,
    pub(crate) rotation: Rotation,
}

impl<'a> PageRef<'a> {
    pub fn source(&self) -> &'a SourceDocument {
        self.source
    }

    /// 0-based page index within the source.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn rotated(self, rotation: Rotation) -> Self {
        PageRef {
            rotation: self.rotation.then(rotation),
            ..self
        }
    }
}

impl fmt::Debug for PageRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRef")
            .field("source", &self.source.name())
            .field("page", &(self.index + 1))
            .field("rotation", &self.rotation)
            .finish()
    }
}
