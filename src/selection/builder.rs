use crate::geometry::{Canvas, Point, Rect};

use super::aspect::AspectConstraint;

/// Where the selection gesture currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Dragging,
    Fixed,
}

/// Tracks a press/drag/release gesture and the resulting rectangle.
///
/// ```text
/// Idle ──press──► Dragging ──release──► Fixed
///                   │  ▲                  │
///                   └──┘ drag             └──press──► Dragging
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBuilder {
    phase: SelectionPhase,
    anchor: Point<Canvas>,
    rect: Rect<Canvas>,
}

impl SelectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    /// Start a new selection at `p`, discarding any previous one.
    pub fn press(&mut self, p: Point<Canvas>) {
        self.anchor = p;
        self.rect = Rect::from_corners(p, p);
        self.phase = SelectionPhase::Dragging;
    }

    /// Move the free corner. Ignored unless a drag is in progress.
    pub fn drag(&mut self, p: Point<Canvas>, constraint: AspectConstraint) {
        if self.phase != SelectionPhase::Dragging {
            return;
        }
        self.rect = Rect::from_corners(self.anchor, free_corner(self.anchor, p, constraint));
    }

    /// Finish the gesture with the same rule `drag` uses.
    pub fn release(&mut self, p: Point<Canvas>, constraint: AspectConstraint) {
        if self.phase != SelectionPhase::Dragging {
            return;
        }
        self.drag(p, constraint);
        self.phase = SelectionPhase::Fixed;
    }

    /// Forget the selection (new page shown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The live rectangle as drawn, corners in gesture order.
    pub fn current(&self) -> Option<Rect<Canvas>> {
        match self.phase {
            SelectionPhase::Idle => None,
            SelectionPhase::Dragging | SelectionPhase::Fixed => Some(self.rect),
        }
    }

    /// The finished rectangle, normalized. `None` means "whole page".
    pub fn fixed(&self) -> Option<Rect<Canvas>> {
        match self.phase {
            SelectionPhase::Fixed => Some(self.rect.normalized()),
            _ => None,
        }
    }
}

/// Free corner for a drag from `anchor` to `pointer` under `constraint`.
///
/// With a ratio `r`, the axis with the larger delta follows the pointer and
/// the other axis is derived from it, growing in the pointer's direction
/// (a zero delta counts as positive).
pub fn free_corner(
    anchor: Point<Canvas>,
    pointer: Point<Canvas>,
    constraint: AspectConstraint,
) -> Point<Canvas> {
    let Some(r) = constraint.ratio() else {
        return pointer;
    };

    let dx = pointer.x - anchor.x;
    let dy = pointer.y - anchor.y;

    if dx.abs() >= dy.abs() {
        Point::new(pointer.x, anchor.y + sign(dy) * (dx.abs() / r))
    } else {
        Point::new(anchor.x + sign(dx) * (dy.abs() * r), pointer.y)
    }
}

#[inline]
fn sign(v: f64) -> f64 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}
