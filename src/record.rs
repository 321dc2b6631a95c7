//! Relation records returned by neighbor listings.

use std::fmt;

/// Which directional index an operation addresses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Direction {
    /// `origin` follows `target`.
    Forward,
    /// `origin` is followed by `target`.
    Reverse,
}

impl Direction {
    /// Both directions, forward first.
    pub const ALL: [Direction; 2] = [Direction::Forward, Direction::Reverse];

    /// Arrow rendered between origin and target.
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::Forward => "->",
            Direction::Reverse => "<-",
        }
    }

    /// Lower-case name, used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge as seen from a directional index.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Relation {
    /// Index the edge was read from.
    pub direction: Direction,
    /// Identifier the scan started at.
    pub origin: String,
    /// Identifier at the other end of the edge.
    pub target: String,
}

impl Relation {
    /// Creates a record.
    pub fn new(direction: Direction, origin: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            direction,
            origin: origin.into(),
            target: target.into(),
        }
    }

    /// Direction arrow, `"->"` or `"<-"`.
    pub fn symbol(&self) -> &'static str {
        self.direction.symbol()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.origin, self.symbol(), self.target)
    }
}
