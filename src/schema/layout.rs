//! Fixture and layout types describing one candidate room configuration.

use serde::{Deserialize, Serialize};

/// Highest valid brightness selector.
pub const MAX_SELECTOR: u8 = 4;

/// Electrical and photometric output of a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LampOutput {
    /// Power draw in watts.
    pub watts: u32,
    /// Luminous intensity in candela.
    pub candela: f64,
}

/// Lamp outputs indexed by brightness selector.
const LAMP_TABLE: [LampOutput; 5] = [
    LampOutput {
        watts: 40,
        candela: 167.9544249,
    },
    LampOutput {
        watts: 60,
        candela: 298.5856442,
    },
    LampOutput {
        watts: 75,
        candela: 410.5552608,
    },
    LampOutput {
        watts: 100,
        candela: 597.1712885,
    },
    LampOutput {
        watts: 150,
        candela: 970.4033438,
    },
];

/// Look up the output for a brightness selector.
///
/// Selectors outside `0..=4` describe a disabled lamp and yield zero output.
#[inline]
pub fn lamp_output(selector: u8) -> LampOutput {
    LAMP_TABLE
        .get(selector as usize)
        .copied()
        .unwrap_or(LampOutput {
            watts: 0,
            candela: 0.0,
        })
}

/// A single ceiling light fixture.
///
/// Fixtures are values: "changing" a fixture means building a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    x: u32,
    y: u32,
    selector: u8,
    on: bool,
}

impl Fixture {
    /// Create a fixture at `(x, y)` with the given brightness selector and power state.
    pub fn new(x: u32, y: u32, selector: u8, on: bool) -> Self {
        Self { x, y, selector, on }
    }

    /// Position along the room width.
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Position along the room length.
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Brightness selector.
    #[inline]
    pub fn selector(&self) -> u8 {
        self.selector
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Power draw in watts, regardless of power state.
    #[inline]
    pub fn watts(&self) -> u32 {
        lamp_output(self.selector).watts
    }

    /// Luminous intensity in candela, regardless of power state.
    #[inline]
    pub fn luminous_intensity(&self) -> f64 {
        lamp_output(self.selector).candela
    }
}

/// Ordered, fixed-length sequence of fixtures.
///
/// The length is set at construction and never changes; slots can only be
/// replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    fixtures: Vec<Fixture>,
}

impl Layout {
    /// Build a layout from a fixture list.
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self { fixtures }
    }

    /// Number of fixture slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Fixture in slot `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    /// Replace the fixture in slot `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn replace(&mut self, index: usize, fixture: Fixture) -> Fixture {
        std::mem::replace(&mut self.fixtures[index], fixture)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }

    /// Fixtures that are switched on.
    pub fn powered(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|f| f.is_on())
    }

    /// Number of fixtures switched on.
    pub fn powered_count(&self) -> usize {
        self.powered().count()
    }

    /// Total wattage drawn by powered fixtures.
    pub fn powered_watts(&self) -> u64 {
        self.powered().map(|f| u64::from(f.watts())).sum()
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a Fixture;
    type IntoIter = std::slice::Iter<'a, Fixture>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixtures.iter()
    }
}
