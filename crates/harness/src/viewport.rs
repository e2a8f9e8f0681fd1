//! The fixed viewport table every case matrix is generated against.

use serde::Serialize;

/// A named viewport configuration applied per test case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Whether the device-metrics override reports a mobile device.
    pub mobile: bool,
}

pub const DESKTOP: Viewport = Viewport {
    name: "desktop",
    width: 1440,
    height: 1100,
    mobile: false,
};

pub const MOBILE: Viewport = Viewport {
    name: "mobile",
    width: 390,
    height: 844,
    mobile: true,
};

/// The full viewport table, in matrix-generation order.
#[must_use]
pub const fn all() -> &'static [Viewport] {
    &[DESKTOP, MOBILE]
}
