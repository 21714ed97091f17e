//! Transform components.
//!
//! Component ids 1000-1099 are reserved for this crate.

use reflex_foundation::component;

macro_rules! vec3_component {
    ($(#[$meta:meta])* $name:ident, $id:expr, $default:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq)]
        pub struct $name {
            /// X axis.
            pub x: f32,
            /// Y axis.
            pub y: f32,
            /// Z axis.
            pub z: f32,
        }

        impl $name {
            /// Creates a value from its three axes.
            #[must_use]
            pub const fn new(x: f32, y: f32, z: f32) -> Self {
                Self { x, y, z }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default, $default, $default)
            }
        }

        component!($name, $id);
    };
}

vec3_component!(
    /// Location of an entity. Defaults to the origin.
    Position,
    1000,
    0.0
);

vec3_component!(
    /// Euler rotation of an entity, in radians. Defaults to zero.
    Rotation,
    1001,
    0.0
);

vec3_component!(
    /// Per-axis scale of an entity. Defaults to one.
    Scale,
    1002,
    1.0
);

vec3_component!(
    /// Rotation added to an entity's [`Rotation`] every tick.
    RotationSpeed,
    1003,
    0.0
);

impl Rotation {
    /// Adds a per-axis rotation speed.
    pub fn advance(&mut self, speed: RotationSpeed) {
        self.x += speed.x;
        self.y += speed.y;
        self.z += speed.z;
    }
}
