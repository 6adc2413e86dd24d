pub mod adapter;
#[cfg(feature = "swisseph")]
pub mod swiss;
pub mod types;

pub use adapter::{validate_positions, EphemerisAdapter, EphemerisError, TableEphemeris};
#[cfg(feature = "swisseph")]
pub use swiss::SwissEphemerisAdapter;
pub use types::{GeoPosition, RawPositions};
