pub mod place;
pub mod point;
pub mod reading;
pub mod session;

pub use place::{describe_place, display_place_name, GeocodedAddress, Place};
pub use point::TrackingPoint;
pub use reading::RawPositionReading;
pub use session::JourneySession;
