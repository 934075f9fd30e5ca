use schemars::JsonSchema;
use serde::Serialize;
use utility::id::{HasId, Id};

use crate::{location::Coordinates, tour::Tour, ExampleData};

/// Stored for waypoints whose name was never set.
pub const UNNAMED_WAYPOINT: &str = "Unnamed Waypoint";

/// Default name of waypoints created from an address.
pub const HOME_WAYPOINT: &str = "Home";

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Waypoint {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub audio_filename: Option<String>,
    pub tour_id: Id<Tour>,
}

impl Waypoint {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

impl HasId for Waypoint {
    type IdType = i64;
}

impl ExampleData for Waypoint {
    fn example_data() -> Self {
        Self {
            name: "Kiellinie".to_owned(),
            latitude: Some(54.3311),
            longitude: Some(10.1527),
            audio_filename: Some("kiellinie.mp3".to_owned()),
            tour_id: Id::new(1),
        }
    }
}

/// A validated waypoint which is ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWaypoint {
    pub name: String,
    pub coordinates: Coordinates,
    pub audio_filename: String,
}
