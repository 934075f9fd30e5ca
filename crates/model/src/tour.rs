use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{waypoint::Waypoint, ExampleData, WithId};

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Tour {
    pub name: String,
    pub description: String,
    /// Ordered by insertion.
    pub waypoints: Vec<WithId<Waypoint>>,
}

impl HasId for Tour {
    type IdType = i64;
}

impl ExampleData for Tour {
    fn example_data() -> Self {
        Self {
            name: "Kiel Harbour Walk".to_owned(),
            description: "A short stroll along the Kiellinie.".to_owned(),
            waypoints: vec![WithId::new(Id::new(1), Waypoint::example_data())],
        }
    }
}

/// Payload for creating a tour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewTour {
    pub name: String,
    pub description: String,
}

impl NewTour {
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn into_tour(self) -> Tour {
        Tour {
            name: self.name,
            description: self.description,
            waypoints: vec![],
        }
    }
}

impl ExampleData for NewTour {
    fn example_data() -> Self {
        Self::new("Kiel Harbour Walk", "A short stroll along the Kiellinie.")
    }
}
