use schemars::JsonSchema;
use std::fmt::Debug;

use serde::Serialize;
use utility::id::{HasId, Id};

pub mod location;
pub mod tour;
pub mod waypoint;

pub trait ExampleData {
    fn example_data() -> Self;
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

impl<V> ExampleData for WithId<V>
where
    V: HasId<IdType = i64> + ExampleData,
{
    fn example_data() -> Self {
        Self::new(Id::new(1), V::example_data())
    }
}
