use async_trait::async_trait;
use model::{
    tour::{NewTour, Tour},
    WithId,
};
use sqlx::prelude::FromRow;
use tours::database::{Result, TourRepo};
use utility::id::Id;

use crate::queries::tour::{exists, get, get_page, insert};
use crate::SqliteDatabaseAutocommit;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct TourRow {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl DatabaseRow for TourRow {
    type Model = Tour;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    /// Waypoints live in their own table and have to be attached afterwards.
    fn to_model(self) -> Self::Model {
        Tour {
            name: self.name,
            description: self.description,
            waypoints: vec![],
        }
    }
}

#[async_trait]
impl TourRepo for SqliteDatabaseAutocommit {
    async fn get_tour(&mut self, id: Id<Tour>) -> Result<WithId<Tour>> {
        get(&self.pool, id).await
    }

    async fn get_tours(&mut self, skip: u32, limit: u32) -> Result<Vec<WithId<Tour>>> {
        get_page(&self.pool, skip, limit).await
    }

    async fn insert_tour(&mut self, tour: NewTour) -> Result<WithId<Tour>> {
        insert(&self.pool, tour).await
    }

    async fn tour_exists(&mut self, id: Id<Tour>) -> Result<bool> {
        exists(&self.pool, id).await
    }
}
