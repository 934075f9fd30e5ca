use model::WithId;
use utility::id::{HasId, Id};

pub mod tour;
pub mod waypoint;

/// A row of a table whose primary key is an sqlite integer.
pub trait DatabaseRow {
    type Model: HasId<IdType = i64>;

    fn get_id(&self) -> Id<Self::Model>;
    fn to_model(self) -> Self::Model;
}

pub fn with_ids<R: DatabaseRow>(rows: Vec<R>) -> Vec<WithId<R::Model>> {
    rows.into_iter().map(with_id).collect::<Vec<_>>()
}

pub fn with_id<R: DatabaseRow>(row: R) -> WithId<R::Model> {
    WithId::new(row.get_id(), row.to_model())
}
