use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TryIntoModel, sea_query::Expr,
};
use tracing::debug;

use crate::{entities::movie, error::AppResult, models::NewMovie};

/// Persistence handle for the `movie` table, shared through `AppState`.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<movie::Model>> {
        let movie = movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .order_by_asc(movie::Column::Id)
            .one(&self.db)
            .await?;
        Ok(movie)
    }

    pub async fn insert(&self, new: NewMovie) -> AppResult<movie::Model> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(new.title),
            description: Set(new.description),
            release_year: Set(new.release_year),
            duration_minutes: Set(new.duration_minutes),
            rating: Set(new.rating),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn replace(&self, current: movie::Model, new: NewMovie) -> AppResult<movie::Model> {
        let mut model: movie::ActiveModel = current.into();
        model.title = Set(new.title);
        model.description = Set(new.description);
        model.release_year = Set(new.release_year);
        model.duration_minutes = Set(new.duration_minutes);
        model.rating = Set(new.rating);
        self.save(model).await
    }

    /// Writes the changed columns of `model`; an untouched model is returned as is.
    pub async fn save(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        if !model.is_changed() {
            return Ok(model.try_into_model()?);
        }
        Ok(model.update(&self.db).await?)
    }

    /// Returns `false` when no row had this id.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Shifts the rating in a single UPDATE so concurrent votes are not lost.
    ///
    /// A rating already at the `i64` edge in the direction of `delta` is left
    /// as is; SQLite would otherwise turn the overflow into a REAL.
    pub async fn adjust_rating(&self, id: i32, delta: i64) -> AppResult<Option<movie::Model>> {
        let in_range = if delta >= 0 {
            movie::Column::Rating.lte(i64::MAX - delta)
        } else {
            movie::Column::Rating.gte(i64::MIN - delta)
        };

        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Rating, Expr::col(movie::Column::Rating).add(delta))
            .filter(movie::Column::Id.eq(id))
            .filter(in_range)
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            debug!(id, delta, "rating not shifted");
        }
        self.find(id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sea_orm::ConnectOptions;

    use super::*;
    use crate::db;

    pub(crate) async fn memory_store() -> MovieStore {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        MovieStore::new(db::connect_and_migrate(options).await.unwrap())
    }

    fn new_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            description: "No description provided".to_string(),
            release_year: 2000,
            duration_minutes: 90,
            rating: 0,
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_finds_by_title() {
        let store = memory_store().await;
        let first = store.insert(new_movie("Alien")).await.unwrap();
        let second = store.insert(new_movie("Aliens")).await.unwrap();
        assert_ne!(first.id, second.id);

        let found = store.find_by_title("Aliens").await.unwrap().unwrap();
        assert_eq!(found, second);
        assert!(store.find_by_title("Alien 3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() {
        let store = memory_store().await;
        store.insert(new_movie("Alien")).await.unwrap();
        let err = store.insert(new_movie("Alien")).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn rating_moves_by_delta_without_bounds() {
        let store = memory_store().await;
        let movie = store.insert(new_movie("Alien")).await.unwrap();

        let liked = store.adjust_rating(movie.id, 1).await.unwrap().unwrap();
        assert_eq!(liked.rating, 1);
        store.adjust_rating(movie.id, -1).await.unwrap();
        let below_zero = store.adjust_rating(movie.id, -1).await.unwrap().unwrap();
        assert_eq!(below_zero.rating, -1);

        assert!(store.adjust_rating(movie.id + 100, 1).await.unwrap().is_none());
        assert!(store.adjust_rating(movie.id + 100, -1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rating_stays_put_at_the_i64_edges() {
        let store = memory_store().await;
        let top = store.insert(NewMovie { rating: i64::MAX, ..new_movie("Top") }).await.unwrap();
        let bottom =
            store.insert(NewMovie { rating: i64::MIN, ..new_movie("Bottom") }).await.unwrap();

        let liked = store.adjust_rating(top.id, 1).await.unwrap().unwrap();
        assert_eq!(liked.rating, i64::MAX);
        let disliked = store.adjust_rating(bottom.id, -1).await.unwrap().unwrap();
        assert_eq!(disliked.rating, i64::MIN);

        let lowered = store.adjust_rating(top.id, -1).await.unwrap().unwrap();
        assert_eq!(lowered.rating, i64::MAX - 1);
        let raised = store.adjust_rating(bottom.id, 1).await.unwrap().unwrap();
        assert_eq!(raised.rating, i64::MIN + 1);
    }

    #[tokio::test]
    async fn replace_and_delete() {
        let store = memory_store().await;
        let movie = store.insert(new_movie("Alien")).await.unwrap();

        let replaced = store
            .replace(movie.clone(), NewMovie { rating: 9, ..new_movie("Alien: Director's Cut") })
            .await
            .unwrap();
        assert_eq!(replaced.id, movie.id);
        assert_eq!(replaced.title, "Alien: Director's Cut");
        assert_eq!(store.find(movie.id).await.unwrap(), Some(replaced));

        assert!(store.delete(movie.id).await.unwrap());
        assert!(!store.delete(movie.id).await.unwrap());
        assert!(store.find(movie.id).await.unwrap().is_none());
    }
}
