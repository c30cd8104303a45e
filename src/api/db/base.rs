use std::marker::PhantomData;

use futures::TryStreamExt;
use log::{debug, error, info};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
    Pool, Sqlite,
};

use crate::api::err::{ModelError, ModelResult};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// a single column value handed to an insert, update or filter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    fn bind_to(self, query: SqliteQuery<'_>) -> SqliteQuery<'_> {
        match self {
            SqlValue::Integer(v) => query.bind(v),
            SqlValue::Real(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// Binds one entity type to one table.
///
/// `COLUMNS` lists every column in the order `get_values` emits them,
/// the first one being the integer primary key.
pub trait TableModel {
    type Entity: Send + Unpin;

    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// whether `save` should insert rather than update
    fn is_new_record(entity: &Self::Entity) -> bool;

    /// decode one result row, columns are read by name
    fn map_row(row: &SqliteRow) -> Result<Self::Entity, sqlx::Error>;

    /// values in `COLUMNS` order, the primary key only when `include_id`
    fn get_values(entity: &Self::Entity, include_id: bool) -> Vec<SqlValue>;

    /// store the key generated by an insert
    fn assign_id(entity: &mut Self::Entity, id: i64);

    fn id_column() -> &'static str {
        Self::COLUMNS[0]
    }
}

/// generic find/save/delete over the table described by `M`
pub struct BaseModel<M: TableModel> {
    pool: Pool<Sqlite>,
    _table: PhantomData<M>,
}

impl<M: TableModel> Clone for BaseModel<M> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<M: TableModel> BaseModel<M> {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    /// every row of the table ordered by primary key
    pub async fn find(&self) -> ModelResult<Vec<M::Entity>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            M::COLUMNS.join(", "),
            M::TABLE,
            M::id_column()
        );
        debug!("{}", sql);
        self.fetch_entities(sqlx::query(&sql)).await
    }

    /// rows whose `column` equals `value`
    pub async fn find_where(&self, column: &str, value: SqlValue) -> ModelResult<Vec<M::Entity>> {
        // column names are spliced into the statement, only accept known ones
        if !M::COLUMNS.iter().any(|known| *known == column) {
            return Err(ModelError::UnknownColumn(column.to_string()));
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY {}",
            M::COLUMNS.join(", "),
            M::TABLE,
            column,
            M::id_column()
        );
        debug!("{} [{:?}]", sql, value);
        self.fetch_entities(value.bind_to(sqlx::query(&sql))).await
    }

    pub async fn find_by_id(&self, id: i64) -> ModelResult<Option<M::Entity>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            M::COLUMNS.join(", "),
            M::TABLE,
            M::id_column()
        );
        debug!("{} [{}]", sql, id);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(M::map_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record or update an existing one.
    ///
    /// New records get their generated id assigned. Returns whether a row was
    /// written; database failures are logged and reported as `false`.
    pub async fn save(&self, entity: &mut M::Entity) -> bool {
        match self.try_save(entity).await {
            Ok(saved) => saved,
            Err(e) => {
                error!("failed to save into {}: {}", M::TABLE, e);
                false
            }
        }
    }

    /// Delete by primary key. Returns whether a row was removed; database
    /// failures are logged and reported as `false`.
    pub async fn delete(&self, id: i64) -> bool {
        let sql = format!("DELETE FROM {} WHERE {} = ?", M::TABLE, M::id_column());
        debug!("{} [{}]", sql, id);
        match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(result) => {
                let deleted = result.rows_affected() > 0;
                if deleted {
                    info!("deleted {} from {}", id, M::TABLE);
                }
                deleted
            }
            Err(e) => {
                error!("failed to delete {} from {}: {}", id, M::TABLE, e);
                false
            }
        }
    }

    async fn try_save(&self, entity: &mut M::Entity) -> ModelResult<bool> {
        let columns = &M::COLUMNS[1..];
        if M::is_new_record(entity) {
            let values = M::get_values(entity, false);
            debug_assert_eq!(values.len(), columns.len());
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                M::TABLE,
                columns.join(", "),
                placeholders(columns.len())
            );
            debug!("{} {:?}", sql, values);
            let result = bind_values(sqlx::query(&sql), values)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Ok(false);
            }
            let id = result.last_insert_rowid();
            M::assign_id(entity, id);
            info!("inserted {} into {}", id, M::TABLE);
            Ok(true)
        } else {
            let mut values = M::get_values(entity, true);
            debug_assert_eq!(values.len(), M::COLUMNS.len());
            // the key goes last, after the SET list
            let id = values.remove(0);
            values.push(id);
            let assignments = columns
                .iter()
                .map(|column| format!("{} = ?", column))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                M::TABLE,
                assignments,
                M::id_column()
            );
            debug!("{} {:?}", sql, values);
            let result = bind_values(sqlx::query(&sql), values)
                .execute(&self.pool)
                .await?;
            let updated = result.rows_affected() > 0;
            if updated {
                info!("updated row in {}", M::TABLE);
            }
            Ok(updated)
        }
    }

    async fn fetch_entities(&self, query: SqliteQuery<'_>) -> ModelResult<Vec<M::Entity>> {
        let mut rows = query.fetch(&self.pool);
        let mut entities = Vec::new();
        while let Some(row) = rows.try_next().await? {
            entities.push(M::map_row(&row)?);
        }
        Ok(entities)
    }
}

fn bind_values(query: SqliteQuery<'_>, values: Vec<SqlValue>) -> SqliteQuery<'_> {
    values
        .into_iter()
        .fold(query, |query, value| value.bind_to(query))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::db::tests::build_pool;
    use crate::api::nilai::{Nilai, NilaiTable};

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(4), "?, ?, ?, ?");
    }

    #[test]
    fn test_sql_value_from() {
        assert_eq!(SqlValue::from(3_i32), SqlValue::Integer(3));
        assert_eq!(SqlValue::from(88.5), SqlValue::Real(88.5));
        assert_eq!(SqlValue::from("CS101"), SqlValue::Text("CS101".to_string()));
    }

    #[tokio::test]
    async fn test_find_where_rejects_unknown_column() {
        let (_dir, pool) = build_pool().await;
        let base = BaseModel::<NilaiTable>::new(pool);

        let result = base.find_where("1 = 1 OR id", SqlValue::Integer(1)).await;
        assert!(matches!(result, Err(ModelError::UnknownColumn(_))));
    }

    #[tokio::test]
    async fn test_save_insert_then_update() {
        let (_dir, pool) = build_pool().await;
        let base = BaseModel::<NilaiTable>::new(pool);

        let mut nilai = Nilai::new(1, "Basis Data", 2, 75.0);
        assert!(base.save(&mut nilai).await);
        assert!(nilai.id > 0);

        nilai.nilai = 80.25;
        assert!(base.save(&mut nilai).await);

        let stored = base.find_by_id(nilai.id).await.unwrap().unwrap();
        assert_eq!(stored, nilai);
        assert_eq!(base.find().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_reports_database_failure_as_false() {
        let (_dir, pool) = build_pool().await;
        let base = BaseModel::<NilaiTable>::new(pool.clone());
        pool.close().await;

        let mut nilai = Nilai::new(1, "Basis Data", 2, 75.0);
        assert!(!base.save(&mut nilai).await);
        assert_eq!(nilai.id, 0);
        assert!(!base.delete(1).await);
    }
}
