use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use super::db::base::{BaseModel, SqlValue, TableModel};
use super::err::ModelResult;

/// one grade of one student in one course
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Nilai {
    /// 0 until the row is stored
    pub id: i64,
    pub mahasiswa_id: i64,
    pub mata_kuliah: String,
    pub semester: i32,
    pub nilai: f64,
}

impl Nilai {
    /// a record that has not been stored yet
    pub fn new(mahasiswa_id: i64, mata_kuliah: impl Into<String>, semester: i32, nilai: f64) -> Self {
        Self::with_id(0, mahasiswa_id, mata_kuliah, semester, nilai)
    }

    pub fn with_id(
        id: i64,
        mahasiswa_id: i64,
        mata_kuliah: impl Into<String>,
        semester: i32,
        nilai: f64,
    ) -> Self {
        Self {
            id,
            mahasiswa_id,
            mata_kuliah: mata_kuliah.into(),
            semester,
            nilai,
        }
    }
}

/// row mapping for the `nilai` table
pub struct NilaiTable;

impl TableModel for NilaiTable {
    type Entity = Nilai;

    const TABLE: &'static str = "nilai";
    const COLUMNS: &'static [&'static str] = &["id", "mahasiswa_id", "mata_kuliah", "semester", "nilai"];

    fn is_new_record(nilai: &Nilai) -> bool {
        nilai.id == 0
    }

    fn map_row(row: &SqliteRow) -> Result<Nilai, sqlx::Error> {
        Ok(Nilai {
            id: row.try_get("id")?,
            mahasiswa_id: row.try_get("mahasiswa_id")?,
            mata_kuliah: row.try_get("mata_kuliah")?,
            semester: row.try_get("semester")?,
            nilai: get_real(row, "nilai")?,
        })
    }

    fn get_values(nilai: &Nilai, include_id: bool) -> Vec<SqlValue> {
        let mut values = Vec::with_capacity(Self::COLUMNS.len());
        if include_id {
            values.push(nilai.id.into());
        }
        values.push(nilai.mahasiswa_id.into());
        values.push(nilai.mata_kuliah.as_str().into());
        values.push(nilai.semester.into());
        values.push(nilai.nilai.into());
        values
    }

    fn assign_id(nilai: &mut Nilai, id: i64) {
        nilai.id = id;
    }
}

/// read a REAL column, widening an INTEGER value
fn get_real(row: &SqliteRow, column: &str) -> Result<f64, sqlx::Error> {
    match row.try_get::<f64, _>(column) {
        Err(sqlx::Error::ColumnDecode { .. }) => row.try_get::<i64, _>(column).map(|v| v as f64),
        other => other,
    }
}

/// CRUD entry point for grades
#[derive(Clone)]
pub struct NilaiModel {
    base: BaseModel<NilaiTable>,
}

impl NilaiModel {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            base: BaseModel::new(pool),
        }
    }

    pub async fn find_all(&self) -> ModelResult<Vec<Nilai>> {
        self.base.find().await
    }

    pub async fn find_by_id(&self, id: i64) -> ModelResult<Option<Nilai>> {
        self.base.find_by_id(id).await
    }

    /// Known defect kept for compatibility: `mahasiswa_id` is ignored and
    /// every grade in the table is returned. Use
    /// [`NilaiModel::find_by_mahasiswa_id_filtered`] for the real lookup.
    pub async fn find_by_mahasiswa_id(&self, _mahasiswa_id: i64) -> ModelResult<Vec<Nilai>> {
        self.base.find().await
    }

    /// grades belonging to `mahasiswa_id` only
    pub async fn find_by_mahasiswa_id_filtered(&self, mahasiswa_id: i64) -> ModelResult<Vec<Nilai>> {
        self.base
            .find_where("mahasiswa_id", SqlValue::Integer(mahasiswa_id))
            .await
    }

    /// insert `nilai`, its id is filled in on success
    pub async fn create_nilai(&self, nilai: &mut Nilai) -> bool {
        self.base.save(nilai).await
    }

    /// Same save path as `create_nilai`: a record with id 0 is inserted,
    /// anything else updates the row with that id.
    pub async fn update_nilai(&self, nilai: &mut Nilai) -> bool {
        self.base.save(nilai).await
    }

    pub async fn delete_nilai(&self, id: i64) -> bool {
        self.base.delete(id).await
    }
}
