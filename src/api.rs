pub mod db;
pub mod err;
pub mod nilai;

pub use db::base::{BaseModel, SqlValue, TableModel};
pub use db::{init_db, init_db_at};
pub use err::{ModelError, ModelResult};
pub use nilai::{Nilai, NilaiModel, NilaiTable};
