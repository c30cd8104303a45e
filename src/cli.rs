use clap::{Parser, Subcommand};

use crate::api::{ModelResult, Nilai, NilaiModel};

#[derive(Parser, Debug)]
#[command(name = "nilai-store", version, about = "Manage grades stored in SQLite")]
pub struct Cli {
    /// database url, overrides DATABASE_URL
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// log generated SQL
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// list grades as JSON
    List {
        /// student id
        #[arg(long)]
        mahasiswa: Option<i64>,
        /// only return grades of --mahasiswa
        #[arg(long, requires = "mahasiswa")]
        strict: bool,
    },
    /// show one grade
    Show { id: i64 },
    /// insert a grade
    Add {
        mahasiswa_id: i64,
        mata_kuliah: String,
        #[arg(allow_negative_numbers = true)]
        semester: i32,
        #[arg(allow_negative_numbers = true)]
        nilai: f64,
    },
    /// overwrite an existing grade
    Update {
        id: i64,
        mahasiswa_id: i64,
        mata_kuliah: String,
        #[arg(allow_negative_numbers = true)]
        semester: i32,
        #[arg(allow_negative_numbers = true)]
        nilai: f64,
    },
    /// delete a grade
    Delete { id: i64 },
}

/// what a command printed and whether it succeeded
#[derive(Debug, PartialEq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn new(output: String, success: bool) -> Self {
        Self { output, success }
    }
}

pub async fn execute(command: Command, model: &NilaiModel) -> ModelResult<Outcome> {
    match command {
        Command::List { mahasiswa, strict } => {
            let grades = match mahasiswa {
                Some(id) if strict => model.find_by_mahasiswa_id_filtered(id).await?,
                Some(id) => model.find_by_mahasiswa_id(id).await?,
                None => model.find_all().await?,
            };
            Ok(Outcome::new(to_json(&grades)?, true))
        }
        Command::Show { id } => match model.find_by_id(id).await? {
            Some(nilai) => Ok(Outcome::new(to_json(&nilai)?, true)),
            None => Ok(Outcome::new(format!("nilai {} not found", id), false)),
        },
        Command::Add {
            mahasiswa_id,
            mata_kuliah,
            semester,
            nilai,
        } => {
            let mut nilai = Nilai::new(mahasiswa_id, mata_kuliah, semester, nilai);
            let saved = model.create_nilai(&mut nilai).await;
            write_outcome(saved, &nilai, "insert")
        }
        Command::Update {
            id,
            mahasiswa_id,
            mata_kuliah,
            semester,
            nilai,
        } => {
            let mut nilai = Nilai::with_id(id, mahasiswa_id, mata_kuliah, semester, nilai);
            let saved = model.update_nilai(&mut nilai).await;
            write_outcome(saved, &nilai, "update")
        }
        Command::Delete { id } => {
            let deleted = model.delete_nilai(id).await;
            let output = if deleted {
                format!("deleted nilai {}", id)
            } else {
                format!("nilai {} not deleted", id)
            };
            Ok(Outcome::new(output, deleted))
        }
    }
}

fn write_outcome(saved: bool, nilai: &Nilai, verb: &str) -> ModelResult<Outcome> {
    if saved {
        Ok(Outcome::new(to_json(nilai)?, true))
    } else {
        Ok(Outcome::new(format!("failed to {} nilai", verb), false))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ModelResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
