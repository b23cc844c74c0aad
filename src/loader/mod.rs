//! Bulk Loader Module
//!
//! Seeds the catalog from a tabular export. Each CSV row becomes a `Book`:
//! column 12 is the title, column 1 the author and column 16 the price; the
//! publish date and ebook flag are synthesised. Output is either a list of
//! books or a ready-to-send `_bulk` payload.

use anyhow::{Context, Result};
use rand::Rng;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::store::elastic::bulk_body;
use crate::store::{Book, DocumentStore, INDEX_NAME};

const AUTHOR_COLUMN: usize = 1;
const TITLE_COLUMN: usize = 12;
const PRICE_COLUMN: usize = 16;
const MIN_FIELDS: usize = 17;

/// Rows imported per file after the header.
pub const MAX_ROWS: usize = 499;

/// Maps one CSV record to a `Book`. Records shorter than 17 fields yield `None`.
pub fn book_from_record<R: Rng>(record: &csv::StringRecord, rng: &mut R) -> Option<Book> {
    if record.len() < MIN_FIELDS {
        return None;
    }

    Some(Book {
        title: record.get(TITLE_COLUMN)?.trim().to_string(),
        author_name: record.get(AUTHOR_COLUMN)?.trim().to_string(),
        price: parse_price(record.get(PRICE_COLUMN)?),
        publish_date: random_publish_date(rng),
        ebook_available: rng.gen_bool(0.5),
    })
}

/// Reads up to `max_rows` books from CSV data with a header row.
pub fn read_books<R: Read>(input: R, max_rows: usize) -> Result<Vec<Book>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let mut rng = rand::thread_rng();
    let mut books = Vec::new();

    for (line, record) in reader.records().enumerate() {
        if books.len() >= max_rows {
            break;
        }
        let record = record.with_context(|| format!("malformed CSV row {}", line + 2))?;
        match book_from_record(&record, &mut rng) {
            Some(book) => books.push(book),
            None => tracing::warn!(
                "Skipping CSV row {}: {} fields, need {}",
                line + 2,
                record.len(),
                MIN_FIELDS
            ),
        }
    }

    Ok(books)
}

pub fn read_books_from_path(path: impl AsRef<Path>, max_rows: usize) -> Result<Vec<Book>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open seed file {}", path.display()))?;
    read_books(file, max_rows)
}

/// Renders books as a `_bulk` NDJSON payload for the `books` index.
pub fn to_bulk_payload(books: &[Book]) -> Result<String> {
    let documents = to_documents(books)?;
    Ok(bulk_body(INDEX_NAME, &documents)?)
}

/// Loads a CSV file into `store`; returns how many documents were accepted.
pub async fn seed_store(store: &dyn DocumentStore, path: impl AsRef<Path>) -> Result<usize> {
    let books = read_books_from_path(path, MAX_ROWS)?;
    let read = books.len();
    let accepted = store.put_many(to_documents(&books)?).await?;
    tracing::info!("Seeded {} of {} books", accepted, read);
    Ok(accepted)
}

fn to_documents(books: &[Book]) -> Result<Vec<(Option<String>, Value)>> {
    books
        .iter()
        .map(|book| Ok((None, serde_json::to_value(book)?)))
        .collect()
}

fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0)
}

/// `YYYY-0M-03THH:36:50Z` with year 1900-1999, month 1-9 and hour 10-19.
fn random_publish_date<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}-0{}-03T{}:36:50Z",
        rng.gen_range(1900..2000),
        rng.gen_range(1..10),
        rng.gen_range(10..20)
    )
}
