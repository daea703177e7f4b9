use crate::database::{Database, ServerListing};
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 5] = ["model", "ram", "hdd", "location", "price"];

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    /// (row_number, error_message); row 1 is the header
    pub errors: Vec<(usize, String)>,
}

/// Column positions resolved from the header row
struct Columns {
    id: Option<usize>,
    fields: [usize; 5],
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let mut fields = [0; 5];
        for (slot, name) in fields.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = match position(name) {
                Some(idx) => idx,
                None => bail!("Missing required CSV column: {}", name),
            };
        }

        Ok(Self {
            id: position("id"),
            fields,
        })
    }

    fn listing(&self, record: &csv::StringRecord, now_ns: i64) -> Result<ServerListing, String> {
        let get = |idx: usize| -> Result<String, String> {
            record
                .get(idx)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| format!("Missing value in column {}", idx + 1))
        };

        let id = match self.id.and_then(|idx| record.get(idx)).map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let [model, ram, hdd, location, price] = self.fields;

        Ok(ServerListing {
            id,
            model: get(model)?,
            ram: get(ram)?,
            hdd: get(hdd)?,
            location: get(location)?,
            price: get(price)?,
            created_at_ns: now_ns,
            updated_at_ns: now_ns,
        })
    }
}

/// Parses listings from CSV with a header row. Bad rows are reported, not fatal;
/// a header without the required columns is.
pub fn parse_listings_csv<R: Read>(
    reader: R,
    now_ns: i64,
) -> Result<(Vec<(usize, ServerListing)>, Vec<(usize, String)>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::from_headers(reader.headers().context("Failed to read CSV header")?)?;

    let mut listings = Vec::new();
    let mut errors = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;
        match result {
            Ok(record) => match columns.listing(&record, now_ns) {
                Ok(listing) => listings.push((row_number, listing)),
                Err(e) => errors.push((row_number, e)),
            },
            Err(e) => errors.push((row_number, format!("CSV parse error: {}", e))),
        }
    }

    Ok((listings, errors))
}

fn now_ns() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
}

/// Reads a CSV file into memory, e.g. to serve it without a database
pub fn load_snapshot(path: &Path) -> Result<Vec<ServerListing>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let (listings, errors) = parse_listings_csv(file, now_ns())?;
    for (row, message) in &errors {
        tracing::warn!("Skipping row {} of {}: {}", row, path.display(), message);
    }
    Ok(listings.into_iter().map(|(_, listing)| listing).collect())
}

impl Database {
    /// Import listings from a CSV file, upserting by id
    pub async fn import_listings_csv(&self, path: &Path) -> Result<ImportReport> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let (listings, parse_errors) = parse_listings_csv(file, now_ns())?;

        let mut report = ImportReport {
            errors: parse_errors,
            ..Default::default()
        };
        for (row_number, listing) in &listings {
            match self.upsert_listing(listing).await {
                Ok(()) => report.imported += 1,
                Err(e) => report.errors.push((*row_number, e.to_string())),
            }
        }
        report.errors.sort_by_key(|(row, _)| *row);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_helpers::setup_test_db;
    use crate::inventory::QueryExecutor;
    use std::io::Write;

    const CSV: &str = "\
Model,RAM,HDD,Location,Price
Dell R210Intel Xeon X3440,16GBDDR3,2x2TBSATA2,AmsterdamAMS-01,€49.99
HP DL180G62x Intel Xeon E5620,32GBDDR3,8x2TBSATA2,AmsterdamAMS-01,€119.00
";

    #[test]
    fn test_parse_assigns_ids_and_timestamps() {
        let (listings, errors) = parse_listings_csv(CSV.as_bytes(), 42).unwrap();
        assert!(errors.is_empty());
        let listings: Vec<ServerListing> = listings.into_iter().map(|(_, l)| l).collect();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].ram, "16GBDDR3");
        assert_eq!(listings[1].price, "€119.00");
        assert_ne!(listings[0].id, listings[1].id);
        assert!(listings
            .iter()
            .all(|l| l.created_at_ns == 42 && l.updated_at_ns == 42));
    }

    #[test]
    fn test_parse_uses_id_column_and_any_column_order() {
        let csv = "price,location,hdd,ram,model,id\n$10,FRA-10,1x1TB,8GB,IBM,srv-9\n";
        let (listings, errors) = parse_listings_csv(csv.as_bytes(), 0).unwrap();
        assert!(errors.is_empty());
        let (row, listing) = &listings[0];
        assert_eq!(*row, 2);
        assert_eq!(listing.id, "srv-9");
        assert_eq!(listing.model, "IBM");
        assert_eq!(listing.hdd, "1x1TB");
    }

    #[test]
    fn test_parse_reports_short_rows() {
        let csv = "model,ram,hdd,location,price\nDell,16GB,1TB,AMS,$1\nBroken,8GB\n";
        let (listings, errors) = parse_listings_csv(csv.as_bytes(), 0).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 3);
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        let err = parse_listings_csv("model,ram\nDell,16GB\n".as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains("hdd"));
    }

    #[tokio::test]
    async fn test_import_file_into_database() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let db = setup_test_db().await;
        let report = db.import_listings_csv(file.path()).await.unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.errors.is_empty());

        let listings = db.list_all(None).await.unwrap();
        assert_eq!(listings.len(), 2);
    }

    #[test]
    fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let listings = load_snapshot(file.path()).unwrap();
        assert_eq!(listings.len(), 2);
        assert!(load_snapshot(Path::new("/nonexistent/servers.csv")).is_err());
    }
}
