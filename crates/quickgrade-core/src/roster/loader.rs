use super::{ColumnRoles, NameSource, Roster, RosterRow, Table, resolve_columns};
use crate::{Error, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const EXPORT_FIRST_NAME: &str = "First name";
const EXPORT_LAST_NAME: &str = "Last name";
const EXPORT_EMAIL: &str = "Email address";
const EXPORT_GRADE: &str = "Grade";

/// Grade values a gradebook export uses for "nothing to grade"
const EXPORT_SKIPPED_GRADES: [&str; 3] = ["Excused", "nan", ""];

/// Layout of the input table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Gradebook export with split first/last name and "Email address"
    MoodleExport,
    /// Any table with email/name/grade/feedback-like headers
    Generic,
}

impl Schema {
    pub fn detect(table: &Table) -> Self {
        if table.has_columns(&[EXPORT_LAST_NAME, EXPORT_FIRST_NAME, EXPORT_EMAIL]) {
            Schema::MoodleExport
        } else {
            Schema::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Schema::MoodleExport => "gradebook export",
            Schema::Generic => "generic",
        }
    }
}

pub struct RosterLoader;

impl RosterLoader {
    /// Read a roster from a CSV/TSV file or a spreadsheet workbook
    pub fn from_file(path: &Path) -> Result<Roster> {
        tracing::debug!("Reading roster from: {}", path.display());

        let table = Self::read_table(path)?;
        let roster = Self::from_table(table)?;

        tracing::info!(
            "Loaded {} roster rows ({} schema)",
            roster.len(),
            roster.schema.as_str()
        );

        Ok(roster)
    }

    /// Read the raw table, choosing the parser by file extension
    pub fn read_table(path: &Path) -> Result<Table> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_workbook(path),
            "tsv" => Self::read_delimited(BufReader::new(File::open(path)?), b'\t'),
            _ => Self::read_delimited(BufReader::new(File::open(path)?), b','),
        }
    }

    /// Parse delimited text; the first record is the header row
    pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<Option<String>> = (0..headers.len())
                .map(|idx| record.get(idx).and_then(non_empty))
                .collect();
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }

    fn read_workbook(path: &Path) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::EmptyInput(path.display().to_string()))??;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .map(|cell| render_cell(cell).unwrap_or_default())
                .collect(),
            None => return Err(Error::EmptyInput(path.display().to_string())),
        };

        let rows: Vec<Vec<Option<String>>> = rows
            .map(|row| {
                (0..headers.len())
                    .map(|idx| row.get(idx).and_then(render_cell))
                    .collect()
            })
            .collect();

        Ok(Table { headers, rows })
    }

    /// Turn a raw table into roster rows
    pub fn from_table(table: Table) -> Result<Roster> {
        let schema = Schema::detect(&table);
        let mut roles = resolve_columns(&table.headers)?;

        if schema == Schema::MoodleExport {
            roles.email = Some(EXPORT_EMAIL.to_string());
            roles.name = Some(NameSource::FirstLast {
                first: EXPORT_FIRST_NAME.to_string(),
                last: EXPORT_LAST_NAME.to_string(),
            });
            if table.column_index(EXPORT_GRADE).is_some() {
                roles.grade = EXPORT_GRADE.to_string();
            }
        }

        let extractor = RowExtractor::new(&table, &roles);
        let mut rows = Vec::new();

        for (idx, cells) in table.rows.iter().enumerate() {
            if cells.iter().all(Option::is_none) {
                continue;
            }

            let row = extractor.extract(cells);

            if schema == Schema::MoodleExport {
                let grade = extractor.grade(cells);
                let skipped = grade
                    .as_deref()
                    .is_none_or(|g| EXPORT_SKIPPED_GRADES.contains(&g));
                if row.email.is_none() || skipped {
                    tracing::debug!("Dropping export row {}: no email or no gradable value", idx + 2);
                    continue;
                }
            } else if row.grade.is_empty() {
                tracing::warn!("Row {} has no grade value", idx + 2);
            }

            rows.push(row);
        }

        Ok(Roster {
            schema,
            roles,
            rows,
        })
    }
}

/// Column positions for one resolved set of roles
struct RowExtractor {
    email: Option<usize>,
    name: Option<NameColumns>,
    grade: Option<usize>,
    feedback: Option<usize>,
}

enum NameColumns {
    Single(usize),
    FirstLast(usize, usize),
}

impl RowExtractor {
    fn new(table: &Table, roles: &ColumnRoles) -> Self {
        let name = match &roles.name {
            Some(NameSource::Column(column)) => table.column_index(column).map(NameColumns::Single),
            Some(NameSource::FirstLast { first, last }) => table
                .column_index(first)
                .zip(table.column_index(last))
                .map(|(f, l)| NameColumns::FirstLast(f, l)),
            None => None,
        };

        Self {
            email: roles.email.as_deref().and_then(|c| table.column_index(c)),
            name,
            grade: table.column_index(&roles.grade),
            feedback: roles.feedback.as_deref().and_then(|c| table.column_index(c)),
        }
    }

    fn cell(cells: &[Option<String>], idx: Option<usize>) -> Option<String> {
        idx.and_then(|i| cells.get(i).cloned().flatten())
    }

    fn grade(&self, cells: &[Option<String>]) -> Option<String> {
        Self::cell(cells, self.grade)
    }

    fn extract(&self, cells: &[Option<String>]) -> RosterRow {
        let name = match self.name {
            Some(NameColumns::Single(idx)) => Self::cell(cells, Some(idx)),
            Some(NameColumns::FirstLast(first, last)) => {
                let parts: Vec<String> = [first, last]
                    .into_iter()
                    .filter_map(|idx| Self::cell(cells, Some(idx)))
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            None => None,
        };

        let mut row = RosterRow::new(self.grade(cells).unwrap_or_default());
        if let Some(email) = Self::cell(cells, self.email) {
            row = row.with_email(email);
        }
        if let Some(name) = name {
            row = row.with_name(name);
        }
        if let Some(feedback) = Self::cell(cells, self.feedback) {
            row = row.with_feedback(feedback);
        }
        row
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render a workbook cell the way it reads in the sheet
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => non_empty(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        other => non_empty(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Requirement;
    use std::io::Write;

    fn load_csv(text: &str) -> Result<Roster> {
        let table = RosterLoader::read_delimited(text.as_bytes(), b',')?;
        RosterLoader::from_table(table)
    }

    #[test]
    fn test_generic_csv_loads_rows() {
        let roster = load_csv(
            "Email,Student Name,Grade,Feedback\n\
             A@X.com , Alice Smith,85,Well done\n\
             bob@x.com,Bob Jones,70,\n",
        )
        .unwrap();

        assert_eq!(roster.schema, Schema::Generic);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rows[0].email.as_deref(), Some("a@x.com"));
        assert_eq!(roster.rows[0].name.as_deref(), Some("Alice Smith"));
        assert_eq!(roster.rows[0].grade, "85");
        assert_eq!(roster.rows[0].feedback.as_deref(), Some("Well done"));
        assert!(roster.rows[1].feedback.is_none());
    }

    #[test]
    fn test_generic_csv_drops_fully_empty_rows() {
        let roster = load_csv("Name,Score\nAlice,90\n,\n\nBob,80\n").unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rows[1].name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_export_schema_combines_names_and_filters_rows() {
        let roster = load_csv(
            "First name,Last name,ID number,Email address,Grade,Feedback comments\n\
             Alice,Smith,1,alice@x.com,85,Nice\n\
             Bob,Jones,2,,90,\n\
             Carol,White,3,carol@x.com,Excused,\n\
             Dan,Brown,4,dan@x.com,,\n\
             Eve,Black,5,eve@x.com,nan,\n\
             Frank,Green,6,FRANK@x.com,72.5,\n",
        )
        .unwrap();

        assert_eq!(roster.schema, Schema::MoodleExport);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rows[0].name.as_deref(), Some("Alice Smith"));
        assert_eq!(roster.rows[0].feedback.as_deref(), Some("Nice"));
        assert_eq!(roster.rows[1].email.as_deref(), Some("frank@x.com"));
        assert_eq!(roster.rows[1].grade, "72.5");
        assert_eq!(
            roster.roles.name,
            Some(NameSource::FirstLast {
                first: "First name".to_string(),
                last: "Last name".to_string()
            })
        );
    }

    #[test]
    fn test_export_schema_reads_exact_grade_column() {
        let roster = load_csv(
            "First name,Last name,Email address,Maximum grade,Grade\n\
             Alice,Smith,alice@x.com,100,85\n\
             Bob,Jones,bob@x.com,100,\n",
        )
        .unwrap();

        assert_eq!(roster.roles.grade, "Grade");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.rows[0].grade, "85");
    }

    #[test]
    fn test_missing_grade_column_fails() {
        let err = load_csv("Email,Name\na@x.com,Alice\n").unwrap_err();

        match err {
            Error::MissingColumns(diag) => assert_eq!(diag.missing, vec![Requirement::Grade]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_identity_column_fails() {
        let err = load_csv("Grade,Comment\n85,ok\n").unwrap_err();

        assert!(err.to_string().contains("'Email' or a 'Name'"));
    }

    #[test]
    fn test_from_file_reads_csv_and_tsv() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("grades.csv");
        let mut file = File::create(&csv_path).unwrap();
        write!(file, "\u{feff}Email,Grade\na@x.com,85\n").unwrap();

        let roster = RosterLoader::from_file(&csv_path).unwrap();
        assert_eq!(roster.roles.email.as_deref(), Some("Email"));
        assert_eq!(roster.rows[0].grade, "85");

        let tsv_path = dir.path().join("grades.tsv");
        std::fs::write(&tsv_path, "Name\tScore\nAlice Smith\t91\n").unwrap();

        let roster = RosterLoader::from_file(&tsv_path).unwrap();
        assert_eq!(roster.rows[0].name.as_deref(), Some("Alice Smith"));
        assert_eq!(roster.rows[0].grade, "91");
    }

    #[test]
    fn test_from_file_missing_file_is_io_error() {
        let err = RosterLoader::from_file(Path::new("/nonexistent/grades.csv")).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_render_cell_formats_numbers() {
        assert_eq!(render_cell(&Data::Float(85.0)).as_deref(), Some("85"));
        assert_eq!(render_cell(&Data::Float(72.5)).as_deref(), Some("72.5"));
        assert_eq!(render_cell(&Data::Int(9)).as_deref(), Some("9"));
        assert_eq!(render_cell(&Data::String("  ".to_string())), None);
        assert_eq!(render_cell(&Data::Empty), None);
    }
}
