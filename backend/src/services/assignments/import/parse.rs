//! Reads an assignment spreadsheet (CSV export) into rows.
//!
//! Expected header: `Tên giáo viên`, then any number of `Mã lớp N` /
//! `Số tiết N` column pairs. Column order does not matter; pairs are matched
//! by `N`.

use crate::error::ApiError;
use regex::Regex;
use std::collections::BTreeMap;

pub const TEACHER_COLUMN: &str = "Tên giáo viên";

/// One `Mã lớp N` / `Số tiết N` pair as read from a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCell {
    pub group: u32,
    pub class_code: String,
    pub lessons: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    pub teacher_name: String,
    pub classes: Vec<ClassCell>,
}

#[derive(Default)]
struct GroupColumns {
    class_code: Option<usize>,
    lessons: Option<usize>,
}

/// Picks the delimiter that occurs most often in the header line.
pub fn detect_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|&d| header_line.bytes().filter(|&b| b == d).count())
        .unwrap_or(b',')
}

fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}')
        .replace('\u{00A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_sheet(bytes: &[u8]) -> Result<Vec<ImportRow>, ApiError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ApiError::BadRequest("Tệp phải được mã hoá UTF-8".to_string()))?;
    let header_line = text.lines().next().unwrap_or_default();
    if header_line.trim().is_empty() {
        return Err(ApiError::BadRequest("Tệp không có dòng tiêu đề".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let class_re = Regex::new(r"(?i)^mã lớp\s*(\d+)$")
        .map_err(|e| ApiError::Internal(format!("Regex error: {}", e)))?;
    let lessons_re = Regex::new(r"(?i)^số tiết\s*(\d+)$")
        .map_err(|e| ApiError::Internal(format!("Regex error: {}", e)))?;

    let mut teacher_col = None;
    let mut groups: BTreeMap<u32, GroupColumns> = BTreeMap::new();
    for (idx, raw) in reader.headers()?.iter().enumerate() {
        let title = normalize_header(raw);
        if title.to_lowercase() == TEACHER_COLUMN.to_lowercase() {
            teacher_col.get_or_insert(idx);
        } else if let Some(n) = class_re.captures(&title).and_then(|c| c[1].parse().ok()) {
            groups.entry(n).or_default().class_code = Some(idx);
        } else if let Some(n) = lessons_re.captures(&title).and_then(|c| c[1].parse().ok()) {
            groups.entry(n).or_default().lessons = Some(idx);
        }
    }
    let teacher_col = teacher_col.ok_or_else(|| {
        ApiError::BadRequest(format!("Thiếu cột \"{}\" trong dòng tiêu đề", TEACHER_COLUMN))
    })?;
    if let Some((n, _)) = groups
        .iter()
        .find(|(_, cols)| cols.class_code.is_none() || cols.lessons.is_none())
    {
        return Err(ApiError::BadRequest(format!(
            "Cột \"Mã lớp {n}\" và \"Số tiết {n}\" phải đi cùng nhau"
        )));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let cell = |idx: Option<usize>| {
            idx.and_then(|col| record.get(col))
                .unwrap_or_default()
                .to_string()
        };
        rows.push(ImportRow {
            row: record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(i + 2),
            teacher_name: cell(Some(teacher_col)),
            classes: groups
                .iter()
                .map(|(&group, cols)| ClassCell {
                    group,
                    class_code: cell(cols.class_code),
                    lessons: cell(cols.lessons),
                })
                .collect(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_paired_by_number() {
        let sheet = "\u{feff}Tên giáo viên,Số tiết 2,Mã lớp 1,Số tiết 1,Mã lớp 2\n\
                     Nguyen Van A,3,10A1,8,10A2\n";
        let rows = parse_sheet(sheet.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].teacher_name, "Nguyen Van A");
        assert_eq!(
            rows[0].classes,
            vec![
                ClassCell {
                    group: 1,
                    class_code: "10A1".into(),
                    lessons: "8".into()
                },
                ClassCell {
                    group: 2,
                    class_code: "10A2".into(),
                    lessons: "3".into()
                },
            ]
        );
    }

    #[test]
    fn semicolon_exports_and_short_rows_are_read() {
        let sheet = "Tên giáo viên;Mã lớp 1;Số tiết 1;Mã lớp 2;Số tiết 2\n\
                     \n\
                     Tran Thi B;11B2;4\n";
        let rows = parse_sheet(sheet.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 3);
        assert_eq!(rows[0].classes[1].class_code, "");
    }

    #[test]
    fn teacher_column_is_required() {
        let err = parse_sheet("Mã lớp 1,Số tiết 1\n10A1,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn unpaired_group_is_rejected() {
        let err = parse_sheet("Tên giáo viên,Mã lớp 1\nAn,10A1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn delimiter_follows_the_header() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a,b"), b',');
    }
}
