//! Report content and rendering shared by every report kind.
//!
//! Each kind is reduced to a [`ReportTable`]; the CSV and PDF writers only
//! know about tables. Writers check the job's cancellation flag between rows.

use crate::config::AppConfig;
use crate::services::classes::store as class_store;
use crate::services::departments::store as department_store;
use crate::services::statistics::{aggregate, handlers::teaching_staff};
use common::load::format_percentage;
use common::requests::{ReportFormat, ReportKind};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Document, Element};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub enum RenderError {
    Cancelled,
    Failed(String),
}

impl From<rusqlite::Error> for RenderError {
    fn from(e: rusqlite::Error) -> Self {
        RenderError::Failed(format!("database error: {}", e))
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Failed(format!("io error: {}", e))
    }
}

impl From<csv::Error> for RenderError {
    fn from(e: csv::Error) -> Self {
        RenderError::Failed(format!("csv error: {}", e))
    }
}

impl From<genpdf::error::Error> for RenderError {
    fn from(e: genpdf::error::Error) -> Self {
        RenderError::Failed(format!("pdf error: {}", e))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn headers(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

/// Loads the rows of a report from the store.
pub fn build_table(
    conn: &Connection,
    config: &AppConfig,
    kind: ReportKind,
    department_id: Option<&str>,
) -> Result<ReportTable, RenderError> {
    match kind {
        ReportKind::TeacherLoad => {
            let mut teachers = teaching_staff(conn, config)?;
            if let Some(dep) = department_id {
                teachers.retain(|t| t.department_id.as_deref() == Some(dep));
            }
            let rows = aggregate::teacher_summaries(&teachers)
                .into_iter()
                .map(|s| {
                    vec![
                        s.teacher_id,
                        s.name,
                        s.department_id.unwrap_or_default(),
                        s.basic_teaching_lessons.to_string(),
                        s.total_reduced_lessons.to_string(),
                        s.final_basic_lessons.to_string(),
                        s.declared_lessons.to_string(),
                        s.remaining_lessons.to_string(),
                        s.excess_lessons.to_string(),
                        format_percentage(s.completion_percentage),
                    ]
                })
                .collect();
            Ok(ReportTable {
                title: "Báo cáo định mức giờ dạy giáo viên".to_string(),
                headers: headers(&[
                    "Mã GV",
                    "Họ tên",
                    "Tổ",
                    "Định mức",
                    "Giảm trừ",
                    "Định mức sau giảm",
                    "Số tiết đã khai",
                    "Còn thiếu",
                    "Vượt giờ",
                    "% hoàn thành",
                ]),
                rows,
            })
        }
        ReportKind::DepartmentSummary => {
            let departments = department_store::load_departments(conn)?;
            let teachers = teaching_staff(conn, config)?;
            let rows = aggregate::department_statistics(&departments, &teachers)
                .into_iter()
                .map(|d| {
                    vec![
                        d.name,
                        d.teacher_count.to_string(),
                        d.total_final_basic_lessons.to_string(),
                        d.total_declared_lessons.to_string(),
                        d.total_excess_lessons.to_string(),
                        format_percentage(d.completion_percentage),
                    ]
                })
                .collect();
            Ok(ReportTable {
                title: "Tổng hợp giờ dạy theo tổ bộ môn".to_string(),
                headers: headers(&[
                    "Tổ bộ môn",
                    "Số GV",
                    "Tổng định mức",
                    "Tổng số tiết đã khai",
                    "Tổng vượt giờ",
                    "% hoàn thành",
                ]),
                rows,
            })
        }
        ReportKind::ClassSummary => {
            let classes = class_store::load_classes(conn)?;
            let mut rows = Vec::new();
            for class in aggregate::class_statistics(&classes) {
                for subject in class.subjects {
                    let teachers = subject
                        .teachers
                        .iter()
                        .map(|t| format!("{} ({})", t.teacher_name, t.completed_lessons))
                        .collect::<Vec<_>>()
                        .join(", ");
                    rows.push(vec![
                        class.name.clone(),
                        class.grade.to_string(),
                        subject.subject_name,
                        subject.declared_lessons.to_string(),
                        subject.assigned_lessons.to_string(),
                        subject.remaining_lessons.to_string(),
                        teachers,
                    ]);
                }
            }
            Ok(ReportTable {
                title: "Tổng hợp phân công theo lớp".to_string(),
                headers: headers(&[
                    "Lớp",
                    "Khối",
                    "Môn",
                    "Số tiết",
                    "Đã phân công",
                    "Còn lại",
                    "Giáo viên",
                ]),
                rows,
            })
        }
    }
}

fn check(cancel: &AtomicBool) -> Result<(), RenderError> {
    if cancel.load(Ordering::SeqCst) {
        Err(RenderError::Cancelled)
    } else {
        Ok(())
    }
}

/// Writes `table` to `path`, reporting progress (0..=100) through `progress`.
pub fn render(
    table: &ReportTable,
    format: ReportFormat,
    path: &Path,
    config: &AppConfig,
    cancel: &AtomicBool,
    progress: &mut dyn FnMut(u32),
) -> Result<(), RenderError> {
    check(cancel)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let result = match format {
        ReportFormat::Csv => write_csv(table, path, cancel, progress),
        ReportFormat::Pdf => write_pdf(table, path, config, cancel, progress),
    };
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

fn row_progress(done: usize, total: usize) -> u32 {
    if total == 0 {
        100
    } else {
        (done * 100 / total) as u32
    }
}

fn write_csv(
    table: &ReportTable,
    path: &Path,
    cancel: &AtomicBool,
    progress: &mut dyn FnMut(u32),
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for (i, row) in table.rows.iter().enumerate() {
        check(cancel)?;
        writer.write_record(row)?;
        progress(row_progress(i + 1, table.rows.len()));
    }
    writer.flush()?;
    Ok(())
}

fn load_font(
    config: &AppConfig,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, RenderError> {
    if let Ok(family) = genpdf::fonts::from_files(&config.fonts_dir, &config.font_family, None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(&config.fonts_dir, "LiberationSans", None).map_err(|e| {
        RenderError::Failed(format!(
            "no usable font in {}: {}",
            config.fonts_dir.display(),
            e
        ))
    })
}

fn configure_document(config: &AppConfig, title: &str) -> Result<Document, RenderError> {
    let mut doc = Document::new(load_font(config)?);
    doc.set_title(title);
    doc.set_font_size(9);
    doc.set_line_spacing(1.0);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

fn write_pdf(
    table: &ReportTable,
    path: &Path,
    config: &AppConfig,
    cancel: &AtomicBool,
    progress: &mut dyn FnMut(u32),
) -> Result<(), RenderError> {
    let mut doc = configure_document(config, &table.title)?;
    doc.push(Paragraph::new(table.title.as_str()).styled(Style::new().bold().with_font_size(14)));
    doc.push(Break::new(1));

    let mut layout = TableLayout::new(vec![1; table.headers.len()]);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = layout.row();
    for title in &table.headers {
        header.push_element(
            Paragraph::new(title.as_str())
                .styled(Style::new().bold())
                .padded(1),
        );
    }
    header.push()?;

    for (i, row) in table.rows.iter().enumerate() {
        check(cancel)?;
        let mut cells = layout.row();
        for cell in row {
            cells.push_element(Paragraph::new(cell.as_str()).padded(1));
        }
        cells.push()?;
        progress(row_progress(i + 1, table.rows.len()).min(90));
    }
    doc.push(layout);

    check(cancel)?;
    doc.render_to_file(path)?;
    progress(100);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEnv;

    fn table() -> ReportTable {
        ReportTable {
            title: "T".into(),
            headers: headers(&["Lớp", "Số tiết"]),
            rows: vec![vec!["10A1".into(), "8".into()], vec!["10A2".into(), "4".into()]],
        }
    }

    #[test]
    fn csv_report_has_header_and_rows() {
        let env = TestEnv::new();
        let path = env.config.reports_dir.join("out.csv");
        let mut seen = Vec::new();
        render(
            &table(),
            ReportFormat::Csv,
            &path,
            &env.config,
            &AtomicBool::new(false),
            &mut |p: u32| seen.push(p),
        )
        .unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Lớp,Số tiết\n10A1,8\n10A2,4\n");
        assert_eq!(seen, vec![50, 100]);
    }

    #[test]
    fn raised_flag_stops_rendering_and_leaves_no_file() {
        let env = TestEnv::new();
        let path = env.config.reports_dir.join("out.csv");
        let result = render(
            &table(),
            ReportFormat::Csv,
            &path,
            &env.config,
            &AtomicBool::new(true),
            &mut |_: u32| {},
        );
        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(!path.exists());
    }

    #[test]
    fn teacher_load_rows_follow_the_load_arithmetic() {
        let env = TestEnv::new();
        env.add_department("D1", "Toán");
        env.add_teacher("T1", "An", Some("D1"), 20);
        env.add_teacher("T2", "Bình", None, 17);
        env.add_class("C1", "10A1", &[("S1", "Toán", 30)]);
        env.add_assignment("A1", "T1", "C1", "S1", 15);

        let conn = env.conn();
        let table = build_table(&conn, &env.config, ReportKind::TeacherLoad, Some("D1")).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "An");
        assert_eq!(table.rows[0][6], "15");
        assert_eq!(table.rows[0][7], "5");
        assert_eq!(table.rows[0][9], "75.00");

        let summary = build_table(&conn, &env.config, ReportKind::ClassSummary, None).unwrap();
        assert_eq!(summary.rows[0][6], "An (15)");
    }
}
