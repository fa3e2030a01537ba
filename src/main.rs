use campus_records::{
    collaborator::{FeedApi, RecordsApi},
    config::{self, AppConfig},
    core::{
        aggregate::{group_by_period, ingest, subject_summary},
        export::{ReportFormat, report_file_name, timetable_file_name},
        grades::{GradeRollup, sgpa_display, validate_grades},
        report::{
            monthly_attendance_report, period_report, subject_summary_csv, timetable_csv,
            timetable_report,
        },
    },
    errors::Result,
};
use chrono::Utc;
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn write_report(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents)
        .inspect(|()| info!("Wrote {}", path.display()))
        .inspect_err(|e| error!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}

async fn run(app_config: &AppConfig, api: &FeedApi) -> Result<()> {
    let student = app_config.feed.student_id.as_deref();
    let context = app_config.feed.context.as_str();
    let output_dir = &app_config.report.output_dir;
    std::fs::create_dir_all(output_dir)?;

    // Attendance: malformed records are reported and left out.
    let ingested = ingest(api.fetch_attendance(student).await?);
    for rejected in &ingested.rejected {
        warn!("Skipped record: {}", rejected);
    }
    let records = &ingested.records;
    let summary = subject_summary(records);
    info!(
        "{} records across {} subjects, overall {}%",
        records.len(),
        summary.subjects.len(),
        summary.overall_percentage()
    );

    write_report(
        output_dir,
        &report_file_name(context, ReportFormat::Csv),
        &subject_summary_csv(&summary),
    )?;

    let month = records
        .iter()
        .map(|r| r.date)
        .max()
        .unwrap_or_else(|| Utc::now().date_naive());
    let monthly = monthly_attendance_report(&summary, month).layout(&app_config.report.page);
    write_report(
        output_dir,
        &report_file_name(context, ReportFormat::Text),
        &monthly.render_text(),
    )?;

    let periods = period_report(
        "Attendance by period",
        group_by_period(records, app_config.report.granularity),
    )
    .layout(&app_config.report.page);
    write_report(
        output_dir,
        &report_file_name(&format!("{context} Periods"), ReportFormat::Text),
        &periods.render_text(),
    )?;

    // One timetable grid per class group, on landscape pages.
    let timetable = api.timetable().await;
    let mut groups: Vec<(u32, &str, &str)> = Vec::new();
    for slot in &timetable {
        let session = &slot.session;
        if !groups
            .iter()
            .any(|(y, s, _)| *y == session.year && s.eq_ignore_ascii_case(&session.section))
        {
            groups.push((session.year, session.section.as_str(), session.branch.as_str()));
        }
    }
    let landscape = app_config.report.page.landscape();
    for (year, section, branch) in groups {
        write_report(
            output_dir,
            &timetable_file_name(year, section, ReportFormat::Csv),
            &timetable_csv(&timetable, year, section),
        )?;
        let layout = timetable_report(&timetable, branch, year, section).layout(&landscape);
        write_report(
            output_dir,
            &timetable_file_name(year, section, ReportFormat::Text),
            &layout.render_text(),
        )?;
    }

    // Grades are only published per student.
    if let Some(student) = student {
        let grades = api.fetch_grades(student).await?;
        if let Err(e) = validate_grades(&grades) {
            warn!("Grade record of {} is inconsistent: {}", student, e);
        }
        let rollup = GradeRollup::new(&grades);
        info!("CGPA of {}: {}", student, rollup.cgpa());
        for semester in rollup.semesters() {
            info!(
                "Semester {}: SGPA {}, {} subjects",
                semester.number,
                sgpa_display(semester),
                semester.subjects.len()
            );
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Open the records feed
    let api = FeedApi::from_path(&app_config.feed.snapshot_path)
        .inspect_err(|e| error!("Failed to open records feed: {}", e))?;

    // 5. Build and write the reports
    run(&app_config, &api)
        .await
        .inspect(|()| info!("Reports written to {}", app_config.report.output_dir.display()))
        .inspect_err(|e| error!("Report generation failed: {}", e))
}
