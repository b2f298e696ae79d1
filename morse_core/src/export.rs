//! CSV export of a generated lesson plan, one row per exercise.

use crate::types::{Exercise, Lesson};
use crate::Result;
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    day: u32,
    lesson: &'a str,
    step: usize,
    exercise: &'static str,
    title: Option<&'a str>,
    characters: String,
    repetitions: Option<u32>,
    points: Option<u32>,
    badge: Option<&'a str>,
    duration_minutes: u32,
}

impl<'a> CsvRow<'a> {
    fn new(lesson: &'a Lesson, step: usize, exercise: &'a Exercise) -> Self {
        let (title, points, badge) = match exercise {
            Exercise::Reward {
                title,
                points,
                badge,
                ..
            } => (Some(title.as_str()), Some(*points), Some(badge.as_str())),
            Exercise::Intro { title, .. }
            | Exercise::Technique { title, .. }
            | Exercise::PatternIntro { title, .. }
            | Exercise::AudioRecognition { title, .. } => (Some(title.as_str()), None, None),
            _ => (None, None, None),
        };

        CsvRow {
            day: lesson.day,
            lesson: &lesson.title,
            step: step + 1,
            exercise: exercise.kind_name(),
            title,
            characters: exercise.characters().iter().collect(),
            repetitions: exercise.repetitions(),
            points,
            badge,
            duration_minutes: exercise.duration_minutes(),
        }
    }
}

/// Write `lessons` as CSV with a header row; returns the number of data rows
pub fn write_lessons<W: Write>(lessons: &[Lesson], out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;

    for lesson in lessons {
        for (step, exercise) in lesson.exercises.iter().enumerate() {
            writer.serialize(CsvRow::new(lesson, step, exercise))?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Export the lesson plan to a CSV file, replacing any existing file
pub fn export_lessons_csv(lessons: &[Lesson], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let rows = write_lessons(lessons, &file)?;
    file.sync_all()?;

    tracing::info!("Exported {} exercises to {:?}", rows, path);
    Ok(rows)
}
