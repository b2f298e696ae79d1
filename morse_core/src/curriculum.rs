//! Curriculum generator: turns a progression into an ordered lesson list.
//!
//! Generation is a pure function of its inputs:
//!
//! 1. **Day 1** introduces Morse and the first character
//! 2. **Per character** (index `i >= 1`) a practice lesson, preceded by a
//!    review lesson whenever `i - 1` is a review breakpoint
//! 3. **Final review** over the last ten characters
//!
//! Lesson days are contiguous from 1. Callers that change method or
//! progression throw the old list away and generate a new one.

use crate::catalog::MethodPlan;
use crate::codec;
use crate::narrative;
use crate::types::{Exercise, Lesson, LessonKind, Progression};
use crate::{Error, Result};
use std::collections::BTreeSet;

const LESSON_MINUTES: u32 = 15;
const FINAL_LESSON_MINUTES: u32 = 20;

/// Characters revisited at the start of a lesson or in a review cycle
const REVIEW_WINDOW: usize = 4;
/// Previously learned characters mixed into multi-character practice
const MULTI_CHAR_WINDOW: usize = 3;
/// Characters covered by the final review
const FINAL_WINDOW: usize = 10;

/// Generate lessons for a method's canned plan
pub fn generate_for_plan(plan: &MethodPlan) -> Result<Vec<Lesson>> {
    generate(
        &plan.progression,
        &plan.review_breakpoints,
        plan.method.label(),
    )
}

/// Generate the full lesson list for a progression
///
/// `breakpoints` are progression indices after which a review cycle is
/// inserted; `method_label` is embedded in the Day 1 intro title.
pub fn generate(
    progression: &Progression,
    breakpoints: &BTreeSet<usize>,
    method_label: &str,
) -> Result<Vec<Lesson>> {
    let chars = progression.chars();
    let first = *chars.first().ok_or_else(|| {
        Error::Curriculum("Cannot generate lessons for an empty progression".into())
    })?;

    let mut lessons = Vec::with_capacity(chars.len() + breakpoints.len() + 1);
    let mut day = 1u32;

    lessons.push(introduction_lesson(day, first, method_label)?);

    for i in 1..chars.len() {
        if breakpoints.contains(&(i - 1)) {
            day += 1;
            let cycle = breakpoints.range(..i - 1).count() + 1;
            lessons.push(review_lesson(day, cycle, tail(&chars[..i], REVIEW_WINDOW)));
        }
        day += 1;
        lessons.push(character_lesson(day, chars, i)?);
    }

    day += 1;
    lessons.push(final_lesson(day, tail(chars, FINAL_WINDOW), method_label));

    tracing::debug!(
        "Generated {} lessons for {} characters ({} method)",
        lessons.len(),
        chars.len(),
        method_label
    );
    Ok(lessons)
}

fn introduction_lesson(day: u32, ch: char, method_label: &str) -> Result<Lesson> {
    let glyphs = glyphs_for(ch)?;
    let exercises = vec![
        Exercise::Intro {
            title: format!("Welcome to Morse for AuDHD ({} Method)", method_label),
            content: "Today we'll learn about Morse code and master your first character. \
                      Morse code uses dots and dashes to represent letters and numbers. \
                      We'll focus on training your ear to recognize these patterns."
                .into(),
            duration_minutes: 2,
        },
        Exercise::Technique {
            title: "The 'Listening Mindset'".into(),
            content: "Instead of counting dots and dashes, try to hear patterns as whole sounds. \
                      Focus on the rhythm and the overall pattern."
                .into(),
            duration_minutes: 1,
        },
        character_exercise(ch)?,
        flash_exercise(ch),
        Exercise::Comprehension {
            chars: vec![ch],
            sets: 5,
            duration_minutes: 4,
        },
        Exercise::Reward {
            title: "First Letter Unlocked!".into(),
            content: format!("You've learned your first Morse code character: {}", ch),
            points: 10,
            badge: "first_letter".into(),
            duration_minutes: 1,
        },
        Exercise::AudioRecognition {
            title: "Sound Recognition Training".into(),
            content: format!(
                "Close your eyes and focus on the sound of {}. Listen for its distinctive pattern.",
                ch
            ),
            duration_minutes: 1,
        },
    ];

    Ok(Lesson {
        day,
        kind: LessonKind::Introduction { ch },
        title: format!("Introduction to Morse & Letter {}", ch),
        description: format!(
            "Learn the basics of Morse code and your first letter: {} ({})",
            ch, glyphs
        ),
        duration_minutes: LESSON_MINUTES,
        exercises,
        total_points: 25,
    })
}

fn review_lesson(day: u32, cycle: usize, review: &[char]) -> Lesson {
    let listed = join_chars(review);
    let exercises = vec![
        Exercise::Intro {
            title: "Review Cycle".into(),
            content: format!(
                "Research shows that strategic review is crucial for AuDHD learners. \
                 Today we'll reinforce your knowledge of {} before learning new characters.",
                listed
            ),
            duration_minutes: 2,
        },
        Exercise::Review {
            chars: review.to_vec(),
            reps: 8,
            duration_minutes: 3,
        },
        Exercise::ContrastPractice {
            chars: review.to_vec(),
            sets: 6,
            duration_minutes: 4,
        },
        Exercise::MultiCharPractice {
            chars: review.to_vec(),
            sets: 5,
            duration_minutes: 4,
        },
        Exercise::Reward {
            title: "Review Completed!".into(),
            content: format!("You've reinforced your knowledge of {}", listed),
            points: 15,
            badge: format!("review_cycle_{}", cycle),
            duration_minutes: 2,
        },
    ];

    Lesson {
        day,
        kind: LessonKind::ReviewCycle { cycle },
        title: format!("Review Cycle #{}", cycle),
        description: format!("Reinforce your knowledge of {}", listed),
        duration_minutes: LESSON_MINUTES,
        exercises,
        total_points: 20,
    }
}

fn character_lesson(day: u32, chars: &[char], index: usize) -> Result<Lesson> {
    let current = chars[index];
    let previous = &chars[..index];
    let last = previous[previous.len() - 1];
    let glyphs = glyphs_for(current)?;
    let learned = index + 1;

    let mut exercises = vec![
        Exercise::Review {
            chars: tail(previous, REVIEW_WINDOW).to_vec(),
            reps: 5,
            duration_minutes: 2,
        },
        character_exercise(current)?,
        flash_exercise(current),
    ];

    if let Some(text) = narrative::pattern_relationship(current) {
        exercises.push(Exercise::PatternIntro {
            title: "Pattern Relationship".into(),
            content: text.into(),
            duration_minutes: 2,
        });
    }

    let mut multi = tail(previous, MULTI_CHAR_WINDOW).to_vec();
    multi.push(current);

    exercises.extend([
        Exercise::ContrastPractice {
            chars: vec![current, last],
            sets: 5,
            duration_minutes: 3,
        },
        Exercise::MultiCharPractice {
            chars: multi,
            sets: 3,
            duration_minutes: 3,
        },
        Exercise::Reward {
            title: format!("Character {} Mastered!", learned),
            content: format!(
                "You've learned {} and can now recognize {} Morse code characters!",
                current, learned
            ),
            points: 10 + index as u32,
            badge: format!("character_{}", learned),
            duration_minutes: 1,
        },
    ]);

    Ok(Lesson {
        day,
        kind: LessonKind::NewCharacter { ch: current, index },
        title: format!("Letter {} & Practice", current),
        description: format!(
            "Learn {} ({}) and practice with previously learned characters",
            current, glyphs
        ),
        duration_minutes: LESSON_MINUTES,
        exercises,
        total_points: 20 + index as u32,
    })
}

fn final_lesson(day: u32, review: &[char], method_label: &str) -> Lesson {
    let exercises = vec![
        Exercise::Intro {
            title: "Congratulations on Your Progress!".into(),
            content: format!(
                "You've learned all the characters in the {} sequence. \
                 Now let's reinforce your knowledge with comprehensive practice.",
                method_label
            ),
            duration_minutes: 2,
        },
        Exercise::Review {
            chars: review.to_vec(),
            reps: 10,
            duration_minutes: 4,
        },
        Exercise::MultiCharPractice {
            chars: review.to_vec(),
            sets: 8,
            duration_minutes: 6,
        },
        Exercise::Comprehension {
            chars: review.to_vec(),
            sets: 6,
            duration_minutes: 5,
        },
        Exercise::Reward {
            title: "Morse Code Mastery Achieved!".into(),
            content: format!(
                "You've completed the {} Morse code learning sequence. \
                 Continue practicing to increase your speed and fluency.",
                method_label
            ),
            points: 50,
            badge: "morse_master".into(),
            duration_minutes: 3,
        },
    ];

    Lesson {
        day,
        kind: LessonKind::FinalReview,
        title: "Final Comprehensive Review".into(),
        description: "Master all characters through comprehensive practice".into(),
        duration_minutes: FINAL_LESSON_MINUTES,
        exercises,
        total_points: 100,
    }
}

fn character_exercise(ch: char) -> Result<Exercise> {
    Ok(Exercise::Character {
        ch,
        glyphs: glyphs_for(ch)?,
        mnemonic: codec::mnemonic(ch).ok_or(Error::UnknownCharacter(ch))?,
        description: narrative::character_description(ch).map(String::from),
        duration_minutes: 3,
    })
}

fn flash_exercise(ch: char) -> Exercise {
    Exercise::FlashPractice {
        chars: vec![ch],
        reps: 10,
        interval_seconds: 3,
        duration_minutes: 3,
    }
}

fn glyphs_for(ch: char) -> Result<String> {
    codec::display_glyphs(ch).ok_or(Error::UnknownCharacter(ch))
}

/// The last `n` items, or all of them when there are fewer
fn tail(chars: &[char], n: usize) -> &[char] {
    &chars[chars.len().saturating_sub(n)..]
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_method_plan;
    use crate::types::LearningMethod;

    fn audhd_lessons() -> Vec<Lesson> {
        generate_for_plan(get_method_plan(LearningMethod::Audhd)).unwrap()
    }

    #[test]
    fn test_day_one_layout() {
        let lessons = audhd_lessons();
        let day_one = &lessons[0];

        assert_eq!(day_one.day, 1);
        assert_eq!(day_one.total_points, 25);
        assert_eq!(day_one.duration_minutes, 15);
        assert_eq!(day_one.title, "Introduction to Morse & Letter E");
        assert_eq!(
            day_one.description,
            "Learn the basics of Morse code and your first letter: E (•)"
        );

        let kinds: Vec<&str> = day_one.exercises.iter().map(|e| e.kind_name()).collect();
        assert_eq!(
            kinds,
            vec![
                "intro",
                "technique",
                "character",
                "flash_practice",
                "comprehension",
                "reward",
                "audio_recognition"
            ]
        );

        match &day_one.exercises[0] {
            Exercise::Intro { title, .. } => {
                assert_eq!(title, "Welcome to Morse for AuDHD (AuDHD Method)")
            }
            other => panic!("expected intro, got {:?}", other),
        }
        match &day_one.exercises[5] {
            Exercise::Reward { points, badge, .. } => {
                assert_eq!(*points, 10);
                assert_eq!(badge, "first_letter");
            }
            other => panic!("expected reward, got {:?}", other),
        }
    }

    #[test]
    fn test_first_review_precedes_fifth_character() {
        let lessons = audhd_lessons();
        let review_pos = lessons
            .iter()
            .position(|l| matches!(l.kind, LessonKind::ReviewCycle { cycle: 1 }))
            .unwrap();

        let review = &lessons[review_pos];
        assert_eq!(review.title, "Review Cycle #1");
        assert_eq!(review.total_points, 20);
        assert_eq!(review.description, "Reinforce your knowledge of E, T, A, N");
        match &review.exercises[4] {
            Exercise::Reward { badge, .. } => assert_eq!(badge, "review_cycle_1"),
            other => panic!("expected reward, got {:?}", other),
        }

        let next = &lessons[review_pos + 1];
        assert_eq!(next.kind, LessonKind::NewCharacter { ch: 'I', index: 4 });
        assert_eq!(next.title, "Letter I & Practice");
    }

    #[test]
    fn test_days_are_contiguous() {
        for method in LearningMethod::ALL {
            let lessons = generate_for_plan(get_method_plan(method)).unwrap();
            for (i, lesson) in lessons.iter().enumerate() {
                assert_eq!(lesson.day, i as u32 + 1, "{} lesson {}", method, i);
            }
        }
    }

    #[test]
    fn test_lesson_counts() {
        // 1 intro + 38 characters + 13 reviews + final
        assert_eq!(audhd_lessons().len(), 53);
        // Koch has no review cycles
        let koch = generate_for_plan(get_method_plan(LearningMethod::Koch)).unwrap();
        assert_eq!(koch.len(), 42);
    }

    #[test]
    fn test_character_lesson_points_and_windows() {
        let lessons = audhd_lessons();
        let k = lessons
            .iter()
            .find(|l| matches!(l.kind, LessonKind::NewCharacter { ch: 'K', .. }))
            .unwrap();

        // K is index 9
        assert_eq!(k.total_points, 29);
        assert_eq!(
            k.exercises[0],
            Exercise::Review {
                chars: vec!['M', 'S', 'O', 'R'],
                reps: 5,
                duration_minutes: 2,
            }
        );
        assert!(k.exercises.iter().any(|e| e.kind_name() == "pattern_intro"));
        assert!(k.exercises.contains(&Exercise::ContrastPractice {
            chars: vec!['K', 'R'],
            sets: 5,
            duration_minutes: 3,
        }));
        assert!(k.exercises.contains(&Exercise::MultiCharPractice {
            chars: vec!['S', 'O', 'R', 'K'],
            sets: 3,
            duration_minutes: 3,
        }));
        match k.exercises.last().unwrap() {
            Exercise::Reward { points, badge, .. } => {
                assert_eq!(*points, 19);
                assert_eq!(badge, "character_10");
            }
            other => panic!("expected reward, got {:?}", other),
        }
    }

    #[test]
    fn test_pattern_intro_is_optional() {
        let lessons = audhd_lessons();
        let d = lessons
            .iter()
            .find(|l| matches!(l.kind, LessonKind::NewCharacter { ch: 'D', .. }))
            .unwrap();
        assert!(d.exercises.iter().all(|e| e.kind_name() != "pattern_intro"));
        assert_eq!(d.exercises.len(), 6);
    }

    #[test]
    fn test_early_review_uses_all_previous_characters() {
        let lessons = audhd_lessons();
        // Letter A: only E and T came before
        assert_eq!(
            lessons[2].exercises[0],
            Exercise::Review {
                chars: vec!['E', 'T'],
                reps: 5,
                duration_minutes: 2,
            }
        );
    }

    #[test]
    fn test_final_lesson() {
        let lessons = audhd_lessons();
        let last = lessons.last().unwrap();
        assert_eq!(last.kind, LessonKind::FinalReview);
        assert_eq!(last.total_points, 100);
        assert_eq!(last.duration_minutes, 20);
        assert_eq!(last.exercises[1].characters().len(), 10);
        assert_eq!(last.exercises[1].characters().last(), Some(&'?'));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = serde_json::to_string(&audhd_lessons()).unwrap();
        let second = serde_json::to_string(&audhd_lessons()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_character_progression() {
        let progression = Progression::new(vec!['E']).unwrap();
        let lessons = generate(&progression, &BTreeSet::new(), "Custom").unwrap();
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[1].kind, LessonKind::FinalReview);
        assert_eq!(lessons[1].exercises[1].characters(), &['E']);
    }

    #[test]
    fn test_lowercase_progression_generates_uppercase_lessons() {
        let progression = Progression::new(vec!['e', 't']).unwrap();
        let lessons = generate(&progression, &BTreeSet::new(), "Custom").unwrap();
        assert_eq!(lessons[0].title, "Introduction to Morse & Letter E");
        assert_eq!(lessons[1].title, "Letter T & Practice");
        assert_eq!(lessons[1].kind, LessonKind::NewCharacter { ch: 'T', index: 1 });
    }

    #[test]
    fn test_empty_progression_is_rejected() {
        let progression = Progression::new(vec![]).unwrap();
        let err = generate(&progression, &BTreeSet::new(), "Custom").unwrap_err();
        assert!(matches!(err, Error::Curriculum(_)));
    }

    #[test]
    fn test_custom_breakpoints_rank_cycles() {
        let progression = Progression::new(vec!['E', 'T', 'A', 'N', 'I']).unwrap();
        let breakpoints: BTreeSet<usize> = [1, 3].into_iter().collect();
        let lessons = generate(&progression, &breakpoints, "Custom").unwrap();

        let cycles: Vec<usize> = lessons
            .iter()
            .filter_map(|l| match l.kind {
                LessonKind::ReviewCycle { cycle } => Some(cycle),
                _ => None,
            })
            .collect();
        assert_eq!(cycles, vec![1, 2]);
        // review of E, T sits between Letter T and Letter A
        assert_eq!(lessons[2].title, "Review Cycle #1");
        assert_eq!(lessons[2].exercises[1].characters(), &['E', 'T']);
        assert_eq!(lessons[3].title, "Letter A & Practice");
    }
}
