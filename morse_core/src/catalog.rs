//! Canned character progressions and their review breakpoints.
//!
//! These are configuration data, not logic: one plan per [`LearningMethod`].

use crate::codec;
use crate::types::{LearningMethod, Progression};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Characters per pattern family
pub const FAMILY_SIZE: usize = 4;

/// LCWO.net character order
const KOCH_PROGRESSION: &[char] = &[
    'K', 'M', 'U', 'R', 'E', 'S', 'N', 'A', 'P', 'T', //
    'L', 'W', 'I', '.', 'J', 'Z', '=', 'F', 'O', 'Y', //
    ',', 'V', 'G', '5', '/', 'Q', '9', '2', 'H', '3', //
    '8', 'B', '?', '4', '7', 'C', '1', 'D', '6', '0', //
    'X',
];

/// Simplicity-first order
const LOGICAL_PROGRESSION: &[char] = &[
    'T', 'E', 'A', 'N', 'I', 'M', 'S', 'O', 'R', 'K', //
    'L', 'U', 'D', 'G', 'F', 'Y', 'C', 'Q', 'B', 'X', //
    'Z', 'H', '1', '2', '3', '4', '5', '6', '7', '8', //
    '9', '0',
];

/// Pattern-relationship order, grouped by review cycle
const AUDHD_PROGRESSION: &[char] = &[
    'E', 'T', 'A', 'N', // cycle 1
    'I', 'M', 'S', 'O', // cycle 2
    'R', 'K', 'D', // cycle 3
    'U', 'G', 'W', // cycle 4
    'H', 'B', 'L', // cycle 5
    'F', 'P', 'V', // cycle 6
    'J', 'C', 'Y', // cycle 7
    'Q', 'X', 'Z', // cycle 8
    '5', '0', // extremes
    '1', '9', // one element changed
    '2', '8', // two elements changed
    '3', '7', // three elements changed
    '4', '6', // four elements changed
    '.', ',', '?',
];

/// Indices into [`AUDHD_PROGRESSION`] after which a review lesson is inserted
const AUDHD_REVIEW_BREAKPOINTS: &[usize] = &[3, 7, 10, 13, 16, 19, 22, 25, 27, 29, 31, 33, 36];

/// A progression plus the review cycles that go with it
#[derive(Clone, Debug)]
pub struct MethodPlan {
    pub method: LearningMethod,
    pub progression: Progression,
    pub review_breakpoints: BTreeSet<usize>,
}

static KOCH_PLAN: Lazy<MethodPlan> = Lazy::new(|| MethodPlan {
    method: LearningMethod::Koch,
    progression: Progression::from_table(KOCH_PROGRESSION),
    review_breakpoints: BTreeSet::new(),
});

static LOGICAL_PLAN: Lazy<MethodPlan> = Lazy::new(|| MethodPlan {
    method: LearningMethod::Logical,
    progression: Progression::from_table(LOGICAL_PROGRESSION),
    review_breakpoints: BTreeSet::new(),
});

static AUDHD_PLAN: Lazy<MethodPlan> = Lazy::new(|| MethodPlan {
    method: LearningMethod::Audhd,
    progression: Progression::from_table(AUDHD_PROGRESSION),
    review_breakpoints: AUDHD_REVIEW_BREAKPOINTS.iter().copied().collect(),
});

/// Get the cached plan for a learning method
pub fn get_method_plan(method: LearningMethod) -> &'static MethodPlan {
    match method {
        LearningMethod::Koch => &KOCH_PLAN,
        LearningMethod::Logical => &LOGICAL_PLAN,
        LearningMethod::Audhd => &AUDHD_PLAN,
    }
}

impl MethodPlan {
    /// Validate the plan for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let chars = self.progression.chars();

        if chars.is_empty() {
            errors.push(format!("{} progression is empty", self.method));
        }

        let mut seen = HashSet::new();
        for &ch in chars {
            if !codec::is_supported(ch) {
                errors.push(format!(
                    "{} progression contains unsupported character {:?}",
                    self.method, ch
                ));
            }
            if !seen.insert(ch) {
                errors.push(format!(
                    "{} progression contains duplicate character {:?}",
                    self.method, ch
                ));
            }
        }

        // A breakpoint on the last index would never be reached
        for &index in &self.review_breakpoints {
            if index + 1 >= chars.len() {
                errors.push(format!(
                    "{} review breakpoint {} is past the last new character",
                    self.method, index
                ));
            }
        }

        errors
    }
}

/// One character as listed in a pattern family
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FamilyMember {
    pub ch: char,
    pub glyphs: String,
    pub words: String,
}

/// A fixed-size group of consecutive progression characters
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PatternFamily {
    pub name: String,
    pub description: String,
    pub members: Vec<FamilyMember>,
}

/// Chunk a progression into families of [`FAMILY_SIZE`]
pub fn pattern_families(progression: &Progression) -> Vec<PatternFamily> {
    progression
        .chars()
        .chunks(FAMILY_SIZE)
        .enumerate()
        .map(|(n, chunk)| {
            let first = n * FAMILY_SIZE + 1;
            let last = first + chunk.len() - 1;
            PatternFamily {
                name: format!("Group {}", n + 1),
                description: format!("Characters {}-{}", first, last),
                members: chunk
                    .iter()
                    .map(|&ch| FamilyMember {
                        ch,
                        glyphs: codec::display_glyphs(ch).unwrap_or_default(),
                        words: codec::pattern_words(ch).unwrap_or_default(),
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plans_load() {
        assert_eq!(get_method_plan(LearningMethod::Koch).progression.len(), 41);
        assert_eq!(get_method_plan(LearningMethod::Logical).progression.len(), 32);
        assert_eq!(get_method_plan(LearningMethod::Audhd).progression.len(), 39);
    }

    #[test]
    fn test_all_plans_validate() {
        for method in LearningMethod::ALL {
            let errors = get_method_plan(method).validate();
            assert!(
                errors.is_empty(),
                "{} plan has validation errors: {:?}",
                method,
                errors
            );
        }
    }

    #[test]
    fn test_only_audhd_has_review_cycles() {
        assert!(get_method_plan(LearningMethod::Koch).review_breakpoints.is_empty());
        assert!(get_method_plan(LearningMethod::Logical).review_breakpoints.is_empty());
        let audhd = get_method_plan(LearningMethod::Audhd);
        assert_eq!(audhd.review_breakpoints.len(), 13);
        assert!(audhd.review_breakpoints.contains(&3));
    }

    #[test]
    fn test_validate_catches_bad_breakpoint() {
        let mut plan = get_method_plan(LearningMethod::Logical).clone();
        plan.review_breakpoints.insert(31);
        let errors = plan.validate();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_pattern_families() {
        let plan = get_method_plan(LearningMethod::Logical);
        let families = pattern_families(&plan.progression);
        assert_eq!(families.len(), 8);
        assert_eq!(families[0].name, "Group 1");
        assert_eq!(families[0].description, "Characters 1-4");
        assert_eq!(families[0].members[0].ch, 'T');
        assert_eq!(families[0].members[0].words, "long");
        assert_eq!(families[0].members[2].glyphs, "•−");
    }

    #[test]
    fn test_short_final_family() {
        let plan = get_method_plan(LearningMethod::Koch);
        let families = pattern_families(&plan.progression);
        let last = families.last().unwrap();
        assert_eq!(last.members.len(), 1);
        assert_eq!(last.description, "Characters 41-41");
    }
}
