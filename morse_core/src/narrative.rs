//! Lesson narrative lookup tables.
//!
//! The generator asks these tables for optional text and never branches on
//! specific characters itself.

/// How a character's pattern relates to ones learned before it
pub fn pattern_relationship(ch: char) -> Option<&'static str> {
    let text = match ch.to_ascii_uppercase() {
        'T' => "T (−) is a single dash, the complete opposite of E (•). This contrast helps your brain distinguish between the two basic elements.",
        'A' => "A (•−) combines the dot from E with the dash from T, creating a new pattern that builds on what you've learned.",
        'N' => "N (−•) is the mirror image of A (•−), creating a pattern relationship that's easier for AuDHD brains to recognize.",
        'I' => "I is a pattern extension of E, repeating the same element twice.",
        'M' => "M is a pattern extension of T, repeating the same element twice.",
        'S' => "S extends the pattern of I to three elements, creating a distinctive rhythm.",
        'O' => "O extends the pattern of M to three elements, creating a distinctive rhythm.",
        'R' => "R has a symmetric pattern that builds on A, helping with pattern recognition.",
        'K' => "K has a symmetric pattern that mirrors R, helping with pattern recognition.",
        _ => return None,
    };
    Some(text)
}

/// Why a character sits where it does in the AuDHD ordering
pub fn character_description(ch: char) -> Option<&'static str> {
    let text = match ch.to_ascii_uppercase() {
        'E' => "The simplest element; foundation building - a single dot.",
        'T' => "Complete contrast to E; reinforces basic elements - a single dash.",
        'A' => "Combines learned elements; high frequency - dot followed by dash.",
        'N' => "Mirror image of A; creates pattern recognition - dash followed by dot.",
        'I' => "Pattern extension of E; distinct rhythm - two dots.",
        'M' => "Pattern extension of T; auditory contrast to I - two dashes.",
        'S' => "Rhythmic progression from I; distinctive pattern - three dots.",
        'O' => "Rhythmic progression from M; contrasts with S - three dashes.",
        'R' => "Symmetric pattern; builds on A - dot, dash, dot.",
        'K' => "Mirror of R; creates pattern relationship - dash, dot, dash.",
        'D' => "Builds on N; frequent letter - dash, dot, dot.",
        _ => return None,
    };
    Some(text)
}
