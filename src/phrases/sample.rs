//! Built-in sample expressions
//!
//! Five expressions per situation. Used whenever the configured source is
//! missing or empty, and offered to the user as a downloadable CSV.

use std::sync::LazyLock;

use super::codec::{encode_table, UTF8_BOM};
use super::table::{PhraseTable, Situation};

/// File name offered for the sample download
pub const SAMPLE_FILE_NAME: &str = "classroom_expressions_sample.csv";

/// Media type of the sample download
pub const SAMPLE_MEDIA_TYPE: &str = "text/csv";

pub const SAMPLE_OPENING: [&str; 5] = [
    "Good morning, everyone. Today we’re going to learn about reported speech.",
    "Let’s get started. Last time we looked at phrasal verbs.",
    "Before we begin, does everyone remember yesterday’s homework?",
    "Today’s goal is to practice speaking in pairs.",
    "By the end of this lesson, you will be able to use conditionals in real situations.",
];

pub const SAMPLE_GIVING_FEEDBACK: [&str; 5] = [
    "That’s a great idea. Can you say that one more time?",
    "Almost right. Let’s think about the verb tense here.",
    "I like how you used that word in your sentence.",
    "Turn to your partner and compare your answers together.",
    "Let’s check together. Who has a different answer?",
];

pub const SAMPLE_CLOSING: [&str; 5] = [
    "Before we finish, let’s quickly review what we learned today.",
    "For homework, please write five sentences using today’s expressions.",
    "Any questions before we wrap up?",
    "You did a nice job today. Thank you for your hard work.",
    "See you next time. Have a good day, everyone.",
];

static SAMPLE_TABLE: LazyLock<PhraseTable> = LazyLock::new(|| {
    PhraseTable::from_columns([
        (Situation::Opening.column_name(), SAMPLE_OPENING),
        (Situation::GivingFeedback.column_name(), SAMPLE_GIVING_FEEDBACK),
        (Situation::Closing.column_name(), SAMPLE_CLOSING),
    ])
});

static SAMPLE_CSV: LazyLock<Vec<u8>> = LazyLock::new(|| {
    let body = encode_table(&SAMPLE_TABLE).expect("sample table encodes into memory");
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(&body);
    bytes
});

/// The embedded sample table
pub fn sample_table() -> &'static PhraseTable {
    &SAMPLE_TABLE
}

/// Sample expressions for one situation
pub fn sample_expressions(situation: Situation) -> &'static [&'static str; 5] {
    match situation {
        Situation::Opening => &SAMPLE_OPENING,
        Situation::GivingFeedback => &SAMPLE_GIVING_FEEDBACK,
        Situation::Closing => &SAMPLE_CLOSING,
    }
}

/// Sample table as downloadable CSV: UTF-8 BOM followed by the CSV body
///
/// The output is identical on every call.
pub fn export_sample() -> Vec<u8> {
    SAMPLE_CSV.clone()
}
