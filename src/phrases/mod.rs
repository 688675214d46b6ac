// Phrases Module
// Situations, the phrase table, the built-in sample and the CSV codec

pub mod codec;
pub mod sample;
pub mod table;

pub use codec::{encode_table, parse_table, CodecError, UTF8_BOM};
pub use sample::{
    export_sample, sample_expressions, sample_table, SAMPLE_FILE_NAME, SAMPLE_MEDIA_TYPE,
};
pub use table::{ParseSituationError, PhraseTable, Situation};
