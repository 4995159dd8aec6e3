//! Namibian national ID field parser
//!
//! Raw OCR text goes through [`clean_text`], then [`IdFieldParser::parse`]
//! recovers the ID number (and the birth date it embeds), surname and given
//! names into an [`ExtractionResult`].

mod id_number;
mod parser;
mod text;

pub use id_number::{
    format_id_number, BirthDate, CenturyRule, IdNumberBreakdown, InvalidCenturyCutoff,
    ID_NUMBER_LEN,
};
pub use parser::{
    extract_given_names, extract_surname, fields, ExtractionResult, FieldValue, GivenNames,
    IdFieldParser, DEFAULT_COUNTRY,
};
pub use text::clean_text;
