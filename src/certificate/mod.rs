//! Certificate parsing, authenticity scoring and verification helpers

mod accreditation;
pub mod authenticity;
mod parser;
mod verification;

pub use accreditation::AccreditedInstitutions;
pub use authenticity::AuthenticityReport;
pub use parser::{CertificateKind, CertificateParser, CertificateRecord, VerificationFlags};
pub use verification::{verify_german_certificate, verify_name_match, GermanVerification, NameMatch};
