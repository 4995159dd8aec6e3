//! Accredited-institution reference list

use std::path::Path;

const DEFAULT_INSTITUTIONS: &[&str] = &[
    "University of Cape Town",
    "University of the Witwatersrand",
    "Stellenbosch University",
    "University of Pretoria",
    "Rhodes University",
    "Goethe Institute",
    "TestDaF Institute",
    "TELC",
    "Cambridge Assessment English",
    "British Council",
];

/// Read-only list of institution names, matched by case-insensitive containment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccreditedInstitutions {
    /// (canonical name, lowercased name)
    names: Vec<(String, String)>,
}

impl AccreditedInstitutions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .map(|name| {
                let lower = name.to_lowercase();
                (name, lower)
            })
            .collect();
        Self { names }
    }

    /// Load a newline-separated list; blank lines and `#` comments are ignored
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let list = Self::new(
            contents
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        );
        tracing::info!("Loaded {} accredited institutions from {:?}", list.len(), path);
        Ok(list)
    }

    /// Canonical name of the first listed institution contained in any haystack
    pub fn find_in(&self, haystacks: &[&str]) -> Option<&str> {
        let lowered: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();
        self.names
            .iter()
            .find(|(_, lower)| lowered.iter().any(|h| h.contains(lower.as_str())))
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for AccreditedInstitutions {
    fn default() -> Self {
        Self::new(DEFAULT_INSTITUTIONS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_list() {
        let list = AccreditedInstitutions::default();
        assert_eq!(list.len(), 10);
        assert!(list.names().any(|name| name == "British Council"));
    }

    #[test]
    fn test_find_is_case_insensitive_and_canonical() {
        let list = AccreditedInstitutions::default();
        let found = list.find_in(&["Awarded by the UNIVERSITY OF CAPE TOWN in 2020"]);
        assert_eq!(found, Some("University of Cape Town"));
    }

    #[test]
    fn test_find_checks_every_haystack() {
        let list = AccreditedInstitutions::default();
        assert_eq!(list.find_in(&["no match here", "telc gmbh"]), Some("TELC"));
        assert_eq!(list.find_in(&["Windhoek Technical College"]), None);
    }

    #[test]
    fn test_from_file_skips_blanks_and_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# accredited bodies").unwrap();
        writeln!(file, "University of Namibia").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  Namibia University of Science and Technology  ").unwrap();

        let list = AccreditedInstitutions::from_file(file.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.find_in(&["namibia university of science and technology"]),
            Some("Namibia University of Science and Technology")
        );
    }
}
