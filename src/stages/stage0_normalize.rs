use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Letterhead, footer, metadata and signature lines left behind by the
/// PDF conversion
static BOILERPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"<!-- image -->",
        r"H\. SAO JOAO ALAMEDA",
        r"Tel\. :",
        r"Email:",
        r"Data de Criação",
        r"Data de Bloqueio",
        r"Versão",
        r"Criado por",
        r"Local :",
        r"\\_\\_",
        r"_ _ _ _",
        r"-----",
        r"- - - -",
        r"O\(A\) Médico",
        r"PORTO,",
        r"código de barras",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid boilerplate regex"))
    .collect()
});

/// Result of Stage 0 normalization for one section document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSection {
    /// Kept lines, in input order
    pub lines: Vec<String>,
    /// Lines dropped as boilerplate or separators
    pub boilerplate_removed: usize,
    /// Lines dropped as repeats of an earlier kept line
    pub duplicates_removed: usize,
}

impl NormalizedSection {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Perform Stage 0: clean one raw section document
///
/// Per line:
/// 1. Trim and demote markdown headers to plain text
/// 2. Drop boilerplate and separator-only lines
/// 3. Drop empty lines
/// 4. Drop exact repeats of a line already kept in this document
///
/// Header demotion runs before dedup so `## Foo` and `Foo` count as the same
/// line; that keeps the operation idempotent.
pub fn normalize_lines<'a, I>(lines: I) -> NormalizedSection
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = NormalizedSection::default();

    for raw in lines {
        let line = demote_header(raw.trim());

        if is_boilerplate(line) {
            result.boilerplate_removed += 1;
            continue;
        }

        if line.is_empty() {
            continue;
        }

        if !seen.insert(line.to_string()) {
            result.duplicates_removed += 1;
            continue;
        }

        result.lines.push(line.to_string());
    }

    result
}

/// Normalize a whole document's text
pub fn normalize(text: &str) -> NormalizedSection {
    normalize_lines(text.lines())
}

/// Strip leading `#` markers
fn demote_header(line: &str) -> &str {
    if line.starts_with('#') {
        line.trim_start_matches(|c: char| c == '#' || c.is_whitespace())
    } else {
        line
    }
}

fn is_separator(line: &str) -> bool {
    !line.is_empty()
        && line.chars().any(|c| c == '-' || c == '_')
        && line
            .chars()
            .all(|c| c == '-' || c == '_' || c == '\\' || c.is_whitespace())
}

fn is_boilerplate(line: &str) -> bool {
    is_separator(line) || BOILERPLATE_PATTERNS.iter().any(|re| re.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_boilerplate() {
        let input = "Tel. : 123\nPaciente XYZ\nQueimadura facial\nPaciente XYZ\n";

        let result = normalize(input);

        assert_eq!(result.lines, vec!["Paciente XYZ", "Queimadura facial"]);
        assert_eq!(result.boilerplate_removed, 1);
        assert_eq!(result.duplicates_removed, 1);
        assert!(!result.text().contains("Tel. : 123"));
    }

    #[test]
    fn test_separators_removed() {
        let input = "a\n-----\n_ _ _ _\n- - -\n___\n\\_\\_\\_\nb";
        let result = normalize(input);
        assert_eq!(result.lines, vec!["a", "b"]);
    }

    #[test]
    fn test_header_demoted() {
        let input = "## Diagnóstico\nDiagnóstico\n# Notas  \n   texto   ";
        let result = normalize(input);
        assert_eq!(result.lines, vec!["Diagnóstico", "Notas", "texto"]);
    }

    #[test]
    fn test_header_only_line_dropped() {
        let result = normalize("##\n###   \nx");
        assert_eq!(result.lines, vec!["x"]);
    }

    #[test]
    fn test_boilerplate_header_dropped() {
        let result = normalize("## Criado por: Dr. X\nconteúdo");
        assert_eq!(result.lines, vec!["conteúdo"]);
    }

    #[test]
    fn test_empty_lines_removed() {
        let result = normalize("\n\n  \na\n\t\nb\n");
        assert_eq!(result.lines, vec!["a", "b"]);
    }

    #[test]
    fn test_order_preserved() {
        let result = normalize("c\nb\na\nb");
        assert_eq!(result.lines, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_dedup_scoped_per_document() {
        let first = normalize("Paciente XYZ");
        let second = normalize("Paciente XYZ");
        assert_eq!(first.lines, second.lines);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Tel. : 123\nPaciente XYZ\nPaciente XYZ\n## Paciente XYZ\n",
            "# A\nA\n#B\n - - - - \nEmail: x@y\nH. SAO JOAO ALAMEDA\n  C  \nC",
            "<!-- image -->\n## ## nested\n\n\nPORTO, 12\nfim",
            "",
        ];

        for input in inputs {
            let once = normalize(input);
            let twice = normalize_lines(once.lines.iter().map(String::as_str));
            assert_eq!(once.lines, twice.lines, "input: {:?}", input);
        }
    }
}
