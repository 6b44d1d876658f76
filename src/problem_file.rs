//! TOML problem loader: turns a `.toml` file into a `Problem` (spec.md §3),
//! using the same serde + toml pairing as `config.rs`. This module never
//! parses or type-checks the target language itself - the program and
//! context-binding text are carried as opaque strings, the same way
//! `Expression` does everywhere else; a real embedding is expected to shell
//! them through `Oracle::parse_expr` before use if it needs a validated AST.
//!
//! ```toml
//! type = "[Int] -> Int"
//! program = "foldl (-) zero"
//! properties = ["prop_isSum"]
//!
//! [[context]]
//! name = "zero"
//! definition = "0"
//!
//! [repair_site]
//! start = 0
//! end = 14
//! ```
//!
//! `repair_site` is optional; omitting it designates the whole program as
//! the repair site.

use crate::domain::{ContextBinding, Expression, Problem, PropertyName, SourceSpan, TypeSig};
use crate::error::{FixsynthError, FixsynthResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ProblemFile {
    #[serde(rename = "type")]
    ty: String,
    program: String,
    #[serde(default)]
    repair_site: Option<RepairSiteSpec>,
    #[serde(default)]
    context: Vec<ContextEntry>,
    #[serde(default)]
    properties: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RepairSiteSpec {
    start: u32,
    end: u32,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    name: String,
    definition: String,
}

/// Load and parse a problem file from disk.
pub fn load_problem(path: &Path) -> FixsynthResult<Problem> {
    let content = fs::read_to_string(path).map_err(|e| FixsynthError::ProblemFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_problem_toml(&content).map_err(|reason| FixsynthError::ProblemFile {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_problem_toml(content: &str) -> Result<Problem, String> {
    let file: ProblemFile = toml::from_str(content).map_err(|e| e.to_string())?;

    let program_len = file.program.len() as u32;
    let repair_site = match file.repair_site {
        Some(spec) => {
            let span = SourceSpan::new(spec.start, spec.end);
            if spec.end > program_len {
                return Err(format!(
                    "repair_site end ({}) is past the end of program ({} bytes)",
                    spec.end, program_len
                ));
            }
            span
        }
        None => SourceSpan::new(0, program_len),
    };

    let context = file
        .context
        .into_iter()
        .map(|c| ContextBinding::new(c.name, Expression::new(c.definition)))
        .collect();
    let properties = file.properties.into_iter().map(PropertyName::new).collect();

    Ok(Problem::new(
        Expression::new(file.program),
        repair_site,
        TypeSig::new(file.ty),
        properties,
        context,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_problem() {
        let toml = r#"
            type = "[Int] -> Int"
            program = "foldl (-) zero"
            properties = ["prop_isSum"]

            [[context]]
            name = "zero"
            definition = "0"
        "#;
        let problem = parse_problem_toml(toml).unwrap();
        assert_eq!(problem.program.text(), "foldl (-) zero");
        assert_eq!(problem.ty.0, "[Int] -> Int");
        assert_eq!(problem.properties, vec![PropertyName::new("prop_isSum")]);
        assert_eq!(problem.context.len(), 1);
        assert_eq!(problem.repair_site, SourceSpan::new(0, 14));
    }

    #[test]
    fn explicit_repair_site_is_honored() {
        let toml = r#"
            type = "Int -> Int -> Int"
            program = "foldl (-) zero"

            [repair_site]
            start = 6
            end = 9
        "#;
        let problem = parse_problem_toml(toml).unwrap();
        assert_eq!(problem.repair_site, SourceSpan::new(6, 9));
    }

    #[test]
    fn repair_site_past_the_program_is_rejected() {
        let toml = r#"
            type = "Int"
            program = "zero"

            [repair_site]
            start = 0
            end = 99
        "#;
        assert!(parse_problem_toml(toml).is_err());
    }

    #[test]
    fn missing_file_is_a_problem_file_error() {
        let err = load_problem(Path::new("/nonexistent/path/to/problem.toml")).unwrap_err();
        assert!(matches!(err, FixsynthError::ProblemFile { .. }));
    }
}
