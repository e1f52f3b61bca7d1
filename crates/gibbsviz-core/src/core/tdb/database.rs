use super::lexer;
use super::parser;
use crate::core::expr::ast::Piecewise;
use crate::core::expr::parser::ExprParseError;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TdbError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed {keyword} statement at line {line}: {message}")]
    Statement {
        keyword: &'static str,
        line: usize,
        message: String,
    },
    #[error("Expression error at line {line}: {source}")]
    Expression {
        line: usize,
        source: ExprParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub reference_phase: String,
    pub mass: f64,
    pub h298: f64,
    pub s298: f64,
}

/// One sublattice of a phase: its stoichiometric site count and the species
/// allowed to occupy it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sublattice {
    pub sites: f64,
    pub constituents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub name: String,
    pub type_codes: String,
    pub sublattices: Vec<Sublattice>,
}

/// Parameter symbols the model layer consumes. `G` and `L` both map to
/// [`ParameterKind::Gibbs`]; TC/BMAGN feed the magnetic contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Gibbs,
    CurieTemperature,
    MagneticMoment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub phase: String,
    /// One slot per sublattice; interaction slots hold the interacting
    /// species in database order.
    pub constituents: Vec<Vec<String>>,
    /// Redlich-Kister order.
    pub order: u32,
    pub expr: Piecewise,
}

/// Magnetic model hints from a `TYPE_DEFINITION ... MAGNETIC` statement:
/// the antiferromagnetic factor and the structure factor `p` of the
/// Inden-Hillert-Jarl model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticHint {
    pub afm_factor: f64,
    pub structure_factor: f64,
}

/// An in-memory CALPHAD thermodynamic database.
#[derive(Debug, Default)]
pub struct Database {
    pub elements: HashMap<String, Element>,
    pub functions: HashMap<String, Piecewise>,
    pub phases: HashMap<String, Phase>,
    pub parameters: Vec<Parameter>,
    pub magnetic: HashMap<String, MagneticHint>,
    diagnostics: Vec<String>,
}

impl Database {
    pub fn load(path: &Path) -> Result<Self, TdbError> {
        let content = std::fs::read_to_string(path).map_err(|e| TdbError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(input: &str) -> Result<Self, TdbError> {
        let statements = lexer::split_statements(input);
        parser::parse_statements(&statements)
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(&name.to_ascii_uppercase())
    }

    pub fn function(&self, name: &str) -> Option<&Piecewise> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    pub fn parameters_for(&self, phase: &str) -> impl Iterator<Item = &Parameter> {
        let phase = phase.to_ascii_uppercase();
        self.parameters.iter().filter(move |p| p.phase == phase)
    }

    pub fn magnetic_hints(&self, phase: &str) -> Option<MagneticHint> {
        self.magnetic.get(&phase.to_ascii_uppercase()).copied()
    }

    /// Non-fatal notes collected while parsing (skipped statements,
    /// unsupported parameter symbols).
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub(super) fn push_diagnostic(&mut self, note: String) {
        self.diagnostics.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FIXTURE: &str = r#"
$ Minimal two-element fixture.
ELEMENT VA   VACUUM            0.0000E+00  0.0000E+00  0.0000E+00 !
ELEMENT FE   BCC_A2            5.5847E+01  4.4890E+03  2.7280E+01 !
ELEMENT NI   FCC_A1            5.8690E+01  4.7870E+03  2.9796E+01 !

FUNCTION GHSERFE 298.15 +1225.7+124.134*T-23.5143*T*LN(T); 1811.00 Y
 -25383.581+299.31255*T-46*T*LN(T); 6000.00 N !

TYPE_DEFINITION % SEQ * !
TYPE_DEFINITION & GES A_P_D BCC_A2 MAGNETIC -1.0 0.40 !

PHASE LIQUID:L % 1 1.0 !
CONSTITUENT LIQUID:L :FE,NI: !

PHASE BCC_A2 %& 2 1 3 !
CONSTITUENT BCC_A2 :FE,NI%:VA: !

PARAMETER G(BCC_A2,FE:VA;0) 298.15 +GHSERFE; 6000 N !
PARAMETER L(BCC_A2,FE,NI:VA;0) 298.15 -956.63-1.28726*T; 6000 N 91DIN !
PARAMETER TC(BCC_A2,FE:VA;0) 298.15 1043; 6000 N !
"#;

    #[test]
    fn load_succeeds_from_a_file_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.tdb");
        fs::write(&path, FIXTURE).unwrap();

        let db = Database::load(&path).unwrap();
        assert_eq!(db.elements.len(), 3);
        assert_eq!(db.phases.len(), 2);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist.tdb");
        let result = Database::load(&path);
        assert!(matches!(result, Err(TdbError::Io { .. })));
    }

    #[test]
    fn accessors_are_case_insensitive() {
        let db = Database::parse(FIXTURE).unwrap();
        assert!(db.phase("bcc_a2").is_some());
        assert!(db.function("ghserfe").is_some());
        assert!(db.magnetic_hints("bcc_a2").is_some());
    }

    #[test]
    fn parameters_for_filters_by_phase() {
        let db = Database::parse(FIXTURE).unwrap();
        assert_eq!(db.parameters_for("BCC_A2").count(), 3);
        assert_eq!(db.parameters_for("LIQUID").count(), 0);
    }
}
