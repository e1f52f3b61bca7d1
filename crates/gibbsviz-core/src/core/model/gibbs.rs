use super::magnetic;
use crate::core::expr::ast::{EvalContext, ExprError, GAS_CONSTANT};
use crate::core::tdb::database::{Database, MagneticHint, Parameter, ParameterKind};
use thiserror::Error;
use tracing::debug;

/// Pressure substituted into every evaluation, matching the fixed
/// P = 101325 Pa of the reference-state functions.
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

pub const VACANCY: &str = "VA";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Phase '{0}' not found in the database")]
    UnknownPhase(String),
    #[error("Phase '{phase}' has no sublattice mixing {element_a} and {element_b}")]
    NoMixingSublattice {
        phase: String,
        element_a: String,
        element_b: String,
    },
    #[error("Sublattice {sublattice} of phase '{phase}' has constituents outside the binary system")]
    UnsupportedConstituents { phase: String, sublattice: usize },
    #[error("Phase '{phase}' is missing the pure-{element} endmember parameter")]
    MissingEndmember { phase: String, element: String },
    #[error("Composition {0} is outside [0, 1]")]
    CompositionOutOfRange(f64),
    #[error("Expression evaluation failed: {source}")]
    Eval {
        #[from]
        source: ExprError,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Occupancy {
    /// Both elements substitute on this sublattice: y_a = x, y_b = 1 - x.
    Mixing,
    /// A single species fills the sublattice (VA interstitials, stoichiometric
    /// element sites).
    Pure(String),
}

#[derive(Debug, Clone)]
struct SiteModel {
    sites: f64,
    occupancy: Occupancy,
}

/// Molar Gibbs energy model for one phase of a binary substitutional system,
/// assembled from database parameters:
///
/// - endmember reference surface,
/// - ideal mixing entropy (with the exact y·ln y → 0 limit at the ends),
/// - Redlich-Kister excess terms,
/// - the Inden-Hillert-Jarl magnetic contribution where the phase declares one.
///
/// Energies are normalized to one mole of atoms; vacancies do not count.
pub struct GibbsModel<'a> {
    db: &'a Database,
    phase_name: String,
    element_a: String,
    element_b: String,
    sites: Vec<SiteModel>,
    gibbs: Vec<&'a Parameter>,
    curie: Vec<&'a Parameter>,
    moment: Vec<&'a Parameter>,
    magnetic: Option<MagneticHint>,
}

impl<'a> GibbsModel<'a> {
    pub fn from_database(
        db: &'a Database,
        phase: &str,
        elements: [&str; 2],
    ) -> Result<Self, ModelError> {
        let phase_name = phase.to_ascii_uppercase();
        let element_a = elements[0].to_ascii_uppercase();
        let element_b = elements[1].to_ascii_uppercase();

        let phase_def = db
            .phase(&phase_name)
            .ok_or_else(|| ModelError::UnknownPhase(phase_name.clone()))?;

        let mut sites = Vec::with_capacity(phase_def.sublattices.len());
        let mut has_mixing = false;
        for (index, sublattice) in phase_def.sublattices.iter().enumerate() {
            let constituents = &sublattice.constituents;
            let occupancy = if constituents.contains(&element_a)
                && constituents.contains(&element_b)
                && constituents.len() == 2
            {
                has_mixing = true;
                Occupancy::Mixing
            } else if constituents.len() == 1 {
                Occupancy::Pure(constituents[0].clone())
            } else {
                return Err(ModelError::UnsupportedConstituents {
                    phase: phase_name,
                    sublattice: index,
                });
            };
            sites.push(SiteModel {
                sites: sublattice.sites,
                occupancy,
            });
        }
        if !has_mixing {
            return Err(ModelError::NoMixingSublattice {
                phase: phase_name,
                element_a,
                element_b,
            });
        }

        let mut model = Self {
            db,
            phase_name,
            element_a,
            element_b,
            sites,
            gibbs: Vec::new(),
            curie: Vec::new(),
            moment: Vec::new(),
            magnetic: None,
        };
        model.magnetic = db.magnetic_hints(&model.phase_name);

        for parameter in db.parameters_for(&model.phase_name) {
            if !model.is_compatible(parameter) {
                debug!(
                    phase = %model.phase_name,
                    "Skipping parameter outside the binary subsystem"
                );
                continue;
            }
            match parameter.kind {
                ParameterKind::Gibbs => model.gibbs.push(parameter),
                ParameterKind::CurieTemperature => model.curie.push(parameter),
                ParameterKind::MagneticMoment => model.moment.push(parameter),
            }
        }

        for element in [&model.element_a, &model.element_b] {
            if !model.has_endmember(element) {
                return Err(ModelError::MissingEndmember {
                    phase: model.phase_name,
                    element: element.clone(),
                });
            }
        }

        Ok(model)
    }

    pub fn phase_name(&self) -> &str {
        &self.phase_name
    }

    /// Molar Gibbs energy in J/mol of atoms at mole fraction `x` of the
    /// first element and temperature `temperature` in K.
    pub fn molar_gibbs(&self, x: f64, temperature: f64) -> Result<f64, ModelError> {
        if !(0.0..=1.0).contains(&x) {
            return Err(ModelError::CompositionOutOfRange(x));
        }
        let ctx =
            EvalContext::with_functions(temperature, STANDARD_PRESSURE_PA, &self.db.functions);

        let mut energy = 0.0;
        for parameter in &self.gibbs {
            let weight = self.weight(parameter, x);
            if weight != 0.0 {
                energy += weight * parameter.expr.eval_at(temperature, &ctx)?;
            }
        }

        let mut entropy_sum = 0.0;
        for site in &self.sites {
            if site.occupancy == Occupancy::Mixing {
                entropy_sum += site.sites * (xlnx(x) + xlnx(1.0 - x));
            }
        }
        energy += GAS_CONSTANT * temperature * entropy_sum;

        energy += self.magnetic_energy(x, temperature, &ctx)?;

        Ok(energy / self.moles_of_atoms())
    }

    fn magnetic_energy(
        &self,
        x: f64,
        temperature: f64,
        ctx: &EvalContext,
    ) -> Result<f64, ModelError> {
        let Some(hint) = self.magnetic else {
            return Ok(0.0);
        };
        if self.curie.is_empty() {
            return Ok(0.0);
        }
        let mut curie_temperature = 0.0;
        for parameter in &self.curie {
            curie_temperature +=
                self.weight(parameter, x) * parameter.expr.eval_at(temperature, ctx)?;
        }
        let mut moment = 0.0;
        for parameter in &self.moment {
            moment += self.weight(parameter, x) * parameter.expr.eval_at(temperature, ctx)?;
        }
        Ok(magnetic::inden_energy(
            temperature,
            curie_temperature,
            moment,
            hint.afm_factor,
            hint.structure_factor,
        ))
    }

    /// Product of site fractions (and the Redlich-Kister composition factor
    /// for interaction slots) selecting how much a parameter contributes.
    fn weight(&self, parameter: &Parameter, x: f64) -> f64 {
        let mut weight = 1.0;
        for (slot, site) in parameter.constituents.iter().zip(&self.sites) {
            match slot.as_slice() {
                [species] => weight *= self.site_fraction(site, species, x),
                [first, second] => {
                    let y1 = self.site_fraction(site, first, x);
                    let y2 = self.site_fraction(site, second, x);
                    weight *= y1 * y2 * (y1 - y2).powi(parameter.order as i32);
                }
                _ => return 0.0,
            }
        }
        weight
    }

    fn site_fraction(&self, site: &SiteModel, species: &str, x: f64) -> f64 {
        match &site.occupancy {
            Occupancy::Mixing => {
                if species == self.element_a {
                    x
                } else {
                    1.0 - x
                }
            }
            Occupancy::Pure(occupant) => {
                if species == occupant {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn moles_of_atoms(&self) -> f64 {
        self.sites
            .iter()
            .map(|site| match &site.occupancy {
                Occupancy::Mixing => site.sites,
                Occupancy::Pure(occupant) if occupant != VACANCY => site.sites,
                Occupancy::Pure(_) => 0.0,
            })
            .sum()
    }

    fn is_compatible(&self, parameter: &Parameter) -> bool {
        if parameter.constituents.len() != self.sites.len() {
            return false;
        }
        parameter
            .constituents
            .iter()
            .zip(&self.sites)
            .all(|(slot, site)| match (&site.occupancy, slot.as_slice()) {
                (Occupancy::Mixing, [species]) => {
                    species == &self.element_a || species == &self.element_b
                }
                (Occupancy::Mixing, [first, second]) => {
                    (first == &self.element_a && second == &self.element_b)
                        || (first == &self.element_b && second == &self.element_a)
                }
                (Occupancy::Pure(occupant), [species]) => species == occupant,
                _ => false,
            })
    }

    fn has_endmember(&self, element: &str) -> bool {
        self.gibbs.iter().any(|parameter| {
            parameter
                .constituents
                .iter()
                .zip(&self.sites)
                .all(|(slot, site)| match &site.occupancy {
                    Occupancy::Mixing => slot.len() == 1 && slot[0] == element,
                    Occupancy::Pure(_) => slot.len() == 1,
                })
        })
    }
}

/// y·ln y with its exact limit of 0 as y → 0, so grid endpoints at pure
/// compositions stay finite.
fn xlnx(y: f64) -> f64 {
    if y <= 0.0 { 0.0 } else { y * y.ln() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tdb::database::Database;

    const BINARY_LIQUID: &str = r#"
ELEMENT A LIQ 1.0 0.0 0.0 !
ELEMENT B LIQ 1.0 0.0 0.0 !
PHASE LIQUID % 1 1.0 !
CONSTITUENT LIQUID :A,B: !
PARAMETER G(LIQUID,A;0) 298.15 -1000; 6000 N !
PARAMETER G(LIQUID,B;0) 298.15 -2000+2*T; 6000 N !
PARAMETER L(LIQUID,A,B;0) 298.15 -5000; 6000 N !
PARAMETER L(LIQUID,A,B;1) 298.15 +800; 6000 N !
"#;

    const SUBLATTICE_SOLID: &str = r#"
ELEMENT A SOL 1.0 0.0 0.0 !
ELEMENT B SOL 1.0 0.0 0.0 !
TYPE_DEFINITION & GES A_P_D SOLID MAGNETIC -1.0 0.40 !
PHASE SOLID %& 2 1 3 !
CONSTITUENT SOLID :A,B:VA: !
PARAMETER G(SOLID,A:VA;0) 298.15 -1000; 6000 N !
PARAMETER G(SOLID,B:VA;0) 298.15 -2000; 6000 N !
PARAMETER TC(SOLID,A:VA;0) 298.15 1043; 6000 N !
PARAMETER BMAGN(SOLID,A:VA;0) 298.15 2.22; 6000 N !
"#;

    #[test]
    fn molar_gibbs_matches_the_hand_computed_value() {
        let db = Database::parse(BINARY_LIQUID).unwrap();
        let model = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]).unwrap();

        let x: f64 = 0.25;
        let t = 1000.0;
        let g_a = -1000.0;
        let g_b = -2000.0 + 2.0 * t;
        let ideal = GAS_CONSTANT * t * (x * x.ln() + 0.75 * 0.75_f64.ln());
        let excess = x * 0.75 * (-5000.0 + 800.0 * (x - 0.75));
        let expected = x * g_a + 0.75 * g_b + ideal + excess;

        let value = model.molar_gibbs(x, t).unwrap();
        assert!((value - expected).abs() < 1e-9, "got {value}, want {expected}");
    }

    #[test]
    fn pure_compositions_stay_finite() {
        let db = Database::parse(BINARY_LIQUID).unwrap();
        let model = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]).unwrap();

        let at_zero = model.molar_gibbs(0.0, 1000.0).unwrap();
        let at_one = model.molar_gibbs(1.0, 1000.0).unwrap();
        assert!(at_zero.is_finite());
        assert!(at_one.is_finite());
        // Endmember values: pure B and pure A respectively.
        assert!((at_zero - 0.0).abs() < 1e-9);
        assert!((at_one - (-1000.0)).abs() < 1e-9);
    }

    #[test]
    fn mixing_lowers_the_energy_below_the_linear_interpolation() {
        let db = Database::parse(BINARY_LIQUID).unwrap();
        let model = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]).unwrap();

        let t = 1000.0;
        let ends = 0.5 * model.molar_gibbs(0.0, t).unwrap() + 0.5 * model.molar_gibbs(1.0, t).unwrap();
        let middle = model.molar_gibbs(0.5, t).unwrap();
        assert!(middle < ends);
    }

    #[test]
    fn vacancy_sublattice_does_not_count_toward_moles_of_atoms() {
        let db = Database::parse(SUBLATTICE_SOLID).unwrap();
        let model = GibbsModel::from_database(&db, "SOLID", ["A", "B"]).unwrap();

        // One mixing site plus three vacancy sites: still one mole of atoms,
        // so the pure-A endmember evaluates to its parameter plus magnetism.
        let value = model.molar_gibbs(1.0, 2000.0).unwrap();
        // Far above TC the magnetic term is small.
        assert!((value - (-1000.0)).abs() < 20.0);
    }

    #[test]
    fn magnetic_contribution_is_negative_below_the_curie_point() {
        let db = Database::parse(SUBLATTICE_SOLID).unwrap();
        let model = GibbsModel::from_database(&db, "SOLID", ["A", "B"]).unwrap();

        let cold = model.molar_gibbs(1.0, 300.0).unwrap();
        // Without magnetism the endmember would sit at exactly -1000.
        assert!(cold < -1000.0);
    }

    #[test]
    fn unknown_phase_is_rejected() {
        let db = Database::parse(BINARY_LIQUID).unwrap();
        let result = GibbsModel::from_database(&db, "FCC_A1", ["A", "B"]);
        assert!(matches!(result, Err(ModelError::UnknownPhase(_))));
    }

    #[test]
    fn phase_without_both_elements_is_rejected() {
        let db = Database::parse(
            "ELEMENT A X 1 0 0 !\nELEMENT C X 1 0 0 !\nPHASE P % 1 1.0 !\nCONSTITUENT P :A,C: !",
        )
        .unwrap();
        let result = GibbsModel::from_database(&db, "P", ["A", "B"]);
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedConstituents { .. })
        ));
    }

    #[test]
    fn missing_endmember_is_rejected() {
        let db = Database::parse(
            "PHASE LIQUID % 1 1.0 !\nCONSTITUENT LIQUID :A,B: !\nPARAMETER G(LIQUID,A;0) 298.15 -1; 6000 N !",
        )
        .unwrap();
        let result = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]);
        assert!(matches!(
            result,
            Err(ModelError::MissingEndmember { element, .. }) if element == "B"
        ));
    }

    #[test]
    fn composition_outside_the_unit_interval_is_rejected() {
        let db = Database::parse(BINARY_LIQUID).unwrap();
        let model = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]).unwrap();
        assert!(matches!(
            model.molar_gibbs(1.2, 1000.0),
            Err(ModelError::CompositionOutOfRange(_))
        ));
    }

    #[test]
    fn ternary_interaction_parameters_are_ignored() {
        let source = format!("{BINARY_LIQUID}\nPARAMETER L(LIQUID,A,B,C;0) 298.15 +1E6; 6000 N !");
        let db = Database::parse(&source).unwrap();
        let model = GibbsModel::from_database(&db, "LIQUID", ["A", "B"]).unwrap();
        // The bogus huge ternary term must not leak into the binary energy.
        let value = model.molar_gibbs(0.5, 1000.0).unwrap();
        assert!(value < 0.0);
    }
}
