use crate::core::expr::ast::GAS_CONSTANT;

/// Magnetic ordering contribution to the molar Gibbs energy after
/// Inden-Hillert-Jarl, as used by the standard CALPHAD magnetic model:
///
///   G_mag = R·T·ln(β + 1)·g(τ),  τ = T / TC
///
/// `afm_factor` is the antiferromagnetic normalization from the phase's
/// TYPE_DEFINITION (-1 for BCC, -3 for FCC): negative TC and β describe an
/// antiferromagnet and are divided by it before use.
pub fn inden_energy(
    temperature: f64,
    mut curie_temperature: f64,
    mut magnetic_moment: f64,
    afm_factor: f64,
    structure_factor: f64,
) -> f64 {
    if curie_temperature < 0.0 {
        if afm_factor >= 0.0 {
            return 0.0;
        }
        curie_temperature /= afm_factor;
        magnetic_moment /= afm_factor;
    }
    if curie_temperature <= 0.0 || magnetic_moment <= -1.0 || temperature <= 0.0 {
        return 0.0;
    }
    let tau = temperature / curie_temperature;
    GAS_CONSTANT * temperature * (magnetic_moment + 1.0).ln() * g_tau(tau, structure_factor)
}

/// The Hillert-Jarl polynomial g(τ). `p` is the fraction of the magnetic
/// enthalpy absorbed above the Curie temperature (0.40 for BCC, 0.28 for FCC).
pub fn g_tau(tau: f64, p: f64) -> f64 {
    let d = 518.0 / 1125.0 + (11692.0 / 15975.0) * (1.0 / p - 1.0);
    if tau < 1.0 {
        let series = tau.powi(3) / 6.0 + tau.powi(9) / 135.0 + tau.powi(15) / 600.0;
        1.0 - (79.0 / (140.0 * p * tau) + (474.0 / 497.0) * (1.0 / p - 1.0) * series) / d
    } else {
        -(tau.powi(-5) / 10.0 + tau.powi(-15) / 315.0 + tau.powi(-25) / 1500.0) / d
    }
}
