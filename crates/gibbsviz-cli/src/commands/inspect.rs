use crate::cli::InspectArgs;
use crate::error::Result;
use gibbsviz::core::expr::Piecewise;
use gibbsviz::core::tdb::{Database, Phase};
use tracing::{instrument, warn};

#[instrument(skip_all, name = "inspect_command")]
pub fn run(args: InspectArgs) -> Result<()> {
    let db = Database::load(&args.database)?;
    for note in db.diagnostics() {
        warn!("{}", note);
    }

    println!("Database: {}", args.database.display());
    println!();

    let mut elements: Vec<_> = db.elements.values().collect();
    elements.sort_by(|a, b| a.name.cmp(&b.name));
    println!("Elements ({}):", elements.len());
    for element in elements {
        println!(
            "  {:<4} ref. phase {:<12} mass {:.4}",
            element.name, element.reference_phase, element.mass
        );
    }
    println!();

    println!("Functions: {}", db.functions.len());
    println!();

    let mut phases: Vec<_> = db.phases.values().collect();
    phases.sort_by(|a, b| a.name.cmp(&b.name));
    println!("Phases ({}):", phases.len());
    for phase in phases {
        let parameters = db.parameters_for(&phase.name).count();
        println!("{}", format_phase(phase, parameters));
        if let Some(hint) = db.magnetic_hints(&phase.name) {
            println!(
                "        magnetic: p = {}, AFM factor = {}",
                hint.structure_factor, hint.afm_factor
            );
        }
    }

    if args.functions {
        println!();
        let mut functions: Vec<_> = db.functions.iter().collect();
        functions.sort_by(|a, b| a.0.cmp(b.0));
        println!("Functions ({}):", functions.len());
        for (name, piecewise) in functions {
            println!("{}", format_function(name, piecewise));
        }
    }

    Ok(())
}

fn format_phase(phase: &Phase, parameters: usize) -> String {
    let sublattices = phase
        .sublattices
        .iter()
        .map(|s| format!("{}({})", s.sites, s.constituents.join(",")))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "  {:<12} {} [{} parameters]",
        phase.name, sublattices, parameters
    )
}

fn format_function(name: &str, piecewise: &Piecewise) -> String {
    let (lower, upper) = piecewise.range();
    format!(
        "  {:<12} {} K to {} K, {} branch(es)",
        name,
        lower,
        upper,
        piecewise.branches().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gibbsviz::core::expr::{self, Branch};
    use gibbsviz::core::tdb::Sublattice;

    #[test]
    fn phase_line_lists_sublattices_and_parameter_count() {
        let phase = Phase {
            name: "BCC_A2".to_string(),
            type_codes: "%&".to_string(),
            sublattices: vec![
                Sublattice {
                    sites: 1.0,
                    constituents: vec!["FE".to_string(), "NI".to_string()],
                },
                Sublattice {
                    sites: 3.0,
                    constituents: vec!["VA".to_string()],
                },
            ],
        };
        let line = format_phase(&phase, 7);
        assert!(line.contains("BCC_A2"));
        assert!(line.contains("1(FE,NI)"));
        assert!(line.contains("3(VA)"));
        assert!(line.contains("[7 parameters]"));
    }

    #[test]
    fn function_line_shows_the_temperature_range() {
        let piecewise = Piecewise::new(vec![
            Branch {
                t_lower: 298.15,
                t_upper: 1811.0,
                expr: expr::parse("+100*T").unwrap(),
            },
            Branch {
                t_lower: 1811.0,
                t_upper: 6000.0,
                expr: expr::parse("-50*T").unwrap(),
            },
        ])
        .unwrap();
        let line = format_function("GHSERFE", &piecewise);
        assert!(line.contains("GHSERFE"));
        assert!(line.contains("298.15 K"));
        assert!(line.contains("6000 K"));
        assert!(line.contains("2 branch(es)"));
    }
}
