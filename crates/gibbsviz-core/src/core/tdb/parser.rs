use super::database::{
    Database, Element, MagneticHint, Parameter, ParameterKind, Phase, Sublattice, TdbError,
};
use super::keywords::{self, Keyword};
use super::lexer::Statement;
use crate::core::expr::ast::{Branch, Piecewise};
use crate::core::expr::parser as expr_parser;
use tracing::debug;

pub(super) fn parse_statements(statements: &[Statement]) -> Result<Database, TdbError> {
    let mut db = Database::default();

    for statement in statements {
        let Some(first) = statement.tokens.first() else {
            continue;
        };
        match keywords::lookup(first) {
            Some(Keyword::Element) => parse_element(&mut db, statement)?,
            Some(Keyword::Function) => parse_function(&mut db, statement)?,
            Some(Keyword::TypeDefinition) => parse_type_definition(&mut db, statement),
            Some(Keyword::Phase) => parse_phase(&mut db, statement)?,
            Some(Keyword::Constituent) => parse_constituent(&mut db, statement)?,
            Some(Keyword::Parameter) => parse_parameter(&mut db, statement)?,
            Some(Keyword::Species) | Some(Keyword::Ignored) => {
                debug!(line = statement.line, command = %first, "Skipping command without thermodynamic content");
            }
            None => {
                db.push_diagnostic(format!(
                    "line {}: skipped unknown command '{}'",
                    statement.line, first
                ));
            }
        }
    }

    Ok(db)
}

fn statement_error(keyword: &'static str, line: usize, message: impl Into<String>) -> TdbError {
    TdbError::Statement {
        keyword,
        line,
        message: message.into(),
    }
}

fn parse_f64(token: &str, keyword: &'static str, line: usize) -> Result<f64, TdbError> {
    token
        .parse::<f64>()
        .map_err(|_| statement_error(keyword, line, format!("expected a number, found '{token}'")))
}

/// Strips the display suffix from a phase name (`LIQUID:L` names the phase
/// `LIQUID`) and normalizes case.
fn phase_name(token: &str) -> String {
    let name = token.split_once(':').map_or(token, |(head, _)| head);
    name.to_ascii_uppercase()
}

fn parse_element(db: &mut Database, statement: &Statement) -> Result<(), TdbError> {
    let t = &statement.tokens;
    if t.len() < 6 {
        return Err(statement_error(
            "ELEMENT",
            statement.line,
            "expected name, reference phase, mass, H298 and S298",
        ));
    }
    let element = Element {
        name: t[1].to_ascii_uppercase(),
        reference_phase: t[2].to_ascii_uppercase(),
        mass: parse_f64(&t[3], "ELEMENT", statement.line)?,
        h298: parse_f64(&t[4], "ELEMENT", statement.line)?,
        s298: parse_f64(&t[5], "ELEMENT", statement.line)?,
    };
    db.elements.insert(element.name.clone(), element);
    Ok(())
}

fn parse_function(db: &mut Database, statement: &Statement) -> Result<(), TdbError> {
    let t = &statement.tokens;
    if t.len() < 4 {
        return Err(statement_error(
            "FUNCTION",
            statement.line,
            "expected a name followed by a piecewise expression",
        ));
    }
    let name = t[1].to_ascii_uppercase();
    let piecewise = parse_piecewise(&t[2..], "FUNCTION", statement.line)?;
    db.functions.insert(name, piecewise);
    Ok(())
}

fn parse_type_definition(db: &mut Database, statement: &Statement) {
    let t = &statement.tokens;
    // Only `GES A_P_D <phase> MAGNETIC <afm> <p>` matters for evaluation;
    // sequence markers and the like are inert here.
    let Some(idx) = t.iter().position(|w| w.eq_ignore_ascii_case("MAGNETIC")) else {
        return;
    };
    if idx < 2 || idx + 2 >= t.len() {
        db.push_diagnostic(format!(
            "line {}: skipped malformed magnetic TYPE_DEFINITION",
            statement.line
        ));
        return;
    }
    let phase = phase_name(&t[idx - 1]);
    if phase == "*" {
        db.push_diagnostic(format!(
            "line {}: wildcard magnetic TYPE_DEFINITION is not supported",
            statement.line
        ));
        return;
    }
    let (Ok(afm_factor), Ok(structure_factor)) =
        (t[idx + 1].parse::<f64>(), t[idx + 2].parse::<f64>())
    else {
        db.push_diagnostic(format!(
            "line {}: skipped magnetic TYPE_DEFINITION with non-numeric factors",
            statement.line
        ));
        return;
    };
    db.magnetic.insert(
        phase,
        MagneticHint {
            afm_factor,
            structure_factor,
        },
    );
}

fn parse_phase(db: &mut Database, statement: &Statement) -> Result<(), TdbError> {
    let t = &statement.tokens;
    if t.len() < 4 {
        return Err(statement_error(
            "PHASE",
            statement.line,
            "expected name, type codes, sublattice count and site counts",
        ));
    }
    let name = phase_name(&t[1]);
    let count = t[3].parse::<usize>().map_err(|_| {
        statement_error(
            "PHASE",
            statement.line,
            format!("invalid sublattice count '{}'", t[3]),
        )
    })?;
    if t.len() < 4 + count {
        return Err(statement_error(
            "PHASE",
            statement.line,
            format!("expected {count} site counts"),
        ));
    }
    let mut sublattices = Vec::with_capacity(count);
    for site_token in &t[4..4 + count] {
        sublattices.push(Sublattice {
            sites: parse_f64(site_token, "PHASE", statement.line)?,
            constituents: Vec::new(),
        });
    }
    db.phases.insert(
        name.clone(),
        Phase {
            name,
            type_codes: t[2].clone(),
            sublattices,
        },
    );
    Ok(())
}

fn parse_constituent(db: &mut Database, statement: &Statement) -> Result<(), TdbError> {
    let t = &statement.tokens;
    if t.len() < 3 {
        return Err(statement_error(
            "CONSTITUENT",
            statement.line,
            "expected a phase name and a constituent list",
        ));
    }
    let name = phase_name(&t[1]);
    let joined: String = t[2..].concat();
    let lists: Vec<Vec<String>> = joined
        .split(':')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split(',')
                .map(|species| species.trim_end_matches('%').to_ascii_uppercase())
                .filter(|species| !species.is_empty())
                .collect()
        })
        .collect();

    let phase = db.phases.get_mut(&name).ok_or_else(|| {
        statement_error(
            "CONSTITUENT",
            statement.line,
            format!("phase '{name}' is not defined"),
        )
    })?;
    if lists.len() != phase.sublattices.len() {
        return Err(statement_error(
            "CONSTITUENT",
            statement.line,
            format!(
                "constituent list has {} sublattices, phase '{}' declares {}",
                lists.len(),
                name,
                phase.sublattices.len()
            ),
        ));
    }
    for (sublattice, constituents) in phase.sublattices.iter_mut().zip(lists) {
        sublattice.constituents = constituents;
    }
    Ok(())
}

fn parse_parameter(db: &mut Database, statement: &Statement) -> Result<(), TdbError> {
    let t = &statement.tokens;
    if t.len() < 4 {
        return Err(statement_error(
            "PARAMETER",
            statement.line,
            "expected a symbol followed by a piecewise expression",
        ));
    }
    let Some((kind, phase, constituents, order)) = parse_parameter_symbol(&t[1], statement.line)?
    else {
        db.push_diagnostic(format!(
            "line {}: skipped unsupported parameter symbol '{}'",
            statement.line, t[1]
        ));
        return Ok(());
    };
    let expr = parse_piecewise(&t[2..], "PARAMETER", statement.line)?;
    db.parameters.push(Parameter {
        kind,
        phase,
        constituents,
        order,
        expr,
    });
    Ok(())
}

type ParsedSymbol = (ParameterKind, String, Vec<Vec<String>>, u32);

/// Parses `G(BCC_A2,FE:VA;0)`-style parameter symbols. Returns `None` for
/// valid symbols the model layer does not consume (mobility, volume, ...).
fn parse_parameter_symbol(
    token: &str,
    line: usize,
) -> Result<Option<ParsedSymbol>, TdbError> {
    let malformed = || {
        statement_error(
            "PARAMETER",
            line,
            format!("malformed parameter symbol '{token}'"),
        )
    };
    let (kind_str, rest) = token.split_once('(').ok_or_else(malformed)?;
    let inner = rest.strip_suffix(')').ok_or_else(malformed)?;

    let kind = match kind_str.to_ascii_uppercase().as_str() {
        "G" | "L" => ParameterKind::Gibbs,
        "TC" => ParameterKind::CurieTemperature,
        "BMAGN" | "BM" => ParameterKind::MagneticMoment,
        _ => return Ok(None),
    };

    let (body, order_str) = match inner.rsplit_once(';') {
        Some((body, order)) => (body, Some(order)),
        None => (inner, None),
    };
    let order = match order_str {
        Some(text) => text.trim().parse::<u32>().map_err(|_| malformed())?,
        None => 0,
    };

    let (phase, array) = body.split_once(',').ok_or_else(malformed)?;
    let constituents: Vec<Vec<String>> = array
        .split(':')
        .map(|slot| {
            slot.split(',')
                .map(|species| species.trim_end_matches('%').to_ascii_uppercase())
                .filter(|species| !species.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();
    if constituents.iter().any(|slot| slot.is_empty()) {
        return Err(malformed());
    }

    Ok(Some((kind, phase.to_ascii_uppercase(), constituents, order)))
}

/// Parses the piecewise tail of FUNCTION and PARAMETER statements:
/// `<t_lower> <expr>; <t_upper> (Y <expr>; <t_upper>)* N [ref]`.
fn parse_piecewise(
    tokens: &[String],
    keyword: &'static str,
    line: usize,
) -> Result<Piecewise, TdbError> {
    let mut t_lower = parse_f64(&tokens[0], keyword, line)?;
    let mut branches = Vec::new();
    let mut i = 1;

    loop {
        // Expressions may be split over several tokens by line continuations;
        // the segment ends at the token carrying the ';' separator.
        let mut text = String::new();
        let mut terminated = false;
        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;
            if let Some(stripped) = token.strip_suffix(';') {
                text.push_str(stripped);
                terminated = true;
                break;
            }
            text.push_str(token);
        }
        if !terminated {
            return Err(statement_error(
                keyword,
                line,
                "expression segment is missing its ';' terminator",
            ));
        }

        let expr = expr_parser::parse(&text)
            .map_err(|source| TdbError::Expression { line, source })?;

        let upper_token = tokens.get(i).ok_or_else(|| {
            statement_error(keyword, line, "missing upper temperature limit")
        })?;
        let t_upper = parse_f64(upper_token, keyword, line)?;
        i += 1;

        branches.push(Branch {
            t_lower,
            t_upper,
            expr,
        });

        match tokens.get(i).map(|flag| flag.to_ascii_uppercase()) {
            Some(flag) if flag == "Y" => {
                i += 1;
                t_lower = t_upper;
            }
            // 'N', a trailing reference, or nothing: the expression is done.
            _ => break,
        }
    }

    Piecewise::new(branches).map_err(|_| statement_error(keyword, line, "no branches"))
}
