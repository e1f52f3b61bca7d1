use phf::phf_map;

/// TDB statement keywords relevant to free-energy evaluation.
///
/// Anything mapped to `Ignored` is a valid TDB command that carries no
/// thermodynamic content (references, assessment bookkeeping, defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Element,
    Species,
    Function,
    TypeDefinition,
    Phase,
    Constituent,
    Parameter,
    Ignored,
}

/// Keyword table including the abbreviations Thermo-Calc accepts in the wild.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "ELEMENT" => Keyword::Element,
    "ELEM" => Keyword::Element,
    "SPECIES" => Keyword::Species,
    "FUNCTION" => Keyword::Function,
    "FUNCT" => Keyword::Function,
    "FUN" => Keyword::Function,
    "TYPE_DEFINITION" => Keyword::TypeDefinition,
    "TYPE_DEF" => Keyword::TypeDefinition,
    "PHASE" => Keyword::Phase,
    "CONSTITUENT" => Keyword::Constituent,
    "CONST" => Keyword::Constituent,
    "PARAMETER" => Keyword::Parameter,
    "PARAM" => Keyword::Parameter,
    "PAR" => Keyword::Parameter,
    "DATABASE_INFO" => Keyword::Ignored,
    "DATABASE_INFORMATION" => Keyword::Ignored,
    "ASSESSED_SYSTEMS" => Keyword::Ignored,
    "LIST_OF_REFERENCES" => Keyword::Ignored,
    "REFERENCE_FILE" => Keyword::Ignored,
    "ADD_REFERENCES" => Keyword::Ignored,
    "DEFAULT_COMMAND" => Keyword::Ignored,
    "DEFINE_SYSTEM_DEFAULT" => Keyword::Ignored,
    "TEMPERATURE_LIMITS" => Keyword::Ignored,
    "TEMP_LIM" => Keyword::Ignored,
    "VERSION_DATE" => Keyword::Ignored,
    "ZERO_VOLUME_SPECIES" => Keyword::Ignored,
};

pub fn lookup(word: &str) -> Option<Keyword> {
    KEYWORDS.get(word.to_ascii_uppercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keywords_resolve() {
        assert_eq!(lookup("PARAMETER"), Some(Keyword::Parameter));
        assert_eq!(lookup("FUNCTION"), Some(Keyword::Function));
        assert_eq!(lookup("PHASE"), Some(Keyword::Phase));
    }

    #[test]
    fn abbreviations_resolve_to_the_same_keyword() {
        assert_eq!(lookup("PARAM"), Some(Keyword::Parameter));
        assert_eq!(lookup("FUNCT"), Some(Keyword::Function));
        assert_eq!(lookup("TYPE_DEF"), Some(Keyword::TypeDefinition));
        assert_eq!(lookup("CONST"), Some(Keyword::Constituent));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("parameter"), Some(Keyword::Parameter));
        assert_eq!(lookup("Element"), Some(Keyword::Element));
    }

    #[test]
    fn bookkeeping_commands_are_ignored_not_unknown() {
        assert_eq!(lookup("LIST_OF_REFERENCES"), Some(Keyword::Ignored));
        assert_eq!(lookup("ASSESSED_SYSTEMS"), Some(Keyword::Ignored));
    }

    #[test]
    fn unknown_words_return_none() {
        assert_eq!(lookup("NOT_A_COMMAND"), None);
    }
}
