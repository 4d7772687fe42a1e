use super::{FormulaTerm, TraitFormula};
use crate::assessment::domain::{CategoryCode, Domain};

const A: Domain = Domain::Amiability;
const C: Domain = Domain::Conscientiousness;
const E: Domain = Domain::Extraversion;
const N: Domain = Domain::Neuroticism;
const O: Domain = Domain::Openness;

struct FacetRow {
    trait_name: &'static str,
    facet: CategoryCode,
    terms: &'static [FormulaTerm],
    denominator: f64,
}

const fn row(
    trait_name: &'static str,
    domain: Domain,
    facet: u8,
    terms: &'static [FormulaTerm],
    denominator: f64,
) -> FacetRow {
    FacetRow {
        trait_name,
        facet: CategoryCode::new(domain, facet),
        terms,
        denominator,
    }
}

const fn keyed(domain: Domain, facet: u8, weight: f64) -> FormulaTerm {
    FormulaTerm {
        code: CategoryCode::new(domain, facet),
        weight,
        inverted: false,
    }
}

const fn reversed(domain: Domain, facet: u8, weight: f64) -> FormulaTerm {
    FormulaTerm {
        code: CategoryCode::new(domain, facet),
        weight,
        inverted: true,
    }
}

// Denominators are 5 × Σweight.
#[rustfmt::skip]
const STANDARD: &[FacetRow] = &[
    // Amiability
    row("trust", A, 1, &[keyed(A, 1, 3.0), keyed(E, 1, 1.0), keyed(E, 6, 1.0), reversed(N, 1, 1.0), reversed(N, 2, 1.0)], 35.0),
    row("straightforwardness", A, 2, &[keyed(A, 2, 3.0), keyed(C, 3, 1.0), keyed(A, 5, 1.0), reversed(N, 5, 1.0), reversed(E, 3, 1.0)], 35.0),
    row("altruism", A, 3, &[keyed(A, 3, 3.0), keyed(E, 1, 2.0), keyed(A, 6, 1.0), reversed(N, 2, 1.0), keyed(C, 3, 1.0)], 40.0),
    row("compliance", A, 4, &[keyed(A, 4, 3.0), reversed(N, 2, 2.0), keyed(A, 5, 1.0), reversed(E, 3, 1.0), keyed(C, 6, 1.0)], 40.0),
    row("modesty", A, 5, &[keyed(A, 5, 3.0), reversed(E, 3, 1.0), keyed(N, 4, 1.0), reversed(O, 5, 1.0), keyed(A, 2, 1.0)], 35.0),
    row("tender_mindedness", A, 6, &[keyed(A, 6, 3.0), keyed(A, 3, 1.0), keyed(E, 1, 1.0), keyed(O, 3, 1.0), keyed(O, 6, 1.0), reversed(N, 2, 1.0)], 40.0),
    // Conscientiousness
    row("competence", C, 1, &[keyed(C, 1, 3.0), keyed(C, 4, 1.0), keyed(C, 5, 1.0), reversed(N, 6, 1.0), keyed(E, 3, 1.0), reversed(N, 1, 1.0)], 40.0),
    row("order", C, 2, &[keyed(C, 2, 3.0), keyed(C, 6, 1.0), keyed(C, 5, 1.0), reversed(N, 5, 1.0), reversed(O, 4, 1.0)], 35.0),
    row("dutifulness", C, 3, &[keyed(C, 3, 3.0), keyed(A, 2, 1.0), keyed(C, 1, 1.0), keyed(C, 5, 1.0), reversed(N, 5, 1.0)], 35.0),
    row("achievement_striving", C, 4, &[keyed(C, 4, 3.0), keyed(C, 1, 1.0), keyed(E, 4, 1.0), keyed(C, 5, 1.0), keyed(E, 3, 1.0), reversed(N, 3, 1.0)], 40.0),
    row("self_discipline", C, 5, &[keyed(C, 5, 3.0), keyed(C, 1, 1.0), keyed(C, 4, 1.0), reversed(N, 5, 1.0), reversed(N, 3, 1.0)], 35.0),
    row("deliberation", C, 6, &[keyed(C, 6, 3.0), reversed(N, 5, 2.0), reversed(E, 5, 1.0), keyed(C, 2, 1.0), keyed(A, 4, 1.0)], 40.0),
    // Extraversion
    row("warmth", E, 1, &[keyed(E, 1, 3.0), keyed(A, 3, 1.0), keyed(A, 6, 1.0), keyed(E, 6, 1.0), reversed(N, 2, 1.0)], 35.0),
    row("gregariousness", E, 2, &[keyed(E, 2, 3.0), keyed(E, 1, 1.0), keyed(E, 5, 1.0), reversed(N, 4, 1.0), keyed(E, 6, 1.0)], 35.0),
    row("assertiveness", E, 3, &[keyed(E, 3, 3.0), keyed(E, 4, 1.0), keyed(C, 1, 1.0), reversed(N, 4, 1.0), reversed(A, 4, 1.0)], 35.0),
    row("activity", E, 4, &[keyed(E, 4, 3.0), keyed(C, 4, 1.0), keyed(E, 3, 1.0), keyed(E, 5, 1.0), reversed(N, 3, 1.0)], 35.0),
    row("excitement_seeking", E, 5, &[keyed(E, 5, 3.0), keyed(O, 4, 1.0), keyed(E, 2, 1.0), reversed(C, 6, 1.0), reversed(N, 1, 1.0)], 35.0),
    row("positive_emotions", E, 6, &[keyed(E, 6, 3.0), keyed(E, 1, 1.0), reversed(N, 3, 2.0), keyed(O, 3, 1.0), reversed(N, 1, 1.0)], 40.0),
    // Neuroticism
    row("anxiety", N, 1, &[keyed(N, 1, 3.0), keyed(N, 6, 1.0), keyed(N, 4, 1.0), reversed(C, 1, 1.0), reversed(E, 6, 1.0)], 35.0),
    row("angry_hostility", N, 2, &[keyed(N, 2, 3.0), reversed(A, 4, 1.0), reversed(A, 1, 1.0), keyed(N, 5, 1.0), reversed(E, 1, 1.0)], 35.0),
    row("depression", N, 3, &[keyed(N, 3, 3.0), reversed(E, 6, 2.0), keyed(N, 6, 1.0), keyed(N, 1, 1.0), reversed(C, 1, 1.0)], 40.0),
    row("self_consciousness", N, 4, &[keyed(N, 4, 3.0), reversed(E, 3, 1.0), reversed(E, 2, 1.0), keyed(N, 1, 1.0), reversed(C, 1, 1.0)], 35.0),
    row("impulsiveness", N, 5, &[keyed(N, 5, 3.0), reversed(C, 5, 1.0), reversed(C, 6, 1.0), keyed(E, 5, 1.0), keyed(N, 2, 1.0)], 35.0),
    row("vulnerability", N, 6, &[keyed(N, 6, 3.0), keyed(N, 1, 1.0), reversed(C, 1, 1.0), reversed(C, 5, 1.0), reversed(E, 3, 1.0), keyed(N, 3, 1.0)], 40.0),
    // Openness
    row("fantasy", O, 1, &[keyed(O, 1, 3.0), keyed(O, 2, 1.0), keyed(O, 5, 1.0), reversed(C, 2, 1.0), keyed(O, 3, 1.0)], 35.0),
    row("aesthetics", O, 2, &[keyed(O, 2, 3.0), keyed(O, 1, 1.0), keyed(O, 3, 1.0), keyed(O, 5, 1.0), keyed(E, 1, 1.0)], 35.0),
    row("feelings", O, 3, &[keyed(O, 3, 3.0), keyed(E, 6, 1.0), keyed(A, 6, 1.0), keyed(N, 3, 1.0), keyed(O, 2, 1.0)], 35.0),
    row("actions", O, 4, &[keyed(O, 4, 3.0), keyed(E, 5, 1.0), keyed(O, 5, 1.0), reversed(C, 2, 1.0), reversed(N, 1, 1.0)], 35.0),
    row("ideas", O, 5, &[keyed(O, 5, 3.0), keyed(O, 1, 1.0), keyed(O, 4, 1.0), keyed(C, 4, 1.0), keyed(O, 6, 1.0), keyed(E, 3, 1.0)], 40.0),
    row("values", O, 6, &[keyed(O, 6, 3.0), keyed(O, 4, 1.0), keyed(O, 5, 1.0), reversed(A, 4, 1.0), reversed(C, 3, 1.0)], 35.0),
];

pub(super) fn standard_formulas() -> Vec<TraitFormula> {
    STANDARD
        .iter()
        .map(|row| TraitFormula {
            trait_name: row.trait_name.to_string(),
            facet: row.facet,
            terms: row.terms.to_vec(),
            denominator: row.denominator,
        })
        .collect()
}
