//! Cross-taxonomy category mapping.
//!
//! Instruments are classified under two independent systems: the Morningstar
//! categories and the Assogestioni classification. The table below translates
//! an Assogestioni category into the set of Morningstar categories it spans;
//! the comparison engine uses it when a filter in one taxonomy finds nothing
//! in the other.

/// Assogestioni category -> equivalent Morningstar categories.
pub const CATEGORY_MAPPING: &[(&str, &[&str])] = &[
    (
        "AZ. INTERNAZIONALI",
        &[
            "Azionari Globali Large Cap Blend",
            "Azionari Globali Large Cap Growth",
            "Azionari Globali Large Cap Value",
        ],
    ),
    (
        "AZ. AMERICA",
        &[
            "Azionari USA Large Cap Blend",
            "Azionari USA Large Cap Growth",
            "Azionari USA Large Cap Value",
        ],
    ),
    (
        "AZ. EUROPA",
        &[
            "Azionari Europa Large Cap Blend",
            "Azionari Europa Large Cap Growth",
            "Azionari Europa Large Cap Value",
        ],
    ),
    ("AZ. AREA EURO", &["Azionari Area Euro Large Cap"]),
    ("AZ. ITALIA", &["Azionari Italia"]),
    ("AZ. PAESI EMERGENTI", &["Azionari Paesi Emergenti"]),
    (
        "AZ. PACIFICO",
        &[
            "Azionari Asia-Pacifico ex-Giappone",
            "Azionari Giappone Large Cap",
        ],
    ),
    (
        "AZ. SETTORE TECNOLOGIA",
        &["Azionari Settore Tecnologia"],
    ),
    ("AZ. SALUTE", &["Azionari Settore Salute"]),
    (
        "AZ. ENERGIA E MAT. PRIME",
        &[
            "Azionari Settore Energia",
            "Azionari Settore Risorse Naturali",
        ],
    ),
    (
        "OBBL. EURO CORPORATE INV. GRADE",
        &["Obbligazionari EUR Corporate"],
    ),
    (
        "OBBL. EURO GOV. M/L TERMINE",
        &["Obbligazionari EUR Governativi"],
    ),
    ("OBBL. EURO HIGH YIELD", &["Obbligazionari EUR High Yield"]),
    (
        "OBBL. INTERNAZIONALI",
        &["Obbligazionari Globali", "Obbligazionari Globali High Yield"],
    ),
    (
        "OBBL. PAESI EMERGENTI",
        &["Obbligazionari Mercati Emergenti"],
    ),
    (
        "BILANCIATI",
        &["Bilanciati EUR Moderati", "Bilanciati Globali"],
    ),
    ("BILANCIATI AZIONARI", &["Bilanciati EUR Aggressivi"]),
    ("BILANCIATI OBBLIGAZIONARI", &["Bilanciati EUR Prudenti"]),
    ("FLESSIBILI", &["Flessibili EUR", "Flessibili Globali"]),
    ("FONDI DI LIQUIDITA' AREA EURO", &["Monetari EUR"]),
];

/// Morningstar categories equivalent to an Assogestioni category.
///
/// Exact match on the table key first, then substring match in either
/// direction; an unmapped category maps to itself so searches still run.
pub fn assogestioni_to_morningstar(category: &str) -> Vec<String> {
    if let Some((_, mapped)) = CATEGORY_MAPPING
        .iter()
        .find(|(asso, _)| *asso == category)
    {
        return mapped.iter().map(|s| s.to_string()).collect();
    }

    let upper = category.to_uppercase();
    for (asso, mapped) in CATEGORY_MAPPING {
        if asso.contains(upper.as_str()) || upper.contains(asso) {
            return mapped.iter().map(|s| s.to_string()).collect();
        }
    }

    vec![category.to_string()]
}

/// Assogestioni categories whose Morningstar equivalents include `category`.
pub fn morningstar_to_assogestioni(category: &str) -> Vec<&'static str> {
    CATEGORY_MAPPING
        .iter()
        .filter(|(_, mapped)| mapped.contains(&category))
        .map(|(asso, _)| *asso)
        .collect()
}
