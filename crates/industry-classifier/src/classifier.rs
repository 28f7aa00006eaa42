use analysis_core::SectorKey;

/// One row of the detection table: sector keywords and industry keywords.
struct SectorRule {
    key: SectorKey,
    sector_keywords: &'static [&'static str],
    industry_keywords: &'static [&'static str],
}

/// Checked in order, first match wins. Specific entries come before broad
/// ones so that a keyword like "industrials" cannot swallow a sub-industry.
const SECTOR_RULES: &[SectorRule] = &[
    SectorRule {
        key: SectorKey::Technology,
        sector_keywords: &["technology"],
        industry_keywords: &[
            "software",
            "internet",
            "fintech",
            "e-commerce",
            "saas",
            "semiconductor",
            "tech",
            "data",
            "cloud",
            "digital",
            "information technology",
        ],
    },
    SectorRule {
        key: SectorKey::LogisticsTransport,
        sector_keywords: &["industrials"],
        industry_keywords: &[
            "transport",
            "logistic",
            "trucking",
            "shipping",
            "airline",
            "freight",
            "delivery",
            "courier",
            "railroad",
            "marine",
        ],
    },
    SectorRule {
        key: SectorKey::Banking,
        sector_keywords: &["financial services", "finance"],
        industry_keywords: &["bank", "diversified bank", "regional bank", "banks"],
    },
    SectorRule {
        key: SectorKey::Telecom,
        sector_keywords: &["communication services", "telecommunications"],
        industry_keywords: &[
            "telecom",
            "wireless",
            "integrated telecommunication",
            "communication",
        ],
    },
    SectorRule {
        key: SectorKey::EnergyMining,
        sector_keywords: &["energy", "basic materials"],
        industry_keywords: &[
            "oil",
            "gas",
            "coal",
            "mining",
            "metals",
            "steel",
            "gold",
            "mineral",
            "chemical",
            "fertilizer",
        ],
    },
    SectorRule {
        key: SectorKey::ConsumerGoods,
        sector_keywords: &["consumer defensive", "consumer cyclical"],
        industry_keywords: &[
            "food",
            "beverage",
            "tobacco",
            "retail",
            "packaged",
            "grocery",
            "supermarket",
            "household",
            "cosmetic",
            "staple",
        ],
    },
    SectorRule {
        key: SectorKey::Manufacturing,
        sector_keywords: &["industrials"],
        industry_keywords: &[
            "industrial",
            "machinery",
            "auto",
            "cement",
            "building material",
            "electrical equipment",
            "aerospace",
            "defense",
            "conglomerate",
        ],
    },
    SectorRule {
        key: SectorKey::PropertyConstruction,
        sector_keywords: &["real estate"],
        industry_keywords: &[
            "real estate",
            "reit",
            "property",
            "residential",
            "commercial",
            "construction",
            "infrastructure",
        ],
    },
    SectorRule {
        key: SectorKey::Healthcare,
        sector_keywords: &["healthcare"],
        industry_keywords: &[
            "pharmaceutical",
            "hospital",
            "biotech",
            "drug",
            "medical",
            "healthcare provider",
            "life sciences",
        ],
    },
];

/// Map free-text sector/industry labels onto a [`SectorKey`].
///
/// Pass 1 matches the industry text against each rule's industry keywords;
/// pass 2 runs only if pass 1 found nothing and matches the sector text
/// against sector keywords. Matching is case-insensitive substring search.
pub fn classify(sector: &str, industry: &str) -> SectorKey {
    let sector = sector.to_lowercase();
    let industry = industry.to_lowercase();

    let by_industry = SECTOR_RULES
        .iter()
        .find(|rule| rule.industry_keywords.iter().any(|kw| industry.contains(kw)));
    if let Some(rule) = by_industry {
        tracing::debug!("classified industry '{}' as {}", industry, rule.key);
        return rule.key;
    }

    let by_sector = SECTOR_RULES
        .iter()
        .find(|rule| rule.sector_keywords.iter().any(|kw| sector.contains(kw)));
    match by_sector {
        Some(rule) => {
            tracing::debug!("classified sector '{}' as {}", sector, rule.key);
            rule.key
        }
        None => SectorKey::Unknown,
    }
}
