//! Domain tables and defaults.
//!
//! Every table here is an ordered slice: the first matching entry wins, so
//! the order of entries is part of the extraction rules.

use super::listing::FuelType;

/// Known brands, most specific first.
pub mod brands {
    /// `(pattern, canonical name)`. Patterns are matched case-insensitively
    /// as whole tokens; multi-word and longer names come before any name
    /// that is a substring of them ("Land Rover" before "Rover").
    pub const BRAND_TABLE: &[(&str, &str)] = &[
        ("Alfa Romeo", "Alfa Romeo"),
        ("Aston Martin", "Aston Martin"),
        ("Land Rover", "Land Rover"),
        ("Mercedes-Benz", "Mercedes"),
        ("Mercedes Benz", "Mercedes"),
        ("Mercedes", "Mercedes"),
        ("Rolls-Royce", "Rolls-Royce"),
        ("Citroën", "Citroën"),
        ("Citroen", "Citroën"),
        ("Volkswagen", "Volkswagen"),
        ("VW", "Volkswagen"),
        ("Renault", "Renault"),
        ("Peugeot", "Peugeot"),
        ("BMW", "BMW"),
        ("Audi", "Audi"),
        ("Toyota", "Toyota"),
        ("Ford", "Ford"),
        ("Opel", "Opel"),
        ("Nissan", "Nissan"),
        ("Fiat", "Fiat"),
        ("Seat", "Seat"),
        ("Cupra", "Cupra"),
        ("Škoda", "Skoda"),
        ("Skoda", "Skoda"),
        ("Dacia", "Dacia"),
        ("Hyundai", "Hyundai"),
        ("Kia", "Kia"),
        ("Mazda", "Mazda"),
        ("Honda", "Honda"),
        ("Volvo", "Volvo"),
        ("Tesla", "Tesla"),
        ("Porsche", "Porsche"),
        ("Jaguar", "Jaguar"),
        ("Lexus", "Lexus"),
        ("Mini", "Mini"),
        ("Jeep", "Jeep"),
        ("Suzuki", "Suzuki"),
        ("Mitsubishi", "Mitsubishi"),
        ("Subaru", "Subaru"),
        ("Chevrolet", "Chevrolet"),
        ("Lancia", "Lancia"),
        ("Alpine", "Alpine"),
        ("Smart", "Smart"),
        ("Rover", "Rover"),
        ("DS", "DS"),
    ];
}

/// Fuel keywords.
pub mod fuel {
    use super::FuelType;

    /// One keyword of the fuel table.
    #[derive(Debug, Clone, Copy)]
    pub struct FuelKeyword {
        pub keyword: &'static str,
        pub fuel: FuelType,
        /// Engine abbreviations must stand alone ("dci", not "incidence").
        pub whole_word: bool,
    }

    const fn word(keyword: &'static str, fuel: FuelType) -> FuelKeyword {
        FuelKeyword { keyword, fuel, whole_word: false }
    }

    const fn abbrev(keyword: &'static str, fuel: FuelType) -> FuelKeyword {
        FuelKeyword { keyword, fuel, whole_word: true }
    }

    /// Lowercase keywords. Earliest occurrence in the text wins; on equal
    /// positions the earlier table entry wins.
    pub const FUEL_TABLE: &[FuelKeyword] = &[
        word("électrique", FuelType::Electrique),
        word("electrique", FuelType::Electrique),
        word("hybride", FuelType::Hybride),
        word("hybrid", FuelType::Hybride),
        abbrev("bluehdi", FuelType::Diesel),
        word("diesel", FuelType::Diesel),
        word("gazole", FuelType::Diesel),
        abbrev("dci", FuelType::Diesel),
        abbrev("hdi", FuelType::Diesel),
        abbrev("tdi", FuelType::Diesel),
        abbrev("crdi", FuelType::Diesel),
        word("essence", FuelType::Essence),
        abbrev("tce", FuelType::Essence),
        abbrev("tsi", FuelType::Essence),
        abbrev("puretech", FuelType::Essence),
        word("gpl", FuelType::Gpl),
        abbrev("lpg", FuelType::Gpl),
    ];
}

/// Car-domain vocabulary used by the inclusion filter, on top of brand names.
pub mod keywords {
    /// Lowercase terms matched as substrings of title + description.
    pub const CAR_KEYWORDS: &[&str] = &[
        "voiture",
        "véhicule",
        "vehicule",
        "automobile",
        "occasion",
        "kilomètres",
        "kilometres",
        "km",
        "diesel",
        "essence",
        "hybride",
        "électrique",
        "gpl",
        "boîte manuelle",
        "boite manuelle",
        "boîte automatique",
        "boite automatique",
        "bva",
        "bvm",
        "moteur",
        "cylindrée",
        "contrôle technique",
        "controle technique",
        "carte grise",
        "berline",
        "break",
        "citadine",
        "suv",
        "4x4",
        "coupé",
        "cabriolet",
        "monospace",
        "utilitaire",
        "crossover",
        "compacte",
    ];

    /// URL path fragments that identify a vehicle listing on any site.
    pub const LISTING_PATH_PATTERNS: &[&str] = &[
        "/voiture",
        "/voitures",
        "/vehicule",
        "/auto/",
        "/ad/voitures/",
        "/annonce-voiture",
    ];
}

/// Crawl defaults.
pub mod crawling {
    /// Default maximum number of accepted listings per run
    pub const DEFAULT_MAX_RESULTS: usize = 50;

    /// Default per-navigation timeout (seconds)
    pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

    /// Default delay between page advances (milliseconds)
    pub const DEFAULT_REQUEST_DELAY_MS: u64 = 2000;

    /// Equal consecutive card counts tolerated before the loop is considered stuck
    pub const DEFAULT_STUCK_REPEAT_THRESHOLD: u32 = 1;
}
