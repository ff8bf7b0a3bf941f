// src/table/region.rs

/// World Bank regional grouping for an ISO3 country code.
///
/// Only the countries the dashboard commonly shows are listed; anything
/// else (including World Bank aggregates) falls under [`OTHER_REGION`].
pub fn region_of(iso3: &str) -> &'static str {
    match iso3.to_ascii_uppercase().as_str() {
        "USA" | "CAN" | "BMU" => "North America",
        "CHN" | "JPN" | "KOR" | "IDN" | "AUS" | "NZL" | "PHL" | "THA" | "VNM" | "MYS" | "SGP"
        | "MNG" => "East Asia & Pacific",
        "IND" | "PAK" | "BGD" | "LKA" | "NPL" | "AFG" | "BTN" | "MDV" => "South Asia",
        "DEU" | "GBR" | "FRA" | "ITA" | "ESP" | "NLD" | "BEL" | "SWE" | "NOR" | "DNK" | "FIN"
        | "POL" | "PRT" | "GRC" | "IRL" | "AUT" | "CHE" | "RUS" | "TUR" | "UKR" | "KAZ"
        | "CZE" | "HUN" | "ROU" => "Europe & Central Asia",
        "BRA" | "MEX" | "ARG" | "CHL" | "COL" | "PER" | "VEN" | "ECU" | "BOL" | "URY" | "PRY"
        | "CUB" | "GTM" | "HND" | "JAM" => "Latin America & Caribbean",
        "SAU" | "EGY" | "IRN" | "IRQ" | "ISR" | "JOR" | "MAR" | "DZA" | "TUN" | "ARE" | "QAT"
        | "KWT" | "LBN" => "Middle East & North Africa",
        "NGA" | "ZAF" | "ETH" | "KEN" | "GHA" | "TZA" | "UGA" | "AGO" | "SEN" | "CIV" | "CMR"
        | "ZMB" | "ZWE" | "MOZ" | "RWA" => "Sub-Saharan Africa",
        _ => OTHER_REGION,
    }
}

pub const OTHER_REGION: &str = "Other";
