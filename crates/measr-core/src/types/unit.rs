//! Unit registry: families, systems, suffixes and ratio tables
//!
//! To add a new unit, add an entry to the UNITS array. Lookup, named
//! constructors, suggestions and display pick it up automatically.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ratio::Ratio;
use crate::error::{MeasureError, Result};

/// Highly composite denominator for customary storage.
///
/// `HCN = 2^8 * 3^4 * 5 * 7`, the least common multiple of `36 * q` for every
/// common fraction denominator `q`, so every common fraction of an inch (and
/// of a cup, pound, ...) is an exact number of `1/HCN` sub-units.
pub const HCN: i64 = 725_760;

/// Dimension of measurement. Arithmetic never crosses families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Length,
    Mass,
    Volume,
    Data,
    Temperature,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Length => "length",
            Family::Mass => "mass",
            Family::Volume => "volume",
            Family::Data => "data",
            Family::Temperature => "temperature",
        }
    }

    /// A literal of this family, for error messages
    pub fn example(&self) -> &'static str {
        match self {
            Family::Length => "#5in or #100cm",
            Family::Mass => "#5lb or #100g",
            Family::Volume => "#1/3cup or #250mL",
            Family::Data => "#1024B or #1MB",
            Family::Temperature => "#20C or #68F",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Measurement system a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum System {
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "US")]
    Us,
}

impl System {
    pub fn as_str(&self) -> &'static str {
        match self {
            System::Si => "SI",
            System::Us => "US",
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unit metadata - single source of truth for each unit
#[derive(Debug)]
pub struct UnitDef {
    /// Canonical suffix (e.g., "cm", "lb", "KiB")
    pub suffix: &'static str,
    pub family: Family,
    pub system: System,
    /// Base units in one of this unit, as `(numerator, denominator)`.
    /// Temperature scales give the size of one degree in kelvin.
    pub ratio: (i64, i64),
    /// Position of this scale's zero in sub-kelvin storage (temperature only)
    pub zero: i64,
    /// Constructor names, plural; SI spelling first
    pub names: &'static [&'static str],
    /// Other accepted suffix spellings
    pub aliases: &'static [&'static str],
    /// Traditional symbol used by fraction display (`"` for inches)
    pub symbol: Option<&'static str>,
}

macro_rules! unit {
    ($suffix:literal, $family:ident, $system:ident, $num:expr, $den:expr, [$($name:literal),*]) => {
        unit!($suffix, $family, $system, $num, $den, [$($name),*], [], None)
    };
    ($suffix:literal, $family:ident, $system:ident, $num:expr, $den:expr, [$($name:literal),*], [$($alias:literal),*], $symbol:expr) => {
        UnitDef {
            suffix: $suffix,
            family: Family::$family,
            system: System::$system,
            ratio: ($num, $den),
            zero: 0,
            names: &[$($name),*],
            aliases: &[$($alias),*],
            symbol: $symbol,
        }
    };
}

/// Complete registry of supported units.
/// Base units (ratio 1/1): m, g, L, B for SI; yd, oz, qt for customary; K.
pub static UNITS: &[UnitDef] = &[
    // Length - SI (base: metre)
    unit!("mm", Length, Si, 1, 1_000, ["millimetres", "millimeters"]),
    unit!("cm", Length, Si, 1, 100, ["centimetres", "centimeters"]),
    unit!("m", Length, Si, 1, 1, ["metres", "meters"]),
    unit!("km", Length, Si, 1_000, 1, ["kilometres", "kilometers"]),
    // Length - customary (base: yard)
    unit!("in", Length, Us, 1, 36, ["inches"], [], Some("\"")),
    unit!("ft", Length, Us, 1, 3, ["feet"], [], Some("'")),
    unit!("yd", Length, Us, 1, 1, ["yards"]),
    unit!("mi", Length, Us, 1_760, 1, ["miles"]),
    // Mass - SI (base: gram)
    unit!("mg", Mass, Si, 1, 1_000, ["milligrams"]),
    unit!("g", Mass, Si, 1, 1, ["grams"]),
    unit!("kg", Mass, Si, 1_000, 1, ["kilograms"]),
    // Mass - customary (base: ounce)
    unit!("oz", Mass, Us, 1, 1, ["ounces"]),
    unit!("lb", Mass, Us, 16, 1, ["pounds"]),
    // Volume - SI (base: litre)
    unit!("mL", Volume, Si, 1, 1_000, ["millilitres", "milliliters"], ["ml"], None),
    unit!("cL", Volume, Si, 1, 100, ["centilitres", "centiliters"], ["cl"], None),
    unit!("dL", Volume, Si, 1, 10, ["decilitres", "deciliters"], ["dl"], None),
    unit!("L", Volume, Si, 1, 1, ["litres", "liters"], ["l"], None),
    // Volume - customary (base: quart)
    unit!("tsp", Volume, Us, 1, 192, ["teaspoons"]),
    unit!("tbsp", Volume, Us, 1, 64, ["tablespoons"]),
    unit!("floz", Volume, Us, 1, 32, ["fluid_ounces"], ["fl_oz"], None),
    unit!("cup", Volume, Us, 1, 4, ["cups"], ["cups"], None),
    unit!("pt", Volume, Us, 1, 2, ["pints"]),
    unit!("qt", Volume, Us, 1, 1, ["quarts"]),
    unit!("gal", Volume, Us, 4, 1, ["gallons"]),
    // Data - decimal prefixes (base: byte)
    unit!("B", Data, Si, 1, 1, ["bytes"]),
    unit!("kB", Data, Si, 1_000, 1, ["kilobytes"]),
    unit!("MB", Data, Si, 1_000_000, 1, ["megabytes"]),
    unit!("GB", Data, Si, 1_000_000_000, 1, ["gigabytes"]),
    unit!("TB", Data, Si, 1_000_000_000_000, 1, ["terabytes"]),
    // Data - binary prefixes
    unit!("KiB", Data, Si, 1 << 10, 1, ["kibibytes"]),
    unit!("MiB", Data, Si, 1 << 20, 1, ["mebibytes"]),
    unit!("GiB", Data, Si, 1 << 30, 1, ["gibibytes"]),
    unit!("TiB", Data, Si, 1 << 40, 1, ["tebibytes"]),
    // Temperature (base: kelvin, stored as 1/900 K)
    unit!("K", Temperature, Si, 1, 1, ["kelvin"]),
    UnitDef {
        suffix: "C",
        family: Family::Temperature,
        system: System::Si,
        ratio: (1, 1),
        zero: 245_835,
        names: &["celsius"],
        aliases: &["°C"],
        symbol: None,
    },
    UnitDef {
        suffix: "F",
        family: Family::Temperature,
        system: System::Us,
        ratio: (5, 9),
        zero: 229_835,
        names: &["fahrenheit"],
        aliases: &["°F"],
        symbol: None,
    },
];

/// Cross-system bridge ratios: SI base units per customary base unit.
/// All are exact by international definition.
static BRIDGES: &[(Family, i64, i64)] = &[
    // 1 yd = 0.9144 m
    (Family::Length, 9_144, 10_000),
    // 1 oz = 28.349523125 g  (1 lb = 453.59237 g)
    (Family::Mass, 28_349_523_125, 1_000_000_000),
    // 1 qt = 0.946352946 L  (1 gal = 3.785411784 L)
    (Family::Volume, 946_352_946, 1_000_000_000),
];

/// Suffix and alias index, built once on first lookup
static SUFFIX_INDEX: LazyLock<HashMap<&'static str, &'static UnitDef>> = LazyLock::new(|| {
    let index: HashMap<_, _> = UNITS
        .iter()
        .flat_map(|d| std::iter::once(d.suffix).chain(d.aliases.iter().copied()).map(move |s| (s, d)))
        .collect();
    tracing::trace!(entries = index.len(), "unit suffix index built");
    index
});

/// Constructor-name index (`"metres"` -> m)
static NAME_INDEX: LazyLock<HashMap<&'static str, &'static UnitDef>> = LazyLock::new(|| {
    UNITS
        .iter()
        .flat_map(|d| d.names.iter().map(move |n| (*n, d)))
        .collect()
});

/// A registered unit. Cheap to copy; compares by suffix.
#[derive(Clone, Copy)]
pub struct Unit(&'static UnitDef);

impl Unit {
    /// Find a unit by suffix or alias (case-sensitive: `mB` is not `MB`)
    pub fn parse(suffix: &str) -> Option<Unit> {
        SUFFIX_INDEX.get(suffix).copied().map(Unit)
    }

    /// Like [`Unit::parse`], but reports unknown suffixes with a suggestion
    pub fn lookup(suffix: &str) -> Result<Unit> {
        Self::parse(suffix).ok_or_else(|| MeasureError::UnknownUnitSuffix {
            suffix: suffix.to_string(),
            suggestion: closest_suffix(suffix),
        })
    }

    /// Find a unit by constructor name (`"feet"`, `"kilograms"`)
    pub fn from_name(name: &str) -> Option<Unit> {
        NAME_INDEX.get(name).copied().map(Unit)
    }

    /// The base unit of a family within a system, if the system has one
    pub fn base(family: Family, system: System) -> Option<Unit> {
        UNITS
            .iter()
            .find(|d| d.family == family && d.system == system && d.ratio == (1, 1) && d.zero == 0)
            .map(Unit)
    }

    /// Iterator over all units
    pub fn all() -> impl Iterator<Item = Unit> {
        UNITS.iter().map(Unit)
    }

    pub fn def(&self) -> &'static UnitDef {
        self.0
    }

    pub fn suffix(&self) -> &'static str {
        self.0.suffix
    }

    pub fn family(&self) -> Family {
        self.0.family
    }

    pub fn system(&self) -> System {
        self.0.system
    }

    /// Base units in one of this unit
    pub fn ratio(&self) -> Ratio {
        let (num, den) = self.0.ratio;
        Ratio::new(num.into(), den.into()).expect("registry ratios have non-zero denominators")
    }

    /// Stored as `Customary` (fractions of `1/HCN`)
    pub fn is_customary(&self) -> bool {
        self.0.system == System::Us && self.0.family != Family::Temperature
    }

    pub fn is_temperature(&self) -> bool {
        self.0.family == Family::Temperature
    }

    /// `1/HCN` sub-units in one of this unit (customary units only)
    pub fn sub_units(&self) -> i64 {
        let (num, den) = self.0.ratio;
        HCN * num / den
    }

    pub fn symbol(&self) -> Option<&'static str> {
        self.0.symbol
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.0.suffix == other.0.suffix
    }
}

impl Eq for Unit {}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit({})", self.0.suffix)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.suffix)
    }
}

impl std::str::FromStr for Unit {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self> {
        Unit::lookup(s)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.suffix)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let suffix = String::deserialize(deserializer)?;
        Unit::lookup(&suffix).map_err(serde::de::Error::custom)
    }
}

/// SI base units per customary base unit, for families that span both systems
pub fn bridge(family: Family) -> Option<Ratio> {
    BRIDGES
        .iter()
        .find(|(f, _, _)| *f == family)
        .and_then(|(_, num, den)| Ratio::new((*num).into(), (*den).into()).ok())
}

/// Closest known suffix within edit distance 3
fn closest_suffix(input: &str) -> Option<&'static str> {
    UNITS
        .iter()
        .map(|d| d.suffix)
        .map(|s| (levenshtein(input, s), s))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, s)| s)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        prev = row;
    }
    prev[b.len()]
}
