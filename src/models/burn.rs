use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Burn depth, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BurnDepth {
    #[serde(rename = "first-degree", alias = "1st degree")]
    FirstDegree,
    #[serde(rename = "second-degree-superficial", alias = "2nd degree superficial")]
    SecondDegreeSuperficial,
    #[serde(rename = "second-degree-deep", alias = "2nd degree deep")]
    SecondDegreeDeep,
    #[serde(rename = "third-degree", alias = "3rd degree")]
    ThirdDegree,
    #[serde(rename = "fourth-degree", alias = "4th degree")]
    FourthDegree,
}

impl BurnDepth {
    pub const ALL: [BurnDepth; 5] = [
        BurnDepth::FirstDegree,
        BurnDepth::SecondDegreeSuperficial,
        BurnDepth::SecondDegreeDeep,
        BurnDepth::ThirdDegree,
        BurnDepth::FourthDegree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BurnDepth::FirstDegree => "first-degree",
            BurnDepth::SecondDegreeSuperficial => "second-degree-superficial",
            BurnDepth::SecondDegreeDeep => "second-degree-deep",
            BurnDepth::ThirdDegree => "third-degree",
            BurnDepth::FourthDegree => "fourth-degree",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    #[serde(alias = "Left")]
    Left,
    #[serde(alias = "Right")]
    Right,
    #[serde(alias = "Bilateral")]
    Bilateral,
}

/// One burned body part as returned by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnLocationEntry {
    /// Body part, english term without side
    pub location: String,
    #[serde(alias = "degree")]
    pub depth: BurnDepth,
    #[serde(default)]
    pub laterality: Option<Laterality>,
    #[serde(default, alias = "is_circumferential")]
    pub circumferential: Option<bool>,
}

impl BurnLocationEntry {
    pub fn new(location: impl Into<String>, depth: BurnDepth) -> Self {
        Self {
            location: location.into(),
            depth,
            laterality: None,
            circumferential: None,
        }
    }

    pub fn with_laterality(mut self, laterality: Laterality) -> Self {
        self.laterality = Some(laterality);
        self
    }

    pub fn circumferential(mut self) -> Self {
        self.circumferential = Some(true);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidAdministration {
    #[serde(rename = "type")]
    pub fluid_type: String,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// dd-mm-yyyy
    #[serde(default)]
    pub date: Option<String>,
    pub procedure: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Burn injury episode data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnInjury {
    #[serde(default)]
    pub injury_date: Option<String>,
    #[serde(default)]
    pub injury_time: Option<String>,
    #[serde(default)]
    pub injury_cause: Option<String>,
    #[serde(default)]
    pub injury_location: Vec<String>,
    #[serde(default)]
    pub burn_degree: Vec<BurnLocationEntry>,
    /// Total body surface area, percent
    #[serde(default, deserialize_with = "deserialize_tbsa")]
    pub tbsa: Option<f64>,
    #[serde(default)]
    pub inhalation_injury: bool,
    #[serde(default)]
    pub pre_hospital_intubation: bool,
    #[serde(default)]
    pub pre_hospital_fluid: Vec<FluidAdministration>,
    #[serde(default)]
    pub pre_hospital_other: Option<String>,
    #[serde(default)]
    pub mechanical_ventilation: bool,
    #[serde(default)]
    pub parkland_formula: Option<Map<String, Value>>,
    #[serde(default)]
    pub consultations: Vec<String>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
}

/// Accepts `15`, `15.5`, `"~15%"` or null
fn deserialize_tbsa<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '~' | '%' | '≈') && !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid tbsa value: {:?}", s)))
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid tbsa value: {}",
            other
        ))),
    }
}

/// Body-part class used to decide laterality and circumferential rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRegion {
    UpperLimb,
    LowerLimb,
    Torso,
    HeadNeck,
    Perineum,
    Unclassified,
}

const REGION_KEYWORDS: &[(&str, BodyRegion)] = &[
    ("arm", BodyRegion::UpperLimb),
    ("forearm", BodyRegion::UpperLimb),
    ("hand", BodyRegion::UpperLimb),
    ("finger", BodyRegion::UpperLimb),
    ("thumb", BodyRegion::UpperLimb),
    ("wrist", BodyRegion::UpperLimb),
    ("elbow", BodyRegion::UpperLimb),
    ("shoulder", BodyRegion::UpperLimb),
    ("axilla", BodyRegion::UpperLimb),
    ("palm", BodyRegion::UpperLimb),
    ("leg", BodyRegion::LowerLimb),
    ("thigh", BodyRegion::LowerLimb),
    ("knee", BodyRegion::LowerLimb),
    ("calf", BodyRegion::LowerLimb),
    ("ankle", BodyRegion::LowerLimb),
    ("foot", BodyRegion::LowerLimb),
    ("feet", BodyRegion::LowerLimb),
    ("toe", BodyRegion::LowerLimb),
    ("heel", BodyRegion::LowerLimb),
    ("hip", BodyRegion::LowerLimb),
    ("chest", BodyRegion::Torso),
    ("thorax", BodyRegion::Torso),
    ("abdomen", BodyRegion::Torso),
    ("back", BodyRegion::Torso),
    ("trunk", BodyRegion::Torso),
    ("torso", BodyRegion::Torso),
    ("flank", BodyRegion::Torso),
    ("breast", BodyRegion::Torso),
    ("buttock", BodyRegion::Torso),
    ("gluteal", BodyRegion::Torso),
    ("lumbar", BodyRegion::Torso),
    ("head", BodyRegion::HeadNeck),
    ("face", BodyRegion::HeadNeck),
    ("neck", BodyRegion::HeadNeck),
    ("scalp", BodyRegion::HeadNeck),
    ("forehead", BodyRegion::HeadNeck),
    ("cheek", BodyRegion::HeadNeck),
    ("chin", BodyRegion::HeadNeck),
    ("nose", BodyRegion::HeadNeck),
    ("lip", BodyRegion::HeadNeck),
    ("mouth", BodyRegion::HeadNeck),
    ("perineum", BodyRegion::Perineum),
    ("genital", BodyRegion::Perineum),
    ("genitalia", BodyRegion::Perineum),
    ("groin", BodyRegion::Perineum),
];

impl BodyRegion {
    /// Classify a body-part term. Limb words win over torso words so
    /// "back of hand" is an upper limb.
    pub fn classify(location: &str) -> Self {
        let lower = location.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(|w| w.strip_suffix('s').filter(|s| s.len() > 2).unwrap_or(w))
            .collect();

        if words.iter().any(|w| *w == "limb" || *w == "extremity" || *w == "extremitie") {
            return if words.contains(&"lower") {
                BodyRegion::LowerLimb
            } else {
                BodyRegion::UpperLimb
            };
        }

        let mut found: Option<BodyRegion> = None;
        for word in &words {
            if let Some((_, region)) = REGION_KEYWORDS.iter().find(|(k, _)| k == word) {
                match region {
                    BodyRegion::UpperLimb | BodyRegion::LowerLimb => return *region,
                    _ => {
                        found.get_or_insert(*region);
                    }
                }
            }
        }
        found.unwrap_or(BodyRegion::Unclassified)
    }

    pub fn is_limb(&self) -> bool {
        matches!(self, BodyRegion::UpperLimb | BodyRegion::LowerLimb)
    }

    /// Circumferential burns only exist on limbs and the torso
    pub fn allows_circumferential(&self) -> bool {
        self.is_limb() || *self == BodyRegion::Torso
    }
}

/// What to do with a laterality value for a given body region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateralityRule {
    /// Split "bilateral" into a left row and a right row
    Expand,
    /// Keep laterality as reported, including "bilateral"
    Keep,
    /// Laterality does not apply; always null
    Clear,
}

/// Per-region laterality rules applied after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateralityPolicy {
    pub upper_limb: LateralityRule,
    pub lower_limb: LateralityRule,
    pub torso: LateralityRule,
    pub head_neck: LateralityRule,
    pub perineum: LateralityRule,
    pub unclassified: LateralityRule,
}

impl Default for LateralityPolicy {
    fn default() -> Self {
        Self {
            upper_limb: LateralityRule::Expand,
            lower_limb: LateralityRule::Expand,
            torso: LateralityRule::Clear,
            head_neck: LateralityRule::Clear,
            perineum: LateralityRule::Clear,
            unclassified: LateralityRule::Keep,
        }
    }
}

impl LateralityPolicy {
    pub fn rule_for(&self, region: BodyRegion) -> LateralityRule {
        match region {
            BodyRegion::UpperLimb => self.upper_limb,
            BodyRegion::LowerLimb => self.lower_limb,
            BodyRegion::Torso => self.torso,
            BodyRegion::HeadNeck => self.head_neck,
            BodyRegion::Perineum => self.perineum,
            BodyRegion::Unclassified => self.unclassified,
        }
    }
}

/// Deterministic cleanup of oracle burn locations
///
/// 1. Lowercase and trim the location; drop entries with no location
/// 2. Apply the region's laterality rule (expand bilateral, keep, or clear)
/// 3. Clear circumferential outside limbs and torso
/// 4. Collapse rows with the same (location, laterality) to the deepest burn
/// 5. Fold an unsided row into the sided rows of the same location, so a
///    location is either unsided or split by side, never both
///
/// Output keeps first-occurrence order.
pub fn normalize_burn_locations(
    entries: Vec<BurnLocationEntry>,
    policy: &LateralityPolicy,
) -> Vec<BurnLocationEntry> {
    let mut expanded = Vec::with_capacity(entries.len());

    for entry in entries {
        let location = entry.location.trim().to_lowercase();
        if location.is_empty() {
            continue;
        }
        let region = BodyRegion::classify(&location);
        let circumferential = if region.allows_circumferential() {
            entry.circumferential
        } else {
            None
        };
        let base = BurnLocationEntry {
            location,
            depth: entry.depth,
            laterality: entry.laterality,
            circumferential,
        };

        match (policy.rule_for(region), base.laterality) {
            (LateralityRule::Clear, _) => expanded.push(BurnLocationEntry {
                laterality: None,
                ..base
            }),
            (LateralityRule::Expand, Some(Laterality::Bilateral)) => {
                expanded.push(BurnLocationEntry {
                    laterality: Some(Laterality::Left),
                    ..base.clone()
                });
                expanded.push(BurnLocationEntry {
                    laterality: Some(Laterality::Right),
                    ..base
                });
            }
            _ => expanded.push(base),
        }
    }

    fold_unsided_rows(collapse_to_deepest(expanded))
}

fn collapse_to_deepest(entries: Vec<BurnLocationEntry>) -> Vec<BurnLocationEntry> {
    let mut kept: Vec<BurnLocationEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let existing = kept
            .iter_mut()
            .find(|k| k.location == entry.location && k.laterality == entry.laterality);

        match existing {
            Some(k) if entry.depth > k.depth => {
                let circumferential = entry.circumferential.or(k.circumferential);
                *k = BurnLocationEntry {
                    circumferential,
                    ..entry
                };
            }
            Some(k) => {
                k.circumferential = k.circumferential.or(entry.circumferential);
            }
            None => kept.push(entry),
        }
    }

    kept
}

fn fold_unsided_rows(entries: Vec<BurnLocationEntry>) -> Vec<BurnLocationEntry> {
    let sided: HashSet<String> = entries
        .iter()
        .filter(|e| e.laterality.is_some())
        .map(|e| e.location.clone())
        .collect();

    let (unsided, mut kept): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| e.laterality.is_none() && sided.contains(&e.location));

    for entry in unsided {
        for row in kept.iter_mut().filter(|k| k.location == entry.location) {
            row.depth = row.depth.max(entry.depth);
            row.circumferential = row.circumferential.or(entry.circumferential);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_ordering() {
        assert!(BurnDepth::FirstDegree < BurnDepth::SecondDegreeSuperficial);
        assert!(BurnDepth::SecondDegreeSuperficial < BurnDepth::SecondDegreeDeep);
        assert!(BurnDepth::SecondDegreeDeep < BurnDepth::ThirdDegree);
        assert!(BurnDepth::ThirdDegree < BurnDepth::FourthDegree);
    }

    #[test]
    fn test_parse_legacy_depth_names() {
        let json = r#"{"location": "face", "degree": "2nd degree deep", "laterality": null, "is_circumferential": false}"#;
        let entry: BurnLocationEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.depth, BurnDepth::SecondDegreeDeep);
        assert_eq!(entry.circumferential, Some(false));
    }

    #[test]
    fn test_tbsa_from_string() {
        let data: BurnInjury = serde_json::from_str(r#"{"tbsa": "~15%"}"#).unwrap();
        assert_eq!(data.tbsa, Some(15.0));

        let data: BurnInjury = serde_json::from_str(r#"{"tbsa": 22.5}"#).unwrap();
        assert_eq!(data.tbsa, Some(22.5));

        let data: BurnInjury = serde_json::from_str(r#"{"tbsa": null}"#).unwrap();
        assert_eq!(data.tbsa, None);

        assert!(serde_json::from_str::<BurnInjury>(r#"{"tbsa": "a lot"}"#).is_err());
    }

    #[test]
    fn test_burn_injury_defaults() {
        let data: BurnInjury = serde_json::from_str("{}").unwrap();
        assert!(!data.inhalation_injury);
        assert!(!data.mechanical_ventilation);
        assert!(data.burn_degree.is_empty());
        assert!(data.tbsa.is_none());
    }

    #[test]
    fn test_classify_regions() {
        assert_eq!(BodyRegion::classify("arm"), BodyRegion::UpperLimb);
        assert_eq!(BodyRegion::classify("Hands"), BodyRegion::UpperLimb);
        assert_eq!(BodyRegion::classify("back of hand"), BodyRegion::UpperLimb);
        assert_eq!(BodyRegion::classify("lower limb"), BodyRegion::LowerLimb);
        assert_eq!(BodyRegion::classify("thighs"), BodyRegion::LowerLimb);
        assert_eq!(BodyRegion::classify("anterior chest"), BodyRegion::Torso);
        assert_eq!(BodyRegion::classify("face"), BodyRegion::HeadNeck);
        assert_eq!(BodyRegion::classify("perineum"), BodyRegion::Perineum);
        assert_eq!(BodyRegion::classify("ear"), BodyRegion::Unclassified);
    }

    #[test]
    fn test_collapse_to_highest_depth() {
        let entries = vec![
            BurnLocationEntry::new("arm", BurnDepth::SecondDegreeSuperficial),
            BurnLocationEntry::new("arm", BurnDepth::ThirdDegree),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].location, "arm");
        assert_eq!(result[0].depth, BurnDepth::ThirdDegree);
    }

    #[test]
    fn test_collapse_keeps_deeper_first_entry() {
        let entries = vec![
            BurnLocationEntry::new("Face", BurnDepth::SecondDegreeDeep),
            BurnLocationEntry::new("face ", BurnDepth::FirstDegree),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].location, "face");
        assert_eq!(result[0].depth, BurnDepth::SecondDegreeDeep);
    }

    #[test]
    fn test_bilateral_expansion() {
        let entries = vec![BurnLocationEntry::new("leg", BurnDepth::SecondDegreeDeep)
            .with_laterality(Laterality::Bilateral)];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].laterality, Some(Laterality::Left));
        assert_eq!(result[1].laterality, Some(Laterality::Right));
        assert!(result.iter().all(|e| e.depth == BurnDepth::SecondDegreeDeep));
        assert!(result.iter().all(|e| e.location == "leg"));
    }

    #[test]
    fn test_bilateral_then_collapse_by_side() {
        let entries = vec![
            BurnLocationEntry::new("arm", BurnDepth::SecondDegreeSuperficial)
                .with_laterality(Laterality::Left),
            BurnLocationEntry::new("arm", BurnDepth::ThirdDegree)
                .with_laterality(Laterality::Bilateral),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].laterality, Some(Laterality::Left));
        assert_eq!(result[0].depth, BurnDepth::ThirdDegree);
        assert_eq!(result[1].laterality, Some(Laterality::Right));
    }

    #[test]
    fn test_unsided_row_folded_into_sided_rows() {
        let entries = vec![
            BurnLocationEntry::new("arm", BurnDepth::ThirdDegree),
            BurnLocationEntry::new("arm", BurnDepth::SecondDegreeSuperficial)
                .with_laterality(Laterality::Left),
            BurnLocationEntry::new("hand", BurnDepth::FirstDegree),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].location, "arm");
        assert_eq!(result[0].laterality, Some(Laterality::Left));
        assert_eq!(result[0].depth, BurnDepth::ThirdDegree);
        assert_eq!(result[1].location, "hand");
        assert_eq!(result[1].laterality, None);
    }

    #[test]
    fn test_unsided_row_never_lowers_sided_depth() {
        let entries = vec![
            BurnLocationEntry::new("leg", BurnDepth::SecondDegreeSuperficial),
            BurnLocationEntry::new("leg", BurnDepth::ThirdDegree)
                .with_laterality(Laterality::Bilateral),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.laterality.is_some()));
        assert!(result.iter().all(|e| e.depth == BurnDepth::ThirdDegree));
    }

    #[test]
    fn test_bilateral_kept_when_policy_says_keep() {
        let policy = LateralityPolicy {
            lower_limb: LateralityRule::Keep,
            ..Default::default()
        };
        let entries = vec![BurnLocationEntry::new("leg", BurnDepth::FirstDegree)
            .with_laterality(Laterality::Bilateral)];

        let result = normalize_burn_locations(entries, &policy);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].laterality, Some(Laterality::Bilateral));
    }

    #[test]
    fn test_laterality_cleared_on_torso_and_head() {
        let entries = vec![
            BurnLocationEntry::new("chest", BurnDepth::FirstDegree)
                .with_laterality(Laterality::Left),
            BurnLocationEntry::new("face", BurnDepth::FirstDegree)
                .with_laterality(Laterality::Bilateral),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.laterality.is_none()));
    }

    #[test]
    fn test_circumferential_only_on_limbs_and_torso() {
        let entries = vec![
            BurnLocationEntry::new("neck", BurnDepth::ThirdDegree).circumferential(),
            BurnLocationEntry::new("trunk", BurnDepth::ThirdDegree).circumferential(),
            BurnLocationEntry::new("forearm", BurnDepth::ThirdDegree).circumferential(),
        ];

        let result = normalize_burn_locations(entries, &LateralityPolicy::default());

        assert_eq!(result[0].circumferential, None);
        assert_eq!(result[1].circumferential, Some(true));
        assert_eq!(result[2].circumferential, Some(true));
    }

    #[test]
    fn test_empty_location_dropped() {
        let entries = vec![BurnLocationEntry::new("  ", BurnDepth::FirstDegree)];
        assert!(normalize_burn_locations(entries, &LateralityPolicy::default()).is_empty());
    }
}
