use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Elemental tag carried by abilities and used for resistance lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// Sentinel for damage that bypasses every resistance table.
    None,
    /// Base fire element.
    Fire,
    /// Base frost element.
    Frost,
    /// Base lightning element.
    Lightning,
    /// Base earth element.
    Earth,
    /// Fire combined with earth.
    Lava,
    /// Fire combined with frost.
    Steam,
    /// Fire combined with lightning.
    Plasma,
    /// Frost combined with lightning.
    Blizzard,
    /// Frost combined with earth.
    Permafrost,
    /// Lightning combined with earth.
    Magnetism,
}

impl Element {
    /// Elements that can be equipped directly and combined into derived elements.
    pub const BASE: [Element; 4] = [
        Element::Fire,
        Element::Frost,
        Element::Lightning,
        Element::Earth,
    ];

    /// Reports whether the element is one of the four base elements.
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(
            self,
            Self::Fire | Self::Frost | Self::Lightning | Self::Earth
        )
    }

    /// Lowercase tag used in content files and log output.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fire => "fire",
            Self::Frost => "frost",
            Self::Lightning => "lightning",
            Self::Earth => "earth",
            Self::Lava => "lava",
            Self::Steam => "steam",
            Self::Plasma => "plasma",
            Self::Blizzard => "blizzard",
            Self::Permafrost => "permafrost",
            Self::Magnetism => "magnetism",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-enemy multipliers applied to incoming elemental damage.
///
/// A multiplier of `1.0` is neutral, values below `1.0` resist the element and
/// values above `1.0` expose a weakness. Elements absent from the table are
/// treated as neutral.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementResistances {
    multipliers: BTreeMap<Element, f32>,
}

impl ElementResistances {
    /// Creates an empty, fully neutral table.
    #[must_use]
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Returns the table with the multiplier for `element` replaced.
    #[must_use]
    pub fn with(mut self, element: Element, multiplier: f32) -> Self {
        let _ = self.multipliers.insert(element, multiplier);
        self
    }

    /// Multiplier registered for the element, if any.
    #[must_use]
    pub fn multiplier(&self, element: Element) -> Option<f32> {
        self.multipliers.get(&element).copied()
    }

    /// Returns a copy where every listed multiplier, and every base element
    /// not yet listed, is scaled by `factor`.
    #[must_use]
    pub fn hardened(&self, factor: f32) -> Self {
        let mut multipliers = self.multipliers.clone();
        for element in Element::BASE {
            let _ = multipliers.entry(element).or_insert(1.0);
        }
        for value in multipliers.values_mut() {
            *value *= factor;
        }
        Self { multipliers }
    }

    /// Iterator over the registered element multipliers in element order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, f32)> + '_ {
        self.multipliers
            .iter()
            .map(|(element, multiplier)| (*element, *multiplier))
    }
}

/// Resolves the final damage dealt by `base_amount` of `element` damage.
///
/// `Element::None` and elements missing from the table pass through unchanged.
#[must_use]
pub fn resolve_damage(base_amount: f32, element: Element, table: &ElementResistances) -> f32 {
    if element == Element::None {
        return base_amount;
    }

    match table.multiplier(element) {
        Some(multiplier) => base_amount * multiplier,
        None => base_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_content_spelling() {
        #[derive(Deserialize)]
        struct Tagged {
            element: Element,
        }

        for element in [
            Element::None,
            Element::Fire,
            Element::Frost,
            Element::Lightning,
            Element::Earth,
            Element::Lava,
            Element::Steam,
            Element::Plasma,
            Element::Blizzard,
            Element::Permafrost,
            Element::Magnetism,
        ] {
            let source = format!("element = \"{element}\"");
            let parsed: Tagged = toml::from_str(&source).expect("tag parses");
            assert_eq!(parsed.element, element);
        }
        assert_eq!(Element::Permafrost.tag(), "permafrost");
    }

    #[test]
    fn resisted_element_scales_damage_down() {
        let table = ElementResistances::neutral().with(Element::Fire, 0.2);
        assert!((resolve_damage(10.0, Element::Fire, &table) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn none_element_bypasses_table() {
        let table = ElementResistances::neutral();
        assert_eq!(resolve_damage(10.0, Element::None, &table), 10.0);

        let weak = ElementResistances::neutral().with(Element::None, 3.0);
        assert_eq!(resolve_damage(10.0, Element::None, &weak), 10.0);
    }

    #[test]
    fn missing_element_is_neutral() {
        let table = ElementResistances::neutral().with(Element::Frost, 1.5);
        assert_eq!(resolve_damage(8.0, Element::Lava, &table), 8.0);
        assert!((resolve_damage(8.0, Element::Frost, &table) - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn hardened_fills_base_elements() {
        let table = ElementResistances::neutral()
            .with(Element::Frost, 1.5)
            .hardened(0.5);
        assert_eq!(table.multiplier(Element::Fire), Some(0.5));
        assert_eq!(table.multiplier(Element::Frost), Some(0.75));
        assert_eq!(table.multiplier(Element::Lava), None);
    }

    #[test]
    fn base_classification() {
        assert!(Element::Earth.is_base());
        assert!(!Element::Lava.is_base());
        assert!(!Element::None.is_base());
    }
}
