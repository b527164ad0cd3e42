//! Composition sample types
//!
//! A sample is the eight chromatographic percentages (%v/v) of a gasoline.
//! The oxygenate total `Ox` is always derived, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the derived oxygenate total
pub const OX_NAME: &str = "Ox";

/// Nominal total of a composition, in %v/v
pub const NOMINAL_TOTAL: f64 = 100.0;

/// One of the eight measured composition families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    #[serde(rename = "PARAFINAS")]
    Parafinas,
    #[serde(rename = "ISOPARAFINAS")]
    Isoparafinas,
    #[serde(rename = "OLEFINAS")]
    Olefinas,
    #[serde(rename = "NAFTENICOS")]
    Naftenicos,
    #[serde(rename = "AROMATICOS")]
    Aromaticos,
    #[serde(rename = "ETANOL")]
    Etanol,
    #[serde(rename = "MTBE")]
    Mtbe,
    #[serde(rename = "ETBE")]
    Etbe,
}

impl Component {
    /// All components in canonical order
    pub const ALL: [Component; 8] = [
        Component::Parafinas,
        Component::Isoparafinas,
        Component::Olefinas,
        Component::Naftenicos,
        Component::Aromaticos,
        Component::Etanol,
        Component::Mtbe,
        Component::Etbe,
    ];

    /// Oxygenates summed into `Ox`
    pub const OXYGENATES: [Component; 3] = [Component::Etanol, Component::Mtbe, Component::Etbe];

    /// Hydrocarbon families counted directly in the component sum
    pub const HYDROCARBONS: [Component; 5] = [
        Component::Parafinas,
        Component::Isoparafinas,
        Component::Olefinas,
        Component::Naftenicos,
        Component::Aromaticos,
    ];

    /// Canonical (ASCII, upper-case) name
    pub fn name(&self) -> &'static str {
        match self {
            Component::Parafinas => "PARAFINAS",
            Component::Isoparafinas => "ISOPARAFINAS",
            Component::Olefinas => "OLEFINAS",
            Component::Naftenicos => "NAFTENICOS",
            Component::Aromaticos => "AROMATICOS",
            Component::Etanol => "ETANOL",
            Component::Mtbe => "MTBE",
            Component::Etbe => "ETBE",
        }
    }

    /// Display label with accents, as shown to operators
    pub fn label(&self) -> &'static str {
        match self {
            Component::Naftenicos => "NAFTÉNICOS",
            Component::Aromaticos => "AROMÁTICOS",
            other => other.name(),
        }
    }

    /// Resolve a user-supplied name.
    ///
    /// Matching ignores case, surrounding whitespace and the accents used
    /// in `NAFTÉNICOS` / `AROMÁTICOS`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                'É' | 'é' => 'E',
                'Á' | 'á' => 'A',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        Component::ALL
            .iter()
            .copied()
            .find(|c| c.name() == normalized)
    }

    /// Whether this component contributes to `Ox`
    pub fn is_oxygenate(&self) -> bool {
        Component::OXYGENATES.contains(self)
    }

    /// Typical range shown as a hint while prompting (not validated)
    pub fn typical_range(&self) -> (f64, f64) {
        match self {
            Component::Parafinas => (5.5, 16.2),
            Component::Isoparafinas => (22.5, 43.9),
            Component::Olefinas => (2.3, 13.8),
            Component::Naftenicos => (2.0, 14.5),
            Component::Aromaticos => (26.5, 48.9),
            Component::Etanol => (0.0, 4.9),
            Component::Mtbe => (0.0, 14.3),
            Component::Etbe => (0.0, 7.9),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A model input variable: a measured component or the derived `Ox`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Variable {
    Component(Component),
    Ox,
}

impl Variable {
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Component(c) => c.name(),
            Variable::Ox => OX_NAME,
        }
    }

    /// Resolve a variable name (components or `Ox`)
    pub fn from_name(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case(OX_NAME) {
            return Some(Variable::Ox);
        }
        Component::from_name(name).map(Variable::Component)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Component> for Variable {
    fn from(c: Component) -> Self {
        Variable::Component(c)
    }
}

impl From<Variable> for String {
    fn from(v: Variable) -> Self {
        v.name().to_string()
    }
}

impl TryFrom<String> for Variable {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Variable::from_name(&value).ok_or_else(|| format!("unknown variable: {}", value))
    }
}

/// Validated composition of one gasoline sample, in %v/v
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositionSample {
    #[serde(rename = "PARAFINAS")]
    pub parafinas: f64,
    #[serde(rename = "ISOPARAFINAS")]
    pub isoparafinas: f64,
    #[serde(rename = "OLEFINAS")]
    pub olefinas: f64,
    #[serde(rename = "NAFTENICOS")]
    pub naftenicos: f64,
    #[serde(rename = "AROMATICOS")]
    pub aromaticos: f64,
    #[serde(rename = "ETANOL")]
    pub etanol: f64,
    #[serde(rename = "MTBE")]
    pub mtbe: f64,
    #[serde(rename = "ETBE")]
    pub etbe: f64,
}

impl CompositionSample {
    /// Reference sample used by the "example" menu entries
    pub fn example() -> Self {
        Self {
            parafinas: 10.5,
            isoparafinas: 32.0,
            olefinas: 8.5,
            naftenicos: 6.2,
            aromaticos: 38.0,
            etanol: 4.8,
            mtbe: 0.0,
            etbe: 0.0,
        }
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Parafinas => self.parafinas,
            Component::Isoparafinas => self.isoparafinas,
            Component::Olefinas => self.olefinas,
            Component::Naftenicos => self.naftenicos,
            Component::Aromaticos => self.aromaticos,
            Component::Etanol => self.etanol,
            Component::Mtbe => self.mtbe,
            Component::Etbe => self.etbe,
        }
    }

    pub fn set(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::Parafinas => &mut self.parafinas,
            Component::Isoparafinas => &mut self.isoparafinas,
            Component::Olefinas => &mut self.olefinas,
            Component::Naftenicos => &mut self.naftenicos,
            Component::Aromaticos => &mut self.aromaticos,
            Component::Etanol => &mut self.etanol,
            Component::Mtbe => &mut self.mtbe,
            Component::Etbe => &mut self.etbe,
        };
        *slot = value;
    }

    /// Builder-style setter
    pub fn with(mut self, component: Component, value: f64) -> Self {
        self.set(component, value);
        self
    }

    /// Total oxygenates: ETANOL + MTBE + ETBE
    pub fn ox(&self) -> f64 {
        self.etanol + self.mtbe + self.etbe
    }

    /// Value of any model variable, deriving `Ox` on demand
    pub fn value(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Component(c) => self.get(c),
            Variable::Ox => self.ox(),
        }
    }

    /// Hydrocarbon families plus `Ox`; nominally 100
    pub fn component_sum(&self) -> f64 {
        Component::HYDROCARBONS
            .iter()
            .map(|c| self.get(*c))
            .sum::<f64>()
            + self.ox()
    }

    /// (component, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Component, f64)> + '_ {
        Component::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}
