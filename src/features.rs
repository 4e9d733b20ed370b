//! Experimental parameters collected by the input form
//!
//! The order of [`Feature::ALL`] is the column order the model was trained on.

/// Number of inputs the model expects per row
pub const FEATURE_COUNT: usize = 6;

/// One experimental parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    AdditiveVolume,
    Temperature,
    ReactionTime,
    IncubationTime,
    ImidazoleConcentration,
    ImidazoleVolume,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::AdditiveVolume,
        Feature::Temperature,
        Feature::ReactionTime,
        Feature::IncubationTime,
        Feature::ImidazoleConcentration,
        Feature::ImidazoleVolume,
    ];

    /// Column position in the model input
    pub fn index(self) -> usize {
        match self {
            Feature::AdditiveVolume => 0,
            Feature::Temperature => 1,
            Feature::ReactionTime => 2,
            Feature::IncubationTime => 3,
            Feature::ImidazoleConcentration => 4,
            Feature::ImidazoleVolume => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::AdditiveVolume => "Volume of KH550 (mL)",
            Feature::Temperature => "Temperature (°C)",
            Feature::ReactionTime => "Reaction time (h)",
            Feature::IncubationTime => "Protein incubation time (h)",
            Feature::ImidazoleConcentration => "Imidazole concentration (mM)",
            Feature::ImidazoleVolume => "Volume of imidazole (µL)",
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            Feature::AdditiveVolume => 1.0,
            Feature::Temperature => 60.0,
            Feature::ReactionTime => 6.0,
            Feature::IncubationTime => 2.0,
            Feature::ImidazoleConcentration => 500.0,
            Feature::ImidazoleVolume => 500.0,
        }
    }

    /// Drag speed for the input widget, scaled to the magnitude of the default
    pub fn drag_speed(self) -> f64 {
        match self {
            Feature::ImidazoleConcentration | Feature::ImidazoleVolume => 1.0,
            Feature::Temperature => 0.5,
            _ => 0.1,
        }
    }
}

/// Current values of all six inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: Feature::ALL.map(Feature::default_value),
        }
    }
}

impl FeatureVector {
    /// Mutable slot for binding to an input widget
    pub fn value_mut(&mut self, feature: Feature) -> &mut f64 {
        &mut self.values[feature.index()]
    }

    /// Values in model column order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        self.values
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_column_order() {
        let v = FeatureVector::default();
        assert_eq!(v.as_array(), [1.0, 60.0, 6.0, 2.0, 500.0, 500.0]);
        assert!(v.is_default());
    }

    #[test]
    fn indices_are_a_permutation_of_columns() {
        let mut seen = [false; FEATURE_COUNT];
        for (pos, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), pos);
            seen[f.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn set_touches_only_one_column() {
        let mut v = FeatureVector::default();
        *v.value_mut(Feature::ReactionTime) = 12.5;
        let arr = v.as_array();
        assert_eq!(arr[2], 12.5);
        assert_eq!(arr, [1.0, 60.0, 12.5, 2.0, 500.0, 500.0]);
        assert!(!v.is_default());
    }

    #[test]
    fn value_mut_binds_to_the_right_slot() {
        let mut v = FeatureVector::default();
        *v.value_mut(Feature::ImidazoleVolume) = -3.0;
        assert_eq!(v.as_array()[5], -3.0);
        assert_eq!(v.as_array()[4], 500.0);
    }
}
