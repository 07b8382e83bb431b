use crate::error::{ TraceError, Result };

/// The material properties a surface can carry.
///
/// Each property has a legal range and a default that is reported while it
/// has not been set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    AmbientRatio,
    DiffuseRatio,
    SpecularRatio,
    SpecularExponent,
    ReflexionRatio,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::AmbientRatio,
        Property::DiffuseRatio,
        Property::SpecularRatio,
        Property::SpecularExponent,
        Property::ReflexionRatio,
    ];

    /// Inclusive `(min, max)` range of legal values.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Property::SpecularExponent => (0.0, 1000.0),
            _ => (0.0, 1.0),
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            Property::AmbientRatio => 0.05,
            Property::DiffuseRatio => 0.95,
            Property::SpecularRatio => 0.0,
            Property::SpecularExponent => 30.0,
            Property::ReflexionRatio => 0.0,
        }
    }

    pub fn is_valid_value(&self, value: f64) -> bool {
        let (min, max) = self.range();
        min <= value && value <= max
    }
}

/// The material of a primitive.
///
/// A record with one slot per `Property`. Every slot can be written exactly
/// once, while the scene is assembled; afterwards the surface is only read.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Surface {
    ambient_ratio: Option<f64>,
    diffuse_ratio: Option<f64>,
    specular_ratio: Option<f64>,
    specular_exponent: Option<f64>,
    reflexion_ratio: Option<f64>,
}

impl Surface {
    pub fn new() -> Surface {
        Default::default()
    }

    fn slot(&self, property: Property) -> &Option<f64> {
        match property {
            Property::AmbientRatio => &self.ambient_ratio,
            Property::DiffuseRatio => &self.diffuse_ratio,
            Property::SpecularRatio => &self.specular_ratio,
            Property::SpecularExponent => &self.specular_exponent,
            Property::ReflexionRatio => &self.reflexion_ratio,
        }
    }

    fn slot_mut(&mut self, property: Property) -> &mut Option<f64> {
        match property {
            Property::AmbientRatio => &mut self.ambient_ratio,
            Property::DiffuseRatio => &mut self.diffuse_ratio,
            Property::SpecularRatio => &mut self.specular_ratio,
            Property::SpecularExponent => &mut self.specular_exponent,
            Property::ReflexionRatio => &mut self.reflexion_ratio,
        }
    }

    /// Reads a property, falling back to its default if it was never set.
    pub fn get(&self, property: Property) -> f64 {
        self.slot(property).unwrap_or_else(|| property.default_value())
    }

    pub fn is_set(&self, property: Property) -> bool {
        self.slot(property).is_some()
    }

    /// Sets a property.
    ///
    /// Fails with a range error if `value` is outside of the property's range
    /// and with a state error if the property already has a value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use jraytracer::surface::{ Surface, Property };
    /// let mut s = Surface::new();
    /// assert_eq!(s.get(Property::AmbientRatio), 0.05);
    ///
    /// s.set(Property::AmbientRatio, 1.0).unwrap();
    /// assert_eq!(s.get(Property::AmbientRatio), 1.0);
    /// assert!(s.set(Property::AmbientRatio, 0.5).is_err());
    /// ```
    pub fn set(&mut self, property: Property, value: f64) -> Result<()> {
        if !property.is_valid_value(value) {
            let (min, max) = property.range();
            return Err(TraceError::Range(format!(
                "{:?} must be within {} and {}, got {}",
                property, min, max, value
            )));
        }

        let slot = self.slot_mut(property);
        if slot.is_some() {
            return Err(TraceError::State(format!(
                "{:?} is already set", property
            )));
        }

        *slot = Some(value);
        Ok(())
    }
}

#[test]
fn unset_properties_report_defaults() {
    let s = Surface::new();

    assert_eq!(s.get(Property::AmbientRatio), 0.05);
    assert_eq!(s.get(Property::DiffuseRatio), 0.95);
    assert_eq!(s.get(Property::SpecularRatio), 0.0);
    assert_eq!(s.get(Property::SpecularExponent), 30.0);
    assert_eq!(s.get(Property::ReflexionRatio), 0.0);

    for p in Property::ALL.iter() {
        assert!(!s.is_set(*p));
    }
}

#[test]
fn set_each_property_once() {
    let mut s = Surface::new();
    for (i, p) in Property::ALL.iter().enumerate() {
        let value = 0.1 * i as f64;
        s.set(*p, value).unwrap();
        assert_eq!(s.get(*p), value);
        assert!(s.is_set(*p));
    }
}

#[test]
fn second_set_is_state_error() {
    let mut s = Surface::new();
    s.set(Property::ReflexionRatio, 0.5).unwrap();

    let again = s.set(Property::ReflexionRatio, 0.5);
    assert!(matches!(again, Err(TraceError::State(_))));
    assert_eq!(s.get(Property::ReflexionRatio), 0.5);
}

#[test]
fn out_of_range_is_range_error() {
    let mut s = Surface::new();

    assert!(matches!(s.set(Property::DiffuseRatio, 1.5),
        Err(TraceError::Range(_))));
    assert!(matches!(s.set(Property::SpecularExponent, -1.0),
        Err(TraceError::Range(_))));
    assert!(matches!(s.set(Property::SpecularExponent, 1000.5),
        Err(TraceError::Range(_))));

    // A rejected value does not consume the single write.
    s.set(Property::SpecularExponent, 1000.0).unwrap();
    assert_eq!(s.get(Property::SpecularExponent), 1000.0);
}
