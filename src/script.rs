//! Scene scripts.
//!
//! A script is a list of instructions, one per line:
//!
//! ```text
//! looker [x y z] [x y z] width height
//! light [x y z]
//! sphere [x y z] radius
//! plane [x y z] <x y z>
//! ambient ratio
//! diffuse ratio
//! specular ratio exponent
//! reflexion ratio
//! ```
//!
//! Brackets only serve readability and are dropped before the parameters are
//! split on spaces. Empty lines and lines starting with `#` are skipped. The
//! surface instructions apply to the primitive defined right before them.

use log::debug;

use crate::error::{ TraceError, Result };
use crate::tuple::{ Point, Vector };
use crate::camera::Looker;
use crate::primitive::Primitive;
use crate::surface::Property;
use crate::scene::{ Scene, SceneBuilder };

/// The scene rendered when no scene file is given: one fully ambient sphere.
pub const DEFAULT_SCENE: &str = "\
looker [0 0 5] [0 0 0] 2 2
sphere [0 0 -5] 1
ambient 1
";

/// Parameters of a single instruction.
struct Parameters<'a> {
    tokens: std::vec::IntoIter<&'a str>,
    line: usize,
}

impl<'a> Parameters<'a> {
    fn new(instruction: &'a str, line: usize) -> Parameters<'a> {
        let tokens: Vec<&str> = instruction
            .split(|c| c == ' ' || c == '[' || c == ']' || c == '<' || c == '>')
            .filter(|t| !t.is_empty())
            .collect();

        Parameters { tokens: tokens.into_iter(), line }
    }

    fn error(&self, message: String) -> TraceError {
        TraceError::Parse { line: self.line, message }
    }

    fn next(&mut self) -> Result<&'a str> {
        match self.tokens.next() {
            Some(token) => Ok(token),
            None => Err(self.error("missing parameter".to_string())),
        }
    }

    fn next_f64(&mut self) -> Result<f64> {
        let token = self.next()?;
        token.parse::<f64>()
            .map_err(|_| self.error(format!("\"{}\" is not a number", token)))
    }

    fn next_point(&mut self) -> Result<Point> {
        Ok(Point::new(self.next_f64()?, self.next_f64()?, self.next_f64()?))
    }

    fn next_vector(&mut self) -> Result<Vector> {
        Ok(Vector::new(self.next_f64()?, self.next_f64()?, self.next_f64()?))
    }
}

/// Parses a whole script into a scene.
///
/// # Examples
///
/// ```
/// # use jraytracer::script;
/// let scene = script::parse(script::DEFAULT_SCENE).unwrap();
/// assert_eq!(scene.primitives().len(), 1);
/// assert!(scene.light().is_none());
///
/// assert!(script::parse("sphere [0 0 0] 1").is_err());
/// ```
pub fn parse(script: &str) -> Result<Scene> {
    parse_lines(script.lines())
}

/// Parses a sequence of instructions into a scene.
pub fn parse_lines<'a, I>(instructions: I) -> Result<Scene>
    where I: IntoIterator<Item = &'a str> {
    let mut builder = SceneBuilder::new();

    for (index, instruction) in instructions.into_iter().enumerate() {
        let instruction = instruction.trim();
        if instruction.is_empty() || instruction.starts_with('#') {
            continue;
        }

        parse_instruction(&mut builder, Parameters::new(instruction, index + 1))?;
    }

    builder.build()
}

fn parse_instruction(builder: &mut SceneBuilder, mut parameters: Parameters)
    -> Result<()> {
    let kind = parameters.next()?;
    debug!("Line {}: {}", parameters.line, kind);

    match kind {
        "looker" => {
            if builder.has_looker() {
                return Err(parameters.error("second looker defined".to_string()));
            }

            let looker = Looker::new(
                parameters.next_point()?,
                parameters.next_point()?,
                parameters.next_f64()?,
                parameters.next_f64()?,
            )?;
            builder.looker(looker)?;
        },

        "light" => {
            if builder.has_light() {
                return Err(parameters.error("second light defined".to_string()));
            }

            builder.light(parameters.next_point()?)?;
        },

        "sphere" => {
            let sphere = Primitive::sphere(
                parameters.next_point()?,
                parameters.next_f64()?,
            )?;
            builder.primitive(sphere);
        },

        "plane" => {
            let plane = Primitive::plane(
                parameters.next_point()?,
                parameters.next_vector()?,
            )?;
            builder.primitive(plane);
        },

        "ambient" => set(builder, &mut parameters, &[Property::AmbientRatio])?,
        "diffuse" => set(builder, &mut parameters, &[Property::DiffuseRatio])?,
        "reflexion" => set(builder, &mut parameters, &[Property::ReflexionRatio])?,
        "specular" => set(builder, &mut parameters,
            &[Property::SpecularRatio, Property::SpecularExponent])?,

        _ => return Err(parameters.error(format!("unknown type \"{}\"", kind))),
    }

    Ok(())
}

/// Reads one value per property and sets them on the last primitive.
fn set(builder: &mut SceneBuilder, parameters: &mut Parameters,
    properties: &[Property]) -> Result<()> {
    if !builder.property_allowed() {
        return Err(parameters.error("property not allowed here".to_string()));
    }

    for property in properties {
        let value = parameters.next_f64()?;
        builder.property(*property, value)?;
    }

    Ok(())
}

#[test]
fn parse_full_script() {
    let script = "
        # a lit sphere over a mirror
        looker [0 0 5] [0 0 0] 4 3
        light [10 10 10]

        sphere [0 0 -5] 1
        ambient 0.1
        specular 0.5 12
        plane [0 -1 0] <0 1 0>
        reflexion 0.8
    ";

    let scene = parse(script).unwrap();
    assert_eq!(scene.primitives().len(), 2);
    assert_eq!(scene.light(), Some(Point::new(10.0, 10.0, 10.0)));
    assert_eq!(scene.looker().position(), Point::new(0.0, 0.0, 5.0));

    let sphere = scene.primitives()[0].surface();
    assert_eq!(sphere.get(Property::AmbientRatio), 0.1);
    assert_eq!(sphere.get(Property::SpecularRatio), 0.5);
    assert_eq!(sphere.get(Property::SpecularExponent), 12.0);
    assert_eq!(sphere.get(Property::ReflexionRatio), 0.0);

    let plane = scene.primitives()[1].surface();
    assert_eq!(plane.get(Property::ReflexionRatio), 0.8);
}

#[test]
fn missing_looker_fails() {
    let r = parse("sphere [0 0 -5] 1\nlight [1 1 1]");

    assert!(matches!(r, Err(TraceError::Construction(_))));
}

#[test]
fn property_position_is_checked() {
    let before_primitive = "looker [0 0 5] [0 0 0] 2 2\nambient 1";
    assert!(matches!(parse(before_primitive),
        Err(TraceError::Parse { line: 2, .. })));

    let after_light = "sphere [0 0 0] 1\nlight [1 1 1]\ndiffuse 0.5\n\
        looker [0 0 5] [0 0 0] 2 2";
    assert!(matches!(parse(after_light),
        Err(TraceError::Parse { line: 3, .. })));

    let after_looker = "sphere [0 0 0] 1\nlooker [0 0 5] [0 0 0] 2 2\nambient 1";
    assert!(matches!(parse(after_looker),
        Err(TraceError::Parse { line: 3, .. })));
}

#[test]
fn duplicates_fail() {
    let two_lookers = "looker [0 0 5] [0 0 0] 2 2\nlooker [0 0 5] [0 0 0] 2 2";
    assert!(matches!(parse(two_lookers), Err(TraceError::Parse { .. })));

    let two_lights = "looker [0 0 5] [0 0 0] 2 2\nlight [1 1 1]\nlight [1 1 1]";
    assert!(matches!(parse(two_lights), Err(TraceError::Parse { .. })));

    let twice_ambient = "looker [0 0 5] [0 0 0] 2 2\nsphere [0 0 0] 1\n\
        ambient 0.5\nambient 0.5";
    assert!(matches!(parse(twice_ambient), Err(TraceError::State(_))));
}

#[test]
fn malformed_instructions_fail() {
    let looker = "looker [0 0 5] [0 0 0] 2 2\n";

    assert!(matches!(parse(&format!("{}cube [0 0 0] 1", looker)),
        Err(TraceError::Parse { line: 2, .. })));
    assert!(matches!(parse(&format!("{}sphere [0 0 0]", looker)),
        Err(TraceError::Parse { .. })));
    assert!(matches!(parse(&format!("{}sphere [0 x 0] 1", looker)),
        Err(TraceError::Parse { .. })));
    assert!(matches!(parse(&format!("{}sphere [0 0 0] -1", looker)),
        Err(TraceError::Construction(_))));
    assert!(matches!(parse(&format!("{}sphere [0 0 0] 1\nambient 2", looker)),
        Err(TraceError::Range(_))));
}

#[test]
fn parse_instruction_list() {
    let scene = parse_lines(vec![
        "looker [0 0 5] [0 0 0] 2 2",
        "plane [0 0 -10] <0 0 1>",
    ]).unwrap();

    assert_eq!(scene.primitives().len(), 1);
}
