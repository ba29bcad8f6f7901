//! Signal aspects and light-setting strings.
//!
//! A light string carries one character per stream, in stream-index order:
//! `r` red, `y` amber, `g` green but give way, `G` green with priority.

use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

/// One signal aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Light {
    Red,
    Yellow,
    /// Green, must give way to conflicting priority traffic.
    GreenMinor,
    /// Green with priority.
    GreenMajor,
}

impl Light {
    pub fn as_char(self) -> char {
        match self {
            Light::Red => 'r',
            Light::Yellow => 'y',
            Light::GreenMinor => 'g',
            Light::GreenMajor => 'G',
        }
    }

    pub fn from_char(code: char) -> Result<Self, GraphError> {
        match code {
            'r' => Ok(Light::Red),
            'y' => Ok(Light::Yellow),
            'g' => Ok(Light::GreenMinor),
            'G' => Ok(Light::GreenMajor),
            _ => Err(GraphError::InvalidLight { code }),
        }
    }

    /// Whether traffic may enter the junction on this aspect.
    pub fn is_open(self) -> bool {
        matches!(self, Light::GreenMinor | Light::GreenMajor)
    }

    /// Rank in the phase alphabet `r < g < G`. Amber never appears in a phase.
    fn rank(self) -> u8 {
        match self {
            Light::Red | Light::Yellow => 0,
            Light::GreenMinor => 1,
            Light::GreenMajor => 2,
        }
    }

    /// Pick the dominating aspect among candidate proposals.
    ///
    /// `r` dominates `g`, which dominates `G`: a stream that must stop or give
    /// way for any compatible stream shows that aspect.
    pub fn dominant(choices: impl IntoIterator<Item = Light>) -> Option<Light> {
        choices.into_iter().min_by_key(|light| light.rank())
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Light setting for a whole junction, indexed by stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LightString(Vec<Light>);

impl LightString {
    pub fn new(lights: Vec<Light>) -> Self {
        Self(lights)
    }

    /// All streams red.
    pub fn all_red(len: usize) -> Self {
        Self(vec![Light::Red; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, stream: usize) -> Option<Light> {
        self.0.get(stream).copied()
    }

    pub fn as_slice(&self) -> &[Light] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Light> + '_ {
        self.0.iter().copied()
    }

    /// Indices of streams that are open (green of either kind).
    pub fn open_streams(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, light)| light.is_open())
            .map(|(i, _)| i)
    }
}

impl fmt::Display for LightString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for light in &self.0 {
            write!(f, "{}", light.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for LightString {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(Light::from_char)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl FromIterator<Light> for LightString {
    fn from_iter<T: IntoIterator<Item = Light>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let lights: LightString = "rgGy".parse().unwrap();
        assert_eq!(lights.len(), 4);
        assert_eq!(lights.get(2), Some(Light::GreenMajor));
        assert_eq!(lights.to_string(), "rgGy");
    }

    #[test]
    fn parse_rejects_unknown_aspect() {
        let err = "rgx".parse::<LightString>().unwrap_err();
        assert_eq!(err, GraphError::InvalidLight { code: 'x' });
    }

    #[test]
    fn dominant_prefers_most_restrictive() {
        use Light::*;
        assert_eq!(Light::dominant([GreenMajor, GreenMinor]), Some(GreenMinor));
        assert_eq!(Light::dominant([GreenMajor, Red, GreenMinor]), Some(Red));
        assert_eq!(Light::dominant([GreenMajor]), Some(GreenMajor));
        assert_eq!(Light::dominant([]), None);
    }

    #[test]
    fn open_streams_skip_red_and_amber() {
        let lights: LightString = "GryGg".parse().unwrap();
        let open: Vec<usize> = lights.open_streams().collect();
        assert_eq!(open, vec![0, 3, 4]);
    }
}
