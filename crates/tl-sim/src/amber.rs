//! Amber synthesis between two green settings.
//!
//! Per stream, old aspect to new aspect:
//!
//! | old     | new     | amber |
//! |---------|---------|-------|
//! | `r`     | `r`     | `r`   |
//! | `r`     | `g`/`G` | `r`   |
//! | `g`/`G` | `r`     | `y`   |
//! | `g`/`G` | `g`/`G` | old   |
//!
//! Streams only open once the amber has elapsed, so nothing turns green
//! here. Any other pairing means the phase table is inconsistent.

use tl_graph::{Light, LightString};

use crate::error::{SimError, SimResult};

/// Bridging setting plus whether the two greens were identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmberTransition {
    pub lights: LightString,
    /// Old and new settings are the same; the amber collapses to one tick.
    pub unchanged: bool,
}

impl AmberTransition {
    /// Amber duration in seconds.
    pub fn duration(&self, amber_ticks: u32, dt: f64) -> f64 {
        if self.unchanged {
            dt
        } else {
            f64::from(amber_ticks) * dt
        }
    }
}

/// Build the light string shown between `old` and `new`.
pub fn synthesize(old: &LightString, new: &LightString) -> SimResult<AmberTransition> {
    if old.len() != new.len() {
        return Err(SimError::LightLength {
            expected: old.len(),
            found: new.len(),
        });
    }
    if old == new {
        return Ok(AmberTransition {
            lights: new.clone(),
            unchanged: true,
        });
    }

    let lights = old
        .iter()
        .zip(new.iter())
        .enumerate()
        .map(|(stream, (from, to))| {
            bridge(from, to).ok_or_else(|| SimError::AmberTransition {
                stream,
                from: from.as_char(),
                to: to.as_char(),
            })
        })
        .collect::<SimResult<LightString>>()?;

    Ok(AmberTransition {
        lights,
        unchanged: false,
    })
}

fn bridge(from: Light, to: Light) -> Option<Light> {
    use Light::*;
    match (from, to) {
        (Red, Red | GreenMinor | GreenMajor) => Some(Red),
        (GreenMinor | GreenMajor, Red) => Some(Yellow),
        (GreenMinor | GreenMajor, GreenMinor | GreenMajor) => Some(from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ls(s: &str) -> LightString {
        s.parse().unwrap()
    }

    #[test]
    fn closing_streams_turn_yellow() {
        let amber = synthesize(&ls("GGrr"), &ls("rrGG")).unwrap();
        assert_eq!(amber.lights.to_string(), "yyrr");
        assert!(!amber.unchanged);
        assert_eq!(amber.duration(5, 0.1), 0.5);
    }

    #[test]
    fn open_streams_keep_old_aspect() {
        let amber = synthesize(&ls("gGGr"), &ls("Ggrg")).unwrap();
        assert_eq!(amber.lights.to_string(), "gGyr");
    }

    #[test]
    fn identical_settings_collapse_to_one_tick() {
        let amber = synthesize(&ls("GgrG"), &ls("GgrG")).unwrap();
        assert!(amber.unchanged);
        assert_eq!(amber.lights.to_string(), "GgrG");
        assert_eq!(amber.duration(5, 0.1), 0.1);
    }

    #[test]
    fn yellow_input_is_a_configuration_error() {
        let err = synthesize(&ls("yr"), &ls("Gr")).unwrap_err();
        assert!(matches!(
            err,
            SimError::AmberTransition {
                stream: 0,
                from: 'y',
                to: 'G'
            }
        ));
    }

    #[test]
    fn length_mismatch_rejected() {
        assert!(matches!(
            synthesize(&ls("Gr"), &ls("Grr")),
            Err(SimError::LightLength { expected: 2, found: 3 })
        ));
    }
}
