//! Static "about" information.

use std::fmt;

use serde::Serialize;

/// Officer the journal belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Officer {
    /// Given name.
    pub first_name: &'static str,
    /// Family name.
    pub last_name: &'static str,
    /// Badge number.
    pub badge_number: &'static str,
}

/// Contents of the about screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct About {
    /// Application name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// What the application is for.
    pub purpose: &'static str,
    /// Journal owner.
    pub officer: Officer,
    /// Closing line.
    pub reflection: &'static str,
}

impl Default for About {
    fn default() -> Self {
        Self {
            name: "incidentlog",
            version: env!("CARGO_PKG_VERSION"),
            purpose: "Record and manage incidents during surveillance and security \
                      operations: date, title, description, a photo and an audio note \
                      for each entry, kept in a local database.",
            officer: Officer {
                first_name: "Juan",
                last_name: "Pérez",
                badge_number: "12345",
            },
            reflection: "Safety is everyone's responsibility. We work together to \
                         protect our community.",
        }
    }
}

impl fmt::Display for About {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "About {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "{}", self.purpose)?;
        writeln!(f)?;
        writeln!(f, "Version {}", self.version)?;
        writeln!(
            f,
            "Officer: {} {} (badge {})",
            self.officer.first_name, self.officer.last_name, self.officer.badge_number
        )?;
        writeln!(f)?;
        write!(f, "{}", self.reflection)
    }
}
