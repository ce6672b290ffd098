// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.

//! Closed DSL-level error kinds. Everything above the DSL boundary wraps
//! these in `anyhow::Error` via `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DslError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("'{0}' is a reserved name and cannot be assigned")]
    ReservedName(String),

    #[error("{0} is always above the horizon for this observer")]
    EphemerisAlwaysUp(String),

    #[error("{0} is never above the horizon for this observer")]
    EphemerisNeverUp(String),

    #[error("ephemeris error: {0}")]
    EphemerisOther(String),

    #[error("could not parse date '{0}'")]
    DateParse(String),

    #[error("interrupted")]
    Interrupt,
}

impl From<orrery::EphemerisError> for DslError {
    fn from(e: orrery::EphemerisError) -> Self {
        match e {
            orrery::EphemerisError::AlwaysUp(name) => DslError::EphemerisAlwaysUp(name),
            orrery::EphemerisError::NeverUp(name) => DslError::EphemerisNeverUp(name),
            orrery::EphemerisError::UnknownBody(name) => DslError::UnknownName(name),
            orrery::EphemerisError::Other(msg) => DslError::EphemerisOther(msg),
        }
    }
}
