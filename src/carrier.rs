use crate::constants::SPEED_OF_LIGHT_M_S;

use gnss::prelude::Constellation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unknown or invalid [Carrier] description
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown carrier \"{0}\"")]
pub struct ParsingError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS/QZSS/SBAS) same frequency as E1 and B1aB1c
    #[default]
    L1,
    /// L2 (GPS/QZSS)
    L2,
    /// L5 (GPS/QZSS/SBAS/IRNSS) same frequency as E5A and B2A
    L5,
    /// L6 (QZSS) same frequency as E6
    L6,
    /// E1 (Galileo)
    E1,
    /// E5 (Galileo) same frequency as B2
    E5,
    /// E5A (Galileo) same frequency as L5
    E5A,
    /// E5B (Galileo) same frequency as B2iB2b
    E5B,
    /// E6 (Galileo) same frequency as L6
    E6,
    /// B1aB1c (BDS) same frequency as L1
    B1aB1c,
    /// B1I (BDS)
    B1I,
    /// B2I/B2B (BDS) same frequency as E5b
    B2iB2b,
    /// B2 (BDS) same frequency as E5
    B2,
    /// B2A (BDS) same frequency as L5 and E5A
    B2A,
    /// B3 (BDS)
    B3,
    /// G1 (Glonass FDMA)
    G1,
    /// G2 (Glonass FDMA)
    G2,
    /// G3 (Glonass CDMA)
    G3,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
            Self::L6 => write!(f, "L6"),
            Self::E1 => write!(f, "E1"),
            Self::E5 => write!(f, "E5"),
            Self::E5A => write!(f, "E5A"),
            Self::E5B => write!(f, "E5B"),
            Self::E6 => write!(f, "E6"),
            Self::B1I => write!(f, "B1I"),
            Self::B1aB1c => write!(f, "B1A/B1C"),
            Self::B2iB2b => write!(f, "B2I/B2B"),
            Self::B2 => write!(f, "B2"),
            Self::B3 => write!(f, "B3"),
            Self::B2A => write!(f, "B2A"),
            Self::G1 => write!(f, "G1"),
            Self::G2 => write!(f, "G2"),
            Self::G3 => write!(f, "G3"),
        }
    }
}

impl std::str::FromStr for Carrier {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().to_uppercase();
        match c.as_str() {
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L5" => Ok(Self::L5),
            "L6" => Ok(Self::L6),
            "E1" => Ok(Self::E1),
            "E5" => Ok(Self::E5),
            "E5A" => Ok(Self::E5A),
            "E5B" => Ok(Self::E5B),
            "E6" => Ok(Self::E6),
            "B1I" => Ok(Self::B1I),
            "B1A/B1C" | "B1C" => Ok(Self::B1aB1c),
            "B2I/B2B" | "B2I" | "B2B" => Ok(Self::B2iB2b),
            "B2" => Ok(Self::B2),
            "B2A" => Ok(Self::B2A),
            "B3" => Ok(Self::B3),
            "G1" => Ok(Self::G1),
            "G2" => Ok(Self::G2),
            "G3" => Ok(Self::G3),
            _ => Err(ParsingError(c)),
        }
    }
}

impl Carrier {
    /// True for Glonass FDMA bands, where the actual frequency
    /// depends on the satellite frequency channel.
    pub fn is_fdma(&self) -> bool {
        matches!(self, Self::G1 | Self::G2)
    }

    /// Returns carrier frequency in Hz. FDMA bands need the
    /// satellite frequency channel number `k` (-7..=6) and return
    /// None without it.
    pub fn frequency_hz(&self, channel: Option<i8>) -> Option<f64> {
        match self {
            Self::L1 | Self::E1 | Self::B1aB1c => Some(1575.42E6_f64),
            Self::L2 => Some(1227.60E6_f64),
            Self::L5 | Self::E5A | Self::B2A => Some(1176.45E6_f64),
            Self::E5 | Self::B2 => Some(1191.795E6_f64),
            Self::L6 | Self::E6 => Some(1278.750E6_f64),
            Self::B3 => Some(1268.52E6_f64),
            Self::E5B | Self::B2iB2b => Some(1207.14E6_f64),
            Self::B1I => Some(1561.098E6_f64),
            Self::G3 => Some(1202.025E6_f64),
            Self::G1 => channel.map(|k| 1602.0E6 + k as f64 * 0.5625E6),
            Self::G2 => channel.map(|k| 1246.0E6 + k as f64 * 0.4375E6),
        }
    }

    /// Returns carrier wavelength in meters.
    pub fn wavelength_m(&self, channel: Option<i8>) -> Option<f64> {
        self.frequency_hz(channel)
            .map(|freq_hz| SPEED_OF_LIGHT_M_S / freq_hz)
    }

    /// True if this [Carrier] is transmitted by this [Constellation].
    pub fn is_transmitted_by(&self, constellation: Constellation) -> bool {
        match constellation {
            Constellation::GPS => matches!(self, Self::L1 | Self::L2 | Self::L5),
            Constellation::QZSS => matches!(self, Self::L1 | Self::L2 | Self::L5 | Self::L6),
            Constellation::Galileo => matches!(
                self,
                Self::E1 | Self::E5 | Self::E5A | Self::E5B | Self::E6
            ),
            Constellation::BeiDou => matches!(
                self,
                Self::B1I | Self::B1aB1c | Self::B2iB2b | Self::B2 | Self::B2A | Self::B3
            ),
            Constellation::Glonass => matches!(self, Self::G1 | Self::G2 | Self::G3),
            Constellation::IRNSS => matches!(self, Self::L5),
            c if c.is_sbas() => matches!(self, Self::L1 | Self::L5),
            _ => false,
        }
    }
}
