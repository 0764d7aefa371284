// ============================================================
// Layer 3 — Wavelet Coefficient Bands
// ============================================================
// A level-2 wavelet decomposition yields three coefficient
// series per recording: the approximation cA2 and the details
// cD1 and cD2. Feature files exist per band and are always
// combined in label order, so the derived Ord must match the
// lexical order of the labels.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    CA2,
    CD1,
    CD2,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::CA2, Band::CD1, Band::CD2];

    pub fn label(&self) -> &'static str {
        match self {
            Band::CA2 => "cA2",
            Band::CD1 => "cD1",
            Band::CD2 => "cD2",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .into_iter()
            .find(|b| b.label() == s)
            .ok_or_else(|| format!("unknown coefficient band '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_labels() {
        let mut labels: Vec<&str> = Band::ALL.iter().map(|b| b.label()).collect();
        labels.sort();
        let ordered: Vec<&str> = Band::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ordered);
    }

    #[test]
    fn test_parse() {
        assert_eq!("cD1".parse::<Band>().unwrap(), Band::CD1);
        assert!("cD3".parse::<Band>().is_err());
    }
}
