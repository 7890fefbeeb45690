//! Sparse upper-triangular QUBO coefficient storage.
//!
//! Only pairs `(i, j)` with `i <= j` are stored. A diagonal entry is the linear
//! coefficient of `x_i`. An off-diagonal entry `u_ij` is the whole pairwise
//! coefficient of `x_i x_j`, so
//!
//! ```text
//! E(x) = offset + Σ_i u_ii x_i + Σ_{i<j} u_ij x_i x_j
//! ```
//!
//! The equivalent dense symmetric matrix halves every off-diagonal entry:
//! `S_ij = S_ji = u_ij / 2` (see [`QuboMatrix::symmetric_entry`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Serde helper: store terms as `{"i,j": coefficient}` so the JSON artifact
/// stays a plain mapping keyed by variable-index pairs.
mod term_map_serde {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        terms: &BTreeMap<(usize, usize), f64>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        ser.collect_map(
            terms
                .iter()
                .map(|((i, j), value)| (format!("{i},{j}"), *value)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<BTreeMap<(usize, usize), f64>, D::Error> {
        let raw: BTreeMap<String, f64> = BTreeMap::deserialize(de)?;
        let mut terms = BTreeMap::new();
        for (key, value) in raw {
            let (i, j) = key
                .split_once(',')
                .ok_or_else(|| serde::de::Error::custom(format!("bad term key '{key}'")))?;
            let i: usize = i.trim().parse().map_err(serde::de::Error::custom)?;
            let j: usize = j.trim().parse().map_err(serde::de::Error::custom)?;
            let normalised = (i.min(j), i.max(j));
            if terms.insert(normalised, value).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate term for pair {},{}",
                    normalised.0, normalised.1
                )));
            }
        }
        Ok(terms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuboMatrix {
    num_variables: usize,
    offset: f64,
    #[serde(with = "term_map_serde")]
    terms: BTreeMap<(usize, usize), f64>,
}

/// Adjacency view used by local-search samplers.
#[derive(Debug, Clone)]
pub struct QuboAdjacency {
    pub linear: Vec<f64>,
    pub neighbours: Vec<Vec<(usize, f64)>>,
}

impl QuboMatrix {
    pub fn new(num_variables: usize) -> Self {
        Self {
            num_variables,
            offset: 0.0,
            terms: BTreeMap::new(),
        }
    }

    fn key(i: usize, j: usize) -> (usize, usize) {
        if i <= j {
            (i, j)
        } else {
            (j, i)
        }
    }

    /// Accumulate `value` onto the coefficient of `x_i x_j` (`x_i` when `i == j`).
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(i < self.num_variables && j < self.num_variables);
        *self.terms.entry(Self::key(i, j)).or_insert(0.0) += value;
    }

    pub fn add_linear(&mut self, i: usize, value: f64) {
        self.add(i, i, value);
    }

    pub fn add_offset(&mut self, value: f64) {
        self.offset += value;
    }

    /// Stored coefficient for the pair; order of `i` and `j` does not matter.
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.terms.get(&Self::key(i, j)).copied().unwrap_or(0.0)
    }

    /// Entry of the equivalent dense symmetric matrix.
    pub fn symmetric_entry(&self, i: usize, j: usize) -> f64 {
        if i == j {
            self.coefficient(i, i)
        } else {
            self.coefficient(i, j) / 2.0
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Stored terms in ascending `(i, j)` order.
    pub fn terms(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.terms.iter().map(|(key, value)| (*key, *value))
    }

    /// Largest key index is in range and keys are upper-triangular.
    pub fn is_well_formed(&self) -> bool {
        self.terms
            .keys()
            .all(|&(i, j)| i <= j && j < self.num_variables)
    }

    /// Energy of a 0/1 assignment, including the constant offset.
    ///
    /// `bits` must have one entry per variable.
    pub fn energy(&self, bits: &[u8]) -> f64 {
        debug_assert_eq!(bits.len(), self.num_variables);
        let mut energy = self.offset;
        for (&(i, j), &value) in &self.terms {
            if bits[i] == 1 && bits[j] == 1 {
                energy += value;
            }
        }
        energy
    }

    pub fn adjacency(&self) -> QuboAdjacency {
        let mut linear = vec![0.0; self.num_variables];
        let mut neighbours = vec![Vec::new(); self.num_variables];
        for (&(i, j), &value) in &self.terms {
            if i == j {
                linear[i] += value;
            } else {
                neighbours[i].push((j, value));
                neighbours[j].push((i, value));
            }
        }
        QuboAdjacency { linear, neighbours }
    }
}

impl QuboAdjacency {
    /// Energy change from flipping bit `i` in `bits`.
    pub fn flip_delta(&self, bits: &[u8], i: usize) -> f64 {
        let field = self.linear[i]
            + self.neighbours[i]
                .iter()
                .filter(|(j, _)| bits[*j] == 1)
                .map(|(_, value)| value)
                .sum::<f64>();
        if bits[i] == 1 {
            -field
        } else {
            field
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> QuboMatrix {
        let mut m = QuboMatrix::new(3);
        m.add_linear(0, -1.0);
        m.add_linear(1, -1.0);
        m.add(1, 0, 2.0);
        m.add(2, 1, -0.5);
        m.add_offset(1.0);
        m
    }

    #[test]
    fn coefficient_is_symmetric() {
        let m = sample_matrix();
        assert_eq!(m.coefficient(0, 1), 2.0);
        assert_eq!(m.coefficient(1, 0), 2.0);
        assert_eq!(m.symmetric_entry(0, 1), 1.0);
        assert_eq!(m.symmetric_entry(1, 0), 1.0);
        assert!(m.is_well_formed());
    }

    #[test]
    fn energy_matches_expanded_quadratic_form() {
        let m = sample_matrix();
        assert_eq!(m.energy(&[0, 0, 0]), 1.0);
        assert_eq!(m.energy(&[1, 0, 0]), 0.0);
        assert_eq!(m.energy(&[1, 1, 0]), 1.0);
        assert_eq!(m.energy(&[0, 1, 1]), -0.5);
    }

    #[test]
    fn flip_delta_agrees_with_energy_difference() {
        let m = sample_matrix();
        let adjacency = m.adjacency();
        let bits = [1, 0, 1];
        for i in 0..3 {
            let mut flipped = bits;
            flipped[i] ^= 1;
            let expected = m.energy(&flipped) - m.energy(&bits);
            assert!((adjacency.flip_delta(&bits, i) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn json_keys_are_index_pairs() {
        let m = sample_matrix();
        let json = serde_json::to_string(&m).expect("serialize");
        assert!(json.contains("\"0,1\":2.0"));
        let back: QuboMatrix = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, m);
    }

    #[test]
    fn mirrored_term_keys_are_rejected() {
        let json = r#"{"num_variables": 2, "offset": 0.0, "terms": {"0,1": 1.0, "1,0": 2.0}}"#;
        let error = serde_json::from_str::<QuboMatrix>(json).expect_err("duplicate pair");
        assert!(error.to_string().contains("duplicate term for pair 0,1"));
    }
}
