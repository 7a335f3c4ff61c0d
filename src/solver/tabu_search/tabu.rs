use std::collections::HashMap;

/// Tabu tenure for `n` customers.
pub fn tenure(n: usize) -> usize {
    (n / 2).clamp(5, 15)
}

/// Recently visited solutions, keyed by signature, with the iteration at
/// which each stops being tabu.
#[derive(Debug, Clone)]
pub struct TabuList {
    expiry: HashMap<Vec<Vec<usize>>, usize>,
    tenure: usize,
}

impl TabuList {
    pub fn new(tenure: usize) -> Self {
        Self {
            expiry: HashMap::new(),
            tenure,
        }
    }

    pub fn is_tabu(&self, signature: &[Vec<usize>], iteration: usize) -> bool {
        self.expiry
            .get(signature)
            .is_some_and(|&expires| expires > iteration)
    }

    pub fn insert(&mut self, signature: Vec<Vec<usize>>, iteration: usize) {
        self.expiry.retain(|_, &mut expires| expires > iteration);
        self.expiry.insert(signature, iteration + self.tenure);
    }

    pub fn len(&self) -> usize {
        self.expiry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiry.is_empty()
    }
}
