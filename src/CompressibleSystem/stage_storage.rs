use super::conserved::ConservedState;

/// What a stage slot keeps for later stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDescriptor {
    None,
    OldOnly,
    DeltaOnly,
    Both,
}

impl StorageDescriptor {
    pub fn from_flags(store_old: bool, store_delta: bool) -> Self {
        match (store_old, store_delta) {
            (false, false) => StorageDescriptor::None,
            (true, false) => StorageDescriptor::OldOnly,
            (false, true) => StorageDescriptor::DeltaOnly,
            (true, true) => StorageDescriptor::Both,
        }
    }

    pub fn stores_old(&self) -> bool {
        matches!(self, StorageDescriptor::OldOnly | StorageDescriptor::Both)
    }

    pub fn stores_delta(&self) -> bool {
        matches!(self, StorageDescriptor::DeltaOnly | StorageDescriptor::Both)
    }
}

/// Old (stage-entry state) and Delta (stage rate) buffers for one outer time step
#[derive(Debug, Clone)]
pub struct StageStorage {
    descriptors: Vec<StorageDescriptor>,
    old: Vec<Option<ConservedState>>,
    delta: Vec<Option<ConservedState>>,
}

impl StageStorage {
    pub fn new(descriptors: Vec<StorageDescriptor>) -> Self {
        let n = descriptors.len();
        Self {
            descriptors,
            old: vec![None; n],
            delta: vec![None; n],
        }
    }

    pub fn n_steps(&self) -> usize {
        self.descriptors.len()
    }

    pub fn descriptors(&self) -> &[StorageDescriptor] {
        &self.descriptors
    }

    /// Keeps whatever the descriptor of `stepi` asks for
    pub fn store(&mut self, stepi: usize, current: &ConservedState, rate: &ConservedState) {
        let d = self.descriptors[stepi];
        if d.stores_old() {
            self.old[stepi] = Some(current.clone());
        }
        if d.stores_delta() {
            self.delta[stepi] = Some(rate.clone());
        }
    }

    pub fn old(&self, slot: usize) -> Option<&ConservedState> {
        self.old.get(slot).and_then(|s| s.as_ref())
    }

    pub fn delta(&self, slot: usize) -> Option<&ConservedState> {
        self.delta.get(slot).and_then(|s| s.as_ref())
    }
}
