//! Bidirectional association index.
//!
//! Navigation in either direction goes through this index rather than by
//! scanning the association table. Both directions are keyed by association
//! identifier, so iteration follows association insertion order.

use junction_foundation::{LtMap, RowId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index over association rows.
///
/// - Forward: client -> association -> car
/// - Reverse: car -> association -> client
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssociationIndex {
    by_client: LtMap<RowId, LtMap<RowId, RowId>>,
    by_car: LtMap<RowId, LtMap<RowId, RowId>>,
}

impl AssociationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an association between a client and a car.
    pub fn insert(&mut self, association: RowId, client: RowId, car: RowId) {
        let forward = self.by_client.get(&client).cloned().unwrap_or_default();
        self.by_client = self
            .by_client
            .insert(client, forward.insert(association, car));

        let reverse = self.by_car.get(&car).cloned().unwrap_or_default();
        self.by_car = self.by_car.insert(car, reverse.insert(association, client));
    }

    /// Forgets an association. Unknown entries are ignored.
    pub fn remove(&mut self, association: RowId, client: RowId, car: RowId) {
        self.by_client = Self::remove_entry(&self.by_client, client, association);
        self.by_car = Self::remove_entry(&self.by_car, car, association);
    }

    fn remove_entry(
        side: &LtMap<RowId, LtMap<RowId, RowId>>,
        key: RowId,
        association: RowId,
    ) -> LtMap<RowId, LtMap<RowId, RowId>> {
        match side.get(&key) {
            Some(entries) => {
                let remaining = entries.remove(&association);
                if remaining.is_empty() {
                    side.remove(&key)
                } else {
                    side.insert(key, remaining)
                }
            }
            None => side.clone(),
        }
    }

    /// Returns `(association, car)` pairs for a client in insertion order.
    pub fn for_client(&self, client: RowId) -> impl Iterator<Item = (RowId, RowId)> + '_ {
        self.by_client
            .get(&client)
            .into_iter()
            .flat_map(|m| m.iter().map(|(a, c)| (*a, *c)))
    }

    /// Returns `(association, client)` pairs for a car in insertion order.
    pub fn for_car(&self, car: RowId) -> impl Iterator<Item = (RowId, RowId)> + '_ {
        self.by_car
            .get(&car)
            .into_iter()
            .flat_map(|m| m.iter().map(|(a, c)| (*a, *c)))
    }

    /// Number of associations held by a client.
    #[must_use]
    pub fn client_degree(&self, client: RowId) -> usize {
        self.by_client.get(&client).map_or(0, LtMap::len)
    }

    /// Number of associations held by a car.
    #[must_use]
    pub fn car_degree(&self, car: RowId) -> usize {
        self.by_car.get(&car).map_or(0, LtMap::len)
    }
}
