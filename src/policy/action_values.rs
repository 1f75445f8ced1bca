use std::marker::PhantomData;

use ndarray::Array1;

use crate::env::DiscreteAction;
use crate::utils::{argmax, max};

/// Q-values of one state, one slot per action of the enumeration.
///
/// Only the slots of the actions that were legal when the row was created
/// hold a value; the legal set never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValues<A: DiscreteAction> {
    values: Array1<f64>,
    legal: Array1<bool>,
    action: PhantomData<A>,
}

impl<A: DiscreteAction> ActionValues<A> {
    pub fn new(legal_actions: &[A]) -> Self {
        let mut legal: Array1<bool> = Array1::from_elem((A::COUNT,), false);
        for action in legal_actions {
            legal[action.index()] = true;
        }
        Self {
            values: Array1::zeros((A::COUNT,)),
            legal,
            action: PhantomData,
        }
    }

    pub fn is_legal(&self, action: A) -> bool {
        self.legal[action.index()]
    }

    pub fn get(&self, action: A) -> Option<f64> {
        if self.is_legal(action) {
            Some(self.values[action.index()])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, action: A) -> Option<&mut f64> {
        if self.is_legal(action) {
            Some(&mut self.values[action.index()])
        } else {
            None
        }
    }

    /// Legal actions with their values, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (A, f64)> + '_ {
        self.values
            .iter()
            .zip(self.legal.iter())
            .enumerate()
            .filter(|(_, (_, legal))| **legal)
            .filter_map(|(i, (value, _))| A::from_index(i).map(|a| (a, *value)))
    }

    pub fn len(&self) -> usize {
        self.legal.iter().filter(|legal| **legal).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest legal value, 0.0 for a state without legal actions.
    pub fn max_value(&self) -> f64 {
        max(self.iter().map(|(_, v)| v)).unwrap_or(0.0)
    }

    /// Greedy action; ties go to the lowest action index.
    pub fn best_action(&self) -> Option<A> {
        let entries: Vec<(A, f64)> = self.iter().collect();
        argmax(entries.iter().map(|(_, v)| *v)).map(|i| entries[i].0)
    }

    /// True while nothing has been learned for this state.
    pub fn is_untouched(&self) -> bool {
        self.iter().all(|(_, v)| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GridAction;

    #[test]
    fn new_row_holds_zero_for_legal_actions_only() {
        let row: ActionValues<GridAction> = ActionValues::new(&[GridAction::Down, GridAction::Right]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(GridAction::Down), Some(0.0));
        assert_eq!(row.get(GridAction::Right), Some(0.0));
        assert_eq!(row.get(GridAction::Up), None);
        assert!(row.is_untouched());
        assert_eq!(
            row.iter().collect::<Vec<_>>(),
            vec![(GridAction::Down, 0.0), (GridAction::Right, 0.0)]
        );
    }

    #[test]
    fn illegal_slots_cannot_be_written() {
        let mut row: ActionValues<GridAction> = ActionValues::new(&[GridAction::Up]);
        assert!(row.get_mut(GridAction::Left).is_none());
        *row.get_mut(GridAction::Up).unwrap() = -2.0;
        assert_eq!(row.get(GridAction::Up), Some(-2.0));
        assert!(!row.is_untouched());
    }

    #[test]
    fn best_action_breaks_ties_by_index() {
        let mut row: ActionValues<GridAction> = ActionValues::new(&GridAction::ALL);
        assert_eq!(row.best_action(), Some(GridAction::Up));
        *row.get_mut(GridAction::Left).unwrap() = 3.0;
        *row.get_mut(GridAction::Right).unwrap() = 3.0;
        assert_eq!(row.best_action(), Some(GridAction::Left));
        assert_eq!(row.max_value(), 3.0);
    }

    #[test]
    fn max_ignores_illegal_slots() {
        let mut row: ActionValues<GridAction> = ActionValues::new(&[GridAction::Down]);
        *row.get_mut(GridAction::Down).unwrap() = -4.0;
        assert_eq!(row.max_value(), -4.0);

        let empty: ActionValues<GridAction> = ActionValues::new(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.max_value(), 0.0);
        assert_eq!(empty.best_action(), None);
    }
}
